pub mod missing_relations;

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exclude")]
pub struct Model {
    #[sea_orm(column_name = "entryId", primary_key, auto_increment = false)]
    pub entry_id: i32,
    #[sea_orm(column_name = "excludedEntryId", primary_key, auto_increment = false)]
    pub excluded_entry_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entry::Entity",
        from = "Column::EntryId",
        to = "super::entry::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Entry,
    #[sea_orm(
        belongs_to = "super::entry::Entity",
        from = "Column::ExcludedEntryId",
        to = "super::entry::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ExcludedEntry,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use sea_orm::Linked;

use super::super::{entry, exclude};


/// Entry -> the entry it has drawn.
#[derive(Debug)]
pub struct DrawTargetLink;

impl Linked for DrawTargetLink {
    type FromEntity = entry::Entity;
    type ToEntity = entry::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![entry::Relation::DrawTarget.def()]
    }
}

/// Entry -> entries it must not draw, through the `exclude` join table.
#[derive(Debug)]
pub struct ExcludedEntriesLink;

impl Linked for ExcludedEntriesLink {
    type FromEntity = entry::Entity;
    type ToEntity = entry::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            exclude::Relation::Entry.def().rev(),
            exclude::Relation::ExcludedEntry.def(),
        ]
    }
}

/// Entry -> entries that have excluded it.
#[derive(Debug)]
pub struct ExcludingEntriesLink;

impl Linked for ExcludingEntriesLink {
    type FromEntity = entry::Entity;
    type ToEntity = entry::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            exclude::Relation::ExcludedEntry.def().rev(),
            exclude::Relation::Entry.def(),
        ]
    }
}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pool")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "listurl", unique)]
    pub list_url: String,
    pub amount: Option<String>,
    #[sea_orm(column_name = "eventdate")]
    pub event_date: Option<DateTime>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub locale: String,
    pub created: bool,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "sentdate")]
    pub sent_date: Option<DateTime>,
    pub exposed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entry::Entity")]
    Entry,
}

impl Related<super::entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

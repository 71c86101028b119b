use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "poolId")]
    pub pool_id: i32,
    pub name: String,
    pub email: String,
    #[sea_orm(column_name = "entryId", unique)]
    pub entry_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub wishlist: Option<String>,
    pub viewdate: Option<DateTime>,
    #[sea_orm(column_name = "viewreminder_sent")]
    pub view_reminder_sent_time: Option<DateTime>,
    #[sea_orm(unique)]
    pub url: Option<String>,
    pub wishlist_updated: Option<bool>,
    #[sea_orm(column_name = "updatewishlistreminder_sent")]
    pub update_wishlist_reminder_sent_time: Option<DateTime>,
    #[sea_orm(column_name = "poolAdmin")]
    pub pool_admin: bool,
    pub ip: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pool::Entity",
        from = "Column::PoolId",
        to = "super::pool::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Pool,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::EntryId",
        to = "Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    DrawTarget,
    #[sea_orm(has_many = "super::wishlist_item::Entity")]
    WishlistItem,
}

impl Related<super::pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pool.def()
    }
}

impl Related<super::wishlist_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishlistItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

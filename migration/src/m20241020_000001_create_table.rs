use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20241020_000001_create_table"
    }
}


#[derive(Iden)]
pub enum Pool {
    Table,
    Id,
    #[iden = "listurl"]
    ListUrl,
    Amount,
    #[iden = "eventdate"]
    EventDate,
    Location,
    Message,
    Locale,
    Created,
    #[iden = "createdAt"]
    CreatedAt,
    #[iden = "sentdate"]
    SentDate,
    Exposed,
}


#[derive(Iden)]
pub enum Entry {
    Table,
    Id,
    #[iden = "poolId"]
    PoolId,
    Name,
    Email,
    #[iden = "entryId"]
    EntryId,
    Wishlist,
    Viewdate,
    #[iden = "viewreminder_sent"]
    ViewReminderSentTime,
    Url,
    WishlistUpdated,
    #[iden = "updatewishlistreminder_sent"]
    UpdateWishlistReminderSentTime,
    #[iden = "poolAdmin"]
    PoolAdmin,
    Ip,
}


#[derive(Iden)]
pub enum Exclude {
    Table,
    #[iden = "entryId"]
    EntryId,
    #[iden = "excludedEntryId"]
    ExcludedEntryId,
}


#[derive(Iden)]
pub enum WishlistItem {
    Table,
    Id,
    #[iden = "entryId"]
    EntryId,
    Rank,
    Description,
}


#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
        .create_table(
            sea_query::Table::create()
                .table(Pool::Table)
                .if_not_exists()
                .col(ColumnDef::new(Pool::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Pool::ListUrl).string_len(255).not_null().unique_key())
                .col(ColumnDef::new(Pool::Amount).string_len(255))
                .col(ColumnDef::new(Pool::EventDate).date_time())
                .col(ColumnDef::new(Pool::Location).string_len(255))
                .col(ColumnDef::new(Pool::Message).text().not_null())
                .col(ColumnDef::new(Pool::Locale).string_len(7).not_null().default("en"))
                .col(ColumnDef::new(Pool::Created).boolean().not_null().default(false))
                .col(ColumnDef::new(Pool::CreatedAt).date_time().not_null())
                .col(ColumnDef::new(Pool::SentDate).date_time())
                .col(ColumnDef::new(Pool::Exposed).boolean().not_null().default(false))
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Entry::Table)
                .if_not_exists()
                .col(ColumnDef::new(Entry::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(Entry::PoolId).integer().not_null())
                .col(ColumnDef::new(Entry::Name).string_len(255).not_null())
                .col(ColumnDef::new(Entry::Email).string_len(255).not_null())
                .col(ColumnDef::new(Entry::EntryId).integer().unique_key())
                .col(ColumnDef::new(Entry::Wishlist).text())
                .col(ColumnDef::new(Entry::Viewdate).date_time())
                .col(ColumnDef::new(Entry::ViewReminderSentTime).date_time())
                .col(ColumnDef::new(Entry::Url).string_len(255).unique_key())
                .col(ColumnDef::new(Entry::WishlistUpdated).boolean())
                .col(ColumnDef::new(Entry::UpdateWishlistReminderSentTime).date_time())
                .col(ColumnDef::new(Entry::PoolAdmin).boolean().not_null().default(false))
                .col(ColumnDef::new(Entry::Ip).string_len(255))
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-entry-pool")
                        .from_tbl(Entry::Table)
                        .from_col(Entry::PoolId)
                        .to_tbl(Pool::Table)
                        .to_col(Pool::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-entry-draw-target")
                        .from_tbl(Entry::Table)
                        .from_col(Entry::EntryId)
                        .to_tbl(Entry::Table)
                        .to_col(Entry::Id)
                        .on_delete(ForeignKeyAction::SetNull)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            IndexCreateStatement::new()
            .name("idx-entry-pool-id")
            .table(Entry::Table)
            .col(Entry::PoolId)
            .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Exclude::Table)
                .if_not_exists()
                .col(ColumnDef::new(Exclude::EntryId).integer().not_null())
                .col(ColumnDef::new(Exclude::ExcludedEntryId).integer().not_null())
                .primary_key(
                    Index::create()
                        .col(Exclude::EntryId)
                        .col(Exclude::ExcludedEntryId)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-exclude-entry")
                        .from_tbl(Exclude::Table)
                        .from_col(Exclude::EntryId)
                        .to_tbl(Entry::Table)
                        .to_col(Entry::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-exclude-excluded-entry")
                        .from_tbl(Exclude::Table)
                        .from_col(Exclude::ExcludedEntryId)
                        .to_tbl(Entry::Table)
                        .to_col(Entry::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            IndexCreateStatement::new()
            .name("idx-exclude-excluded-entry-id")
            .table(Exclude::Table)
            .col(Exclude::ExcludedEntryId)
            .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(WishlistItem::Table)
                .if_not_exists()
                .col(ColumnDef::new(WishlistItem::Id).integer().not_null().auto_increment().primary_key())
                .col(ColumnDef::new(WishlistItem::EntryId).integer())
                .col(ColumnDef::new(WishlistItem::Rank).integer().not_null())
                .col(ColumnDef::new(WishlistItem::Description).text().not_null())
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-wishlist-item-entry")
                        .from_tbl(WishlistItem::Table)
                        .from_col(WishlistItem::EntryId)
                        .to_tbl(Entry::Table)
                        .to_col(Entry::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                        .on_update(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            IndexCreateStatement::new()
            .name("idx-wishlist-item-entry-id")
            .table(WishlistItem::Table)
            .col(WishlistItem::EntryId)
            .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(WishlistItem::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Exclude::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Entry::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Pool::Table).to_owned()).await?;

        Ok(())
    }
}

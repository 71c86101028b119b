use sea_orm::{prelude::*, Condition, QueryOrder};

use crate::{domain::entry::Entry, schema};


/// Entries whose wishlist changed and whose giver has not been told since `notified_before`.
pub async fn query_entries_with_pending_wishlist_update<C>(db: &C, notified_before: DateTime) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
    let entries = schema::entry::Entity::find()
        .filter(schema::entry::Column::WishlistUpdated.eq(true))
        .filter(
            Condition::any()
                .add(schema::entry::Column::UpdateWishlistReminderSentTime.is_null())
                .add(schema::entry::Column::UpdateWishlistReminderSentTime.lt(notified_before))
        )
        .order_by_asc(schema::entry::Column::Id)
        .all(db).await?;

    Entry::load_entries(db, entries).await
}

/// Entries of already mailed pools that never looked at their draw and were not reminded
/// since `reminded_before`.
pub async fn query_unviewed_entries<C>(db: &C, reminded_before: DateTime) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
    let entries = schema::entry::Entity::find()
        .inner_join(schema::pool::Entity)
        .filter(schema::pool::Column::SentDate.is_not_null())
        .filter(schema::entry::Column::Viewdate.is_null())
        .filter(
            Condition::any()
                .add(schema::entry::Column::ViewReminderSentTime.is_null())
                .add(schema::entry::Column::ViewReminderSentTime.lt(reminded_before))
        )
        .order_by_asc(schema::entry::Column::Id)
        .all(db).await?;

    Entry::load_entries(db, entries).await
}

/// Number of entries in the pool that have opened their draw result.
pub async fn query_num_viewed_entries<C>(db: &C, pool_id: i32) -> Result<u64, DbErr> where C: ConnectionTrait {
    schema::entry::Entity::find()
        .filter(schema::entry::Column::PoolId.eq(pool_id))
        .filter(schema::entry::Column::Viewdate.is_not_null())
        .count(db).await
}

use sea_orm::prelude::*;
use secret_santa_entities::{prelude::*, schema, validation::ValidationGroup};
use tracing_test::traced_test;

mod common;


#[tokio::test]
async fn test_get_pool_by_list_url() -> Result<(), anyhow::Error> {
    let db = common::set_up_db(true).await?;

    let pool = Pool::get_by_list_url(&db, "mock-pool").await?.ok_or_else(|| anyhow::anyhow!("No pool"))?;
    assert_eq!(pool.id, Some(1));
    assert!(pool.created);
    assert_eq!(pool.get_entries(&db).await?.len(), 5);

    assert_eq!(Pool::get_by_list_url(&db, "unknown").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_update_pool() -> Result<(), anyhow::Error> {
    let db = common::set_up_db(true).await?;

    let mut pool = Pool::get(&db, 1).await?;
    pool.location = Some("Town hall".into());
    pool.sent_date = Some(chrono::Utc::now().naive_utc());
    pool.save(&db).await?;

    let loaded = Pool::get(&db, 1).await?;
    assert_eq!(loaded.location.as_deref(), Some("Town hall"));
    assert!(loaded.is_sent());
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn test_delete_pool_removes_everything() -> Result<(), anyhow::Error> {
    let db = common::set_up_db(true).await?;

    let mut entries = Entry::get_all_in_pool(&db, 1).await?;
    entries[0].set_draw_target_id(Some(2)).add_excluded_entry(3);
    entries[0].save(&db).await?;

    let mut other_pool = Pool::new();
    other_pool.save(&db).await?;
    let other_pool_id = other_pool.id.ok_or_else(|| anyhow::anyhow!("No pool id"))?;
    let mut outsider = Entry::new(other_pool_id, "Olga", "olga@example.org");
    outsider.add_wishlist_item(WishlistItem::new(1, "Kite"));
    outsider.save(&db).await?;

    Pool::delete(&db, 1).await?;

    assert_eq!(Pool::try_get(&db, 1).await?, None);
    assert!(Entry::get_all_in_pool(&db, 1).await?.is_empty());
    assert!(schema::exclude::Entity::find().all(&db).await?.is_empty());

    let remaining_items = schema::wishlist_item::Entity::find().all(&db).await?;
    assert_eq!(remaining_items.len(), 1);
    assert_eq!(remaining_items[0].entry_id, outsider.id());
    assert_eq!(Entry::get_all_in_pool(&db, other_pool_id).await?.len(), 1);

    assert!(logs_contain("Deleted pool"));
    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_pool() -> Result<(), anyhow::Error> {
    let db = common::set_up_db(true).await?;

    assert!(matches!(Pool::delete(&db, 42).await, Err(EntryError::PoolDoesNotExist(42))));
    assert!(Pool::try_get(&db, 1).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_validate_stored_pool() -> Result<(), anyhow::Error> {
    let db = common::set_up_db(true).await?;
    let validator = EntryValidator::new(secret_santa_entities::validation::SkipMailDomainCheck);

    let mut entries = Entry::get_all_in_pool(&db, 1).await?;
    for entry in entries.iter() {
        assert!(validator.validate_groups(entry, &entries, &[ValidationGroup::Default, ValidationGroup::ExcludeEntries]).await.is_empty());
    }

    entries[0].add_excluded_entry(1);
    let violations = validator.validate_groups(&entries[0], &entries, &[ValidationGroup::ExcludeEntries]).await;
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, EntryField::ExcludedEntries);
    Ok(())
}

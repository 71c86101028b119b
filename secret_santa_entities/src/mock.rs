use faker_rand::en_us::names::FullName;
use sea_orm::{prelude::*, TransactionTrait};
use tracing::debug;

use crate::domain::{entry::Entry, pool::Pool, wishlist_item::WishlistItem, PoolEntity};


#[derive(Debug)]
pub struct MockOption {
    pub num_entries: u32,
    pub use_random_names: bool,
    pub num_wishlist_items: u32,
    pub deterministic_tokens: bool,
}

impl Default for MockOption {
    fn default() -> Self {
        Self {
            num_entries: 5,
            use_random_names: false,
            num_wishlist_items: 2,
            deterministic_tokens: false,
        }
    }
}

pub struct MockPool {
    pub pool: Pool,
    pub entries: Vec<Entry>,
}

/// Saves a pool with `num_entries` participants. The first participant is the pool admin.
pub async fn make_mock_pool<C>(db: &C, options: MockOption) -> Result<MockPool, DbErr> where C: ConnectionTrait + TransactionTrait {
    let mut pool = Pool::new();
    pool.message = "Let's exchange presents!".into();
    pool.amount = Some("20 EUR".into());
    pool.location = Some("Office".into());
    pool.created = true;
    if options.deterministic_tokens {
        pool.list_url = "mock-pool".into();
    }
    pool.save(db).await?;
    let pool_id = pool.id.ok_or_else(|| DbErr::Custom("Saved pool has no id".into()))?;

    let mut entries = vec![];
    for idx in 0..options.num_entries {
        let name = if options.use_random_names {
            rand::random::<FullName>().to_string()
        }
        else {
            format!("Participant {}", idx + 1)
        };
        let email = format!("participant{}@example.org", idx + 1);

        let mut entry = if idx == 0 {
            Entry::new_pool_admin(pool_id, name, email)
        }
        else {
            Entry::new(pool_id, name, email)
        };

        if options.deterministic_tokens {
            entry.set_url(Some(format!("mock-entry-{}", idx + 1)));
        }
        else {
            entry.generate_url();
        }

        for rank in 0..options.num_wishlist_items {
            entry.add_wishlist_item(WishlistItem::new(rank as i32, format!("Wish {} of participant {}", rank + 1, idx + 1)));
        }
        entry.set_wishlist_updated(false);
        entry.save(db).await?;
        entries.push(entry);
    }

    debug!(pool_id, num_entries = entries.len(), "Created mock pool");

    Ok(MockPool { pool, entries })
}

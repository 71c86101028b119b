use sea_orm::{prelude::*, QuerySelect, TransactionTrait};
use secret_santa_macros::SimpleEntity;
use serde::{Serialize, Deserialize};
use tracing::info;
use url::Url;

use crate::{schema, utilities::generate_access_token};

use super::entry::{Entry, EntryError};


/// A single gift exchange. Every entry belongs to exactly one pool.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, SimpleEntity)]
#[module_path = "crate::schema::pool"]
#[pool_id = "id"]
pub struct Pool {
    pub id: Option<i32>,
    /// Secret token of the admin page of this pool.
    pub list_url: String,
    pub amount: Option<String>,
    pub event_date: Option<DateTime>,
    pub location: Option<String>,
    pub message: String,
    pub locale: String,
    /// Set once the admin confirmed the pool.
    pub created: bool,
    pub created_at: DateTime,
    /// When the draw results were mailed to the participants.
    pub sent_date: Option<DateTime>,
    pub exposed: bool,
}

impl Pool {
    pub fn new() -> Self {
        Pool {
            id: None,
            list_url: generate_access_token(),
            amount: None,
            event_date: None,
            location: None,
            message: String::new(),
            locale: "en".into(),
            created: false,
            created_at: chrono::Utc::now().naive_utc(),
            sent_date: None,
            exposed: false,
        }
    }

    pub fn is_sent(&self) -> bool {
        self.sent_date.is_some()
    }

    pub fn manage_link(&self, base: &Url) -> Result<Url, url::ParseError> {
        base.join(&format!("manage/{}", self.list_url))
    }

    pub async fn get_by_list_url<C>(db: &C, list_url: &str) -> Result<Option<Pool>, DbErr> where C: ConnectionTrait {
        let pool = schema::pool::Entity::find()
            .filter(schema::pool::Column::ListUrl.eq(list_url))
            .one(db).await?;
        Ok(pool.map(Self::from_model))
    }

    pub async fn get_entries<C>(&self, db: &C) -> Result<Vec<Entry>, DbErr> where C: ConnectionTrait {
        match self.id {
            Some(id) => Entry::get_all_in_pool(db, id).await,
            None => Ok(vec![])
        }
    }

    /// Deletes the pool and all of its entries in one transaction.
    pub async fn delete<C>(db: &C, id: i32) -> Result<(), EntryError> where C: ConnectionTrait + TransactionTrait {
        let transaction = db.begin().await?;

        if schema::pool::Entity::find_by_id(id).one(&transaction).await?.is_none() {
            return Err(EntryError::PoolDoesNotExist(id));
        }

        let entry_ids : Vec<i32> = schema::entry::Entity::find()
            .select_only()
            .column(schema::entry::Column::Id)
            .filter(schema::entry::Column::PoolId.eq(id))
            .into_tuple()
            .all(&transaction).await?;

        let num_entries = entry_ids.len();
        Entry::delete_rows(&transaction, entry_ids).await?;
        schema::pool::Entity::delete_by_id(id).exec(&transaction).await?;

        transaction.commit().await?;
        info!(pool_id = id, num_entries, "Deleted pool");

        Ok(())
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}


#[test]
fn test_new_pool_defaults() {
    let pool = Pool::new();
    assert_eq!(pool.id, None);
    assert_eq!(pool.locale, "en");
    assert!(!pool.created);
    assert!(!pool.exposed);
    assert!(!pool.is_sent());
    assert_ne!(pool.list_url, Pool::new().list_url);
}

#[test]
fn test_manage_link() -> Result<(), url::ParseError> {
    let pool = Pool { list_url: "abc".into(), ..Pool::new() };
    let base = Url::parse("https://santa.example.org/")?;
    assert_eq!(pool.manage_link(&base)?.as_str(), "https://santa.example.org/manage/abc");
    Ok(())
}

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, TransactionTrait};

use crate::utilities::BatchLoadError;

/// Something that lives inside a pool and can be written back to the database.
#[async_trait]
pub trait PoolEntity: Send + Sync {
    /// Inserts the entity if it has no id yet, updates it otherwise.
    /// The id assigned by the database is written back into the entity.
    async fn save<C>(&mut self, db: &C) -> Result<(), DbErr> where C: ConnectionTrait + TransactionTrait;

    async fn get_pool<C>(&self, db: &C) -> Result<Option<i32>, DbErr> where C: ConnectionTrait {
        Ok(Self::get_many_pools(db, &vec![self]).await?[0])
    }

    async fn get_many_pools<C>(db: &C, entities: &Vec<&Self>) -> Result<Vec<Option<i32>>, DbErr> where C: ConnectionTrait {
        let mut out = vec![];

        for entity in entities {
            out.push(entity.get_pool(db).await?);
        }
        Ok(out)
    }
}

#[async_trait]
pub trait LoadEntity where Self: Sized + Send {
    async fn try_get_many<C>(db: &C, ids: Vec<i32>) -> Result<Vec<Option<Self>>, DbErr> where C: ConnectionTrait;

    async fn get_many<C>(db: &C, ids: Vec<i32>) -> Result<Vec<Self>, BatchLoadError> where C: ConnectionTrait {
        let entities = Self::try_get_many(db, ids).await?;
        entities.into_iter().map(|e| e.ok_or(BatchLoadError::RowNotFound)).collect()
    }

    async fn try_get<C>(db: &C, id: i32) -> Result<Option<Self>, DbErr> where C: ConnectionTrait {
        Ok(Self::try_get_many(db, vec![id]).await?.pop().flatten())
    }

    async fn get<C>(db: &C, id: i32) -> Result<Self, BatchLoadError> where C: ConnectionTrait {
        Self::try_get(db, id).await?.ok_or(BatchLoadError::RowNotFound)
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use rand::{thread_rng, Rng};
use sea_orm::prelude::*;
use sea_orm::Iterable;
use thiserror::Error;


/// Loads rows by their integer primary key, keeping the order of `ids`.
/// Missing rows are returned as `None`.
pub async fn load_many<E, C>(db: &C, ids: Vec<i32>) -> Result<Vec<Option<E::Model>>, DbErr> where E: EntityTrait, C: ConnectionTrait {
    let key = {
        let mut keys = E::PrimaryKey::iter();
        let (Some(key), None) = (keys.next(), keys.next()) else {
            return Err(DbErr::Custom("load_many only supports entities with a single primary key".into()));
        };
        key.into_column()
    };

    let models_by_id : HashMap<i32, E::Model> = E::find()
        .filter(key.is_in(ids.clone()))
        .all(db).await?
        .into_iter()
        .filter_map(|model| match model.get(key) {
            sea_orm::Value::Int(Some(id)) => Some((id, model)),
            _ => None
        })
        .collect();

    Ok(ids.into_iter().map(|id| models_by_id.get(&id).cloned()).collect())
}

#[derive(Debug, Error)]
pub enum BatchLoadError {
    #[error("Row not found")]
    RowNotFound,
    #[error(transparent)]
    DbErr(#[from] DbErr),
}

#[async_trait]
pub trait BatchLoad: EntityTrait {
    async fn batch_load<C>(db: &C, ids: Vec<i32>) -> Result<Vec<Option<Self::Model>>, DbErr> where C: ConnectionTrait {
        load_many::<Self, C>(db, ids).await
    }
}

impl<E: EntityTrait> BatchLoad for E {}

/// Random url-safe token used for participant and pool admin links.
pub fn generate_access_token() -> String {
    let key: [u8; 32] = thread_rng().gen::<[u8; 32]>();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(key)
}

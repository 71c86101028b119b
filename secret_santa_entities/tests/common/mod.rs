#![allow(dead_code)]

use sea_orm::prelude::*;
use secret_santa_entities::{config::Config, db, mock};


pub async fn set_up_db(with_mock_env: bool) -> Result<DatabaseConnection, anyhow::Error> {
    let config = Config {
        db_url: "sqlite::memory:".into(),
        check_mail_domains: false,
        ..Default::default()
    };
    let db = db::set_up_db(&config).await?;

    if with_mock_env {
        mock::make_mock_pool(&db, mock::MockOption { deterministic_tokens: true, ..Default::default() }).await?;
    }
    Ok(db)
}

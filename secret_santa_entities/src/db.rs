use migration::MigratorTrait;
use sea_orm::{prelude::*, Database, DbBackend, Statement};
use tracing::info;

use crate::config::Config;


/// Connects to the configured database and brings the schema up to date.
pub async fn set_up_db(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(config.db_url.clone()).await?;

    if db.get_database_backend() == DbBackend::Sqlite {
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            "PRAGMA foreign_keys = ON;",
        )).await?;
    }

    migration::Migrator::up(&db, None).await?;
    info!(backend = ?db.get_database_backend(), "Database ready");

    Ok(db)
}

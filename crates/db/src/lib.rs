//! Persistence for MovieHub: entities, migrations and repositories over
//! `PostgreSQL`.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use std::time::Duration;

use moviehub_common::{AppError, config::DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{info, log::LevelFilter};

/// Pool options for the configured database.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&config.url);

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    opt
}

/// Open the connection pool and bring the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, AppError> {
    let db = Database::connect(connect_options(config))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    migrations::Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    info!(
        max_connections = config.max_connections,
        "Database ready, migrations applied"
    );
    Ok(db)
}

use std::time::Duration;

use examhall_migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::StoreConfig;

/// Connects and applies pending migrations.
pub async fn init_pool_and_migrate(config: &StoreConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    // Every pooled connection to an in-memory SQLite URL opens its own database.
    let max_connections = if config.is_sqlite_memory() {
        1
    } else {
        config.max_connections
    };
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    info!(max_connections, "database connected and migrated");

    Ok(db)
}

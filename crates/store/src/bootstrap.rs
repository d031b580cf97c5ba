use examhall_core::{examination_schema, seed};
use examhall_migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::error::Result;
use crate::repository::{RecordStore, SeaOrmStore};

/// Applies pending migrations and loads the seed dataset in one transaction.
/// Returns the number of records inserted; a second run fails with a
/// primary-key conflict and leaves the stored data untouched.
pub async fn bootstrap(db: &DatabaseConnection) -> Result<usize> {
    Migrator::up(db, None).await?;

    let schema = examination_schema()?;
    for warning in schema.warnings() {
        warn!(%warning, "schema warning");
    }

    let store = SeaOrmStore::new(db.clone(), schema);
    let inserted = store.load(seed::dataset()).await?;
    info!(records = inserted, "bootstrap complete");
    Ok(inserted)
}

use tracing::{info, warn};

use crate::backend::StorageBackend;
use crate::domain::SchemaError;
use crate::schema::{Schema, examination_schema};
use crate::seed::{self, SeedSet};
use crate::validate::validate;

/// Loads the examination schema and the literal seed dataset into a fresh
/// store. Running it against a populated store fails with a primary-key
/// conflict on the first seed record.
pub fn bootstrap<B: StorageBackend>(backend: &mut B) -> Result<usize, SchemaError> {
    let schema = examination_schema()?;
    bootstrap_with(backend, &schema, seed::dataset())
}

/// Validates `seed` against `schema`, installs the schema, then inserts the
/// seed in one transaction. Returns the number of records inserted.
pub fn bootstrap_with<B: StorageBackend>(
    backend: &mut B,
    schema: &Schema,
    seed: SeedSet,
) -> Result<usize, SchemaError> {
    for warning in schema.warnings() {
        warn!(%warning, "schema warning");
    }

    validate(schema, &seed)?;
    backend.create_schema(schema)?;

    let total = seed.len();
    backend.within_transaction(|store| {
        for (entity, record) in seed {
            store.insert(entity, record)?;
        }
        Ok(())
    })?;

    info!(records = total, "seed dataset loaded");
    Ok(total)
}

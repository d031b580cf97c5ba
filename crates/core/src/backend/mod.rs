//! Storage boundary consumed by the bootstrap path.

mod memory;

pub use memory::MemoryStore;

use crate::domain::{EntityRecord, Key, Record, SchemaError};
use crate::schema::Schema;

/// Create/insert/delete with constraint enforcement. Implementations must
/// make unique/check enforcement atomic with the write and apply cascades
/// all-or-nothing.
pub trait StorageBackend {
    /// Installs the schema. Re-installing an identical schema is a no-op.
    fn create_schema(&mut self, schema: &Schema) -> Result<(), SchemaError>;

    fn insert(&mut self, entity: &str, record: Record) -> Result<(), SchemaError>;

    /// Deletes one record plus everything its cascade edges own; returns
    /// the number of records removed.
    fn delete(&mut self, entity: &str, key: &Key) -> Result<usize, SchemaError>;

    /// Runs `f` atomically: on error nothing `f` did is kept.
    fn within_transaction<T, F>(&mut self, f: F) -> Result<T, SchemaError>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T, SchemaError>;

    fn insert_entity<E: EntityRecord>(&mut self, entity: &E) -> Result<(), SchemaError>
    where
        Self: Sized,
    {
        self.insert(E::ENTITY, entity.to_record())
    }
}

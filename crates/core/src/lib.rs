//! Schema contract, constraint validation and seed bootstrap for the
//! examination platform's persistent data model.

pub mod backend;
pub mod bootstrap;
pub mod domain;
pub mod schema;
pub mod seed;
pub mod validate;

pub use backend::{MemoryStore, StorageBackend};
pub use bootstrap::{bootstrap, bootstrap_with};
pub use domain::{Key, Record, Rule, SchemaError, Value};
pub use schema::{Schema, examination_schema};
pub use validate::validate;

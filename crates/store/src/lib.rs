//! Relational persistence for the examination schema over sea-orm.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
mod mapping;
pub mod repository;

pub use bootstrap::bootstrap;
pub use config::StoreConfig;
pub use error::StoreError;
pub use mapping::Table;
pub use repository::{RecordStore, SeaOrmStore};

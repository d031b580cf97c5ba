use examhall_core::SchemaError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Unique or check constraint rejected by the database.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("unresolved foreign key: {0}")]
    ForeignKeyUnresolved(String),

    #[error("cannot delete {entity} {key}: still referenced ({detail})")]
    RestrictedDeletion {
        entity: String,
        key: String,
        detail: String,
    },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Classifies a driver error raised by a write.
    pub fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::ConstraintViolation(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::ForeignKeyUnresolved(detail)
            }
            _ => Self::Database(err),
        }
    }

    pub fn is_primary_key_conflict(&self) -> bool {
        matches!(self, Self::Schema(err) if err.is_primary_key_conflict())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

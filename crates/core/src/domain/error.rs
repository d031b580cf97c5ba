use std::fmt;

use thiserror::Error;

use super::{FieldType, Value};

/// The rule a record broke, carried inside [`SchemaError::ConstraintViolation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    MaxLength(usize),
    Scale(u32),
    TypeMismatch(FieldType),
    Check(&'static str),
    Unique(&'static str),
    PrimaryKey,
    UndeclaredField,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::MaxLength(max) => write!(f, "max length {max}"),
            Self::Scale(scale) => write!(f, "at most {scale} decimal places"),
            Self::TypeMismatch(ty) => write!(f, "expected {ty}"),
            Self::Check(name) => write!(f, "check {name}"),
            Self::Unique(name) => write!(f, "unique {name}"),
            Self::PrimaryKey => f.write_str("primary key"),
            Self::UndeclaredField => f.write_str("undeclared field"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema definition error: {0}")]
    SchemaDefinition(String),

    #[error("constraint violation on {entity}.{field}: {rule} (value: {value})")]
    ConstraintViolation {
        entity: String,
        field: String,
        rule: Rule,
        value: Value,
    },

    #[error("unknown question variant: '{0}'")]
    UnknownVariant(String),

    #[error("cannot delete {entity} {key}: {child} records still reference it")]
    RestrictedDeletion {
        entity: String,
        key: String,
        child: String,
    },

    #[error("{entity}.{field} references missing {parent} record {value}")]
    ForeignKeyUnresolved {
        entity: String,
        field: String,
        parent: String,
        value: Value,
    },

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("{entity} record {key} not found")]
    NotFound { entity: String, key: String },
}

impl SchemaError {
    pub fn violation(
        entity: impl Into<String>,
        field: impl Into<String>,
        rule: Rule,
        value: Value,
    ) -> Self {
        Self::ConstraintViolation {
            entity: entity.into(),
            field: field.into(),
            rule,
            value,
        }
    }

    pub fn is_primary_key_conflict(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation {
                rule: Rule::PrimaryKey,
                ..
            }
        )
    }
}

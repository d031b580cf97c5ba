use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

/// Semantic type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    Text,
    Char,
    Bool,
    Decimal,
    DateTime,
    Duration,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Text => "text",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    Text(String),
    Char(char),
    Bool(bool),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Duration(Duration),
}

static NULL: Value = Value::Null;

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Self::Null => None,
            Self::Int(_) => Some(FieldType::Int),
            Self::Text(_) => Some(FieldType::Text),
            Self::Char(_) => Some(FieldType::Char),
            Self::Bool(_) => Some(FieldType::Bool),
            Self::Decimal(_) => Some(FieldType::Decimal),
            Self::DateTime(_) => Some(FieldType::DateTime),
            Self::Duration(_) => Some(FieldType::Duration),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(v) => Some(*v),
            Self::Int(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(v) => Some(*v),
            _ => None,
        }
    }

    /// SQL-style comparison: `None` when either side is null or the kinds
    /// are not comparable. Ints and decimals compare numerically.
    pub fn compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => None,
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(_) | Self::Decimal(_), Self::Int(_) | Self::Decimal(_)) => {
                Some(self.as_decimal()?.cmp(&other.as_decimal()?))
            }
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Char(a), Self::Char(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Duration(a), Self::Duration(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Char(v) => write!(f, "'{v}'"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
            Self::Duration(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_value_from {
    ($ty:ty => $variant:ident) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::$variant(value.into())
            }
        }
    };
}

impl_value_from!(i32 => Int);
impl_value_from!(i64 => Int);
impl_value_from!(String => Text);
impl_value_from!(&str => Text);
impl_value_from!(char => Char);
impl_value_from!(bool => Bool);
impl_value_from!(Decimal => Decimal);
impl_value_from!(NaiveDateTime => DateTime);
impl_value_from!(Duration => Duration);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Primary-key (or foreign-key) value tuple, in declared field order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<Value>);

impl Key {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn has_null(&self) -> bool {
        self.0.iter().any(Value::is_null)
    }

    /// Single-field keys report their value directly, composite keys their
    /// rendered tuple.
    pub fn to_value(&self) -> Value {
        match self.0.as_slice() {
            [single] => single.clone(),
            _ => Value::Text(self.to_string()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

/// A field bag for one entity record. Absent fields read as [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn key(&self, fields: &[&str]) -> Key {
        Key(fields.iter().map(|field| self.get(field).clone()).collect())
    }
}

/// A typed entity that can be lowered into a schema-checked [`Record`].
pub trait EntityRecord {
    const ENTITY: &'static str;

    fn to_record(&self) -> Record;
}

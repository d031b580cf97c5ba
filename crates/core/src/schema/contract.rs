use std::cmp::Ordering;
use std::fmt;
use std::slice;

use crate::domain::{FieldType, QuestionType, Record, Rule, SchemaError, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub nullable: bool,
    pub max_len: Option<usize>,
    /// Maximum digits after the decimal point.
    pub scale: Option<u32>,
    pub default: Option<Value>,
    /// Set for fields that only exist on one variant of a discriminated entity.
    pub variant: Option<QuestionType>,
}

impl FieldDef {
    pub fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            max_len: None,
            scale: None,
            default: None,
            variant: None,
        }
    }

    pub fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            nullable: true,
            ..Self::required(name, ty)
        }
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn variant(mut self, variant: QuestionType) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn applies_to(&self, variant: Option<QuestionType>) -> bool {
        self.variant.is_none() || self.variant == variant
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    Single(&'static str),
    Composite(Vec<&'static str>),
}

impl PrimaryKey {
    pub fn fields(&self) -> &[&'static str] {
        match self {
            Self::Single(field) => slice::from_ref(field),
            Self::Composite(fields) => fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: &'static str,
    pub fields: Vec<&'static str>,
}

impl UniqueConstraint {
    pub fn new(name: &'static str, fields: &[&'static str]) -> Self {
        Self {
            name,
            fields: fields.to_vec(),
        }
    }
}

/// Boolean predicate over one record. Follows SQL CHECK semantics: a
/// comparison involving NULL is unknown and therefore passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Positive(&'static str),
    GreaterThan(&'static str, &'static str),
    AtLeast(&'static str, &'static str),
    OneOf(&'static str, &'static [char]),
    /// Duration with no sub-second part.
    WholeSeconds(&'static str),
}

impl Predicate {
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::Positive(field) | Self::OneOf(field, _) | Self::WholeSeconds(field) => {
                vec![*field]
            }
            Self::GreaterThan(a, b) | Self::AtLeast(a, b) => vec![*a, *b],
        }
    }

    /// Field reported when the predicate fails.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Positive(field)
            | Self::OneOf(field, _)
            | Self::WholeSeconds(field)
            | Self::GreaterThan(field, _)
            | Self::AtLeast(field, _) => *field,
        }
    }

    pub fn holds(&self, record: &Record) -> bool {
        match self {
            Self::Positive(field) => record
                .get(field)
                .compare(&Value::Int(0))
                .is_none_or(|ord| ord == Ordering::Greater),
            Self::GreaterThan(a, b) => record
                .get(a)
                .compare(record.get(b))
                .is_none_or(|ord| ord == Ordering::Greater),
            Self::AtLeast(a, b) => record
                .get(a)
                .compare(record.get(b))
                .is_none_or(|ord| ord != Ordering::Less),
            Self::OneOf(field, allowed) => match record.get(field) {
                Value::Null => true,
                Value::Char(c) => allowed.contains(c),
                _ => false,
            },
            Self::WholeSeconds(field) => match record.get(field) {
                Value::Null => true,
                Value::Duration(d) => d.subsec_nanos() == 0,
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    pub name: &'static str,
    pub predicate: Predicate,
}

impl CheckConstraint {
    pub fn new(name: &'static str, predicate: Predicate) -> Self {
        Self { name, predicate }
    }
}

/// Rule that needs a second record to evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrossCheck {
    /// The answer fields populated on the child must match the variant of
    /// the question it references.
    AnswerMatchesVariant {
        name: &'static str,
        question_entity: &'static str,
        question_fk: &'static str,
        selected_field: &'static str,
        boolean_field: &'static str,
    },
}

impl CrossCheck {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnswerMatchesVariant { name, .. } => *name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletePolicy {
    Cascade,
    Restrict,
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cascade => f.write_str("cascade"),
            Self::Restrict => f.write_str("restrict"),
        }
    }
}

/// One parent-to-children edge of the relationship graph. The foreign key
/// fields on the child reference the parent's primary key, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub name: &'static str,
    pub parent: &'static str,
    pub child: &'static str,
    pub foreign_key: Vec<&'static str>,
    pub on_delete: DeletePolicy,
}

impl Relationship {
    pub fn new(
        name: &'static str,
        parent: &'static str,
        child: &'static str,
        foreign_key: &[&'static str],
        on_delete: DeletePolicy,
    ) -> Self {
        Self {
            name,
            parent,
            child,
            foreign_key: foreign_key.to_vec(),
            on_delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub field: &'static str,
    pub variants: Vec<QuestionType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    pub name: &'static str,
    pub fields: Vec<FieldDef>,
    pub primary_key: PrimaryKey,
    pub unique: Vec<UniqueConstraint>,
    pub checks: Vec<CheckConstraint>,
    pub discriminator: Option<Discriminator>,
    pub cross_checks: Vec<CrossCheck>,
}

impl EntityDef {
    pub fn new(name: &'static str, primary_key: PrimaryKey, fields: Vec<FieldDef>) -> Self {
        Self {
            name,
            fields,
            primary_key,
            unique: Vec::new(),
            checks: Vec::new(),
            discriminator: None,
            cross_checks: Vec::new(),
        }
    }

    pub fn unique(mut self, constraint: UniqueConstraint) -> Self {
        self.unique.push(constraint);
        self
    }

    pub fn check(mut self, constraint: CheckConstraint) -> Self {
        self.checks.push(constraint);
        self
    }

    pub fn discriminated_by(mut self, field: &'static str, variants: &[QuestionType]) -> Self {
        self.discriminator = Some(Discriminator {
            field,
            variants: variants.to_vec(),
        });
        self
    }

    pub fn cross_check(mut self, check: CrossCheck) -> Self {
        self.cross_checks.push(check);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Variant selected by the record's discriminator, `None` for
    /// non-discriminated entities.
    pub fn variant_of(&self, record: &Record) -> Result<Option<QuestionType>, SchemaError> {
        let Some(discriminator) = &self.discriminator else {
            return Ok(None);
        };

        let value = record.get(discriminator.field);
        let tag = match value {
            Value::Text(tag) => tag,
            Value::Null => {
                return Err(SchemaError::violation(
                    self.name,
                    discriminator.field,
                    Rule::Required,
                    Value::Null,
                ));
            }
            other => {
                return Err(SchemaError::violation(
                    self.name,
                    discriminator.field,
                    Rule::TypeMismatch(FieldType::Text),
                    other.clone(),
                ));
            }
        };

        let variant: QuestionType = tag.parse()?;
        if discriminator.variants.contains(&variant) {
            Ok(Some(variant))
        } else {
            Err(SchemaError::UnknownVariant(tag.clone()))
        }
    }
}

/// The assembled, immutable schema contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub(super) entities: Vec<EntityDef>,
    pub(super) relationships: Vec<Relationship>,
    pub(super) warnings: Vec<String>,
}

impl Schema {
    /// Entities in declaration order, parents before children.
    pub fn entities(&self) -> &[EntityDef] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn require_entity(&self, name: &str) -> Result<&EntityDef, SchemaError> {
        self.entity(name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.name == name)
    }

    pub fn parents_of<'a>(&'a self, child: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships.iter().filter(move |rel| rel.child == child)
    }

    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships.iter().filter(move |rel| rel.parent == parent)
    }

    /// Non-fatal findings from the build, e.g. redundant unique constraints.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> Value {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid datetime")
            .into()
    }

    #[test]
    fn greater_than_rejects_end_before_start() {
        let predicate = Predicate::GreaterThan("end_date", "start_date");

        let ok = Record::new().with("start_date", at(10)).with("end_date", at(12));
        let bad = Record::new().with("start_date", at(10)).with("end_date", at(9));
        let equal = Record::new().with("start_date", at(10)).with("end_date", at(10));

        assert!(predicate.holds(&ok));
        assert!(!predicate.holds(&bad));
        assert!(!predicate.holds(&equal));
    }

    #[test]
    fn at_least_passes_when_optional_side_is_null() {
        let predicate = Predicate::AtLeast("end_time", "start_time");

        assert!(predicate.holds(&Record::new().with("start_time", at(9))));
        assert!(predicate.holds(&Record::new().with("start_time", at(9)).with("end_time", at(9))));
        assert!(!predicate.holds(&Record::new().with("start_time", at(9)).with("end_time", at(8))));
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        let predicate = Predicate::Positive("max_degree");

        assert!(predicate.holds(&Record::new().with("max_degree", rust_decimal::Decimal::ONE)));
        assert!(!predicate.holds(&Record::new().with("max_degree", rust_decimal::Decimal::ZERO)));
        assert!(!predicate.holds(&Record::new().with("max_degree", -5)));
    }

    #[test]
    fn one_of_accepts_only_listed_chars() {
        let predicate = Predicate::OneOf("correct_option", &['A', 'B', 'C', 'D']);

        assert!(predicate.holds(&Record::new().with("correct_option", 'C')));
        assert!(!predicate.holds(&Record::new().with("correct_option", 'E')));
        assert!(predicate.holds(&Record::new()));
    }

    #[test]
    fn whole_seconds_rejects_fractional_durations() {
        let predicate = Predicate::WholeSeconds("duration");

        assert!(predicate.holds(&Record::new().with("duration", chrono::Duration::seconds(90))));
        assert!(!predicate.holds(
            &Record::new().with("duration", chrono::Duration::milliseconds(90_500))
        ));
        assert!(predicate.holds(&Record::new()));
    }
}

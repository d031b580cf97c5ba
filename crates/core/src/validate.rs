//! Record- and set-level checks against a [`Schema`].

use std::collections::{HashMap, HashSet};
use std::slice;

use tracing::debug;

use crate::domain::{
    FieldType, Key, QuestionType, Record, Rule, SchemaError, Value, answer_shape_matches,
};
use crate::schema::{CrossCheck, EntityDef, Schema};
use crate::seed::SeedSet;

/// Normalizes and checks a single record in isolation: declared fields only,
/// defaults applied, fields of other variants dropped, then requiredness,
/// types, lengths and check constraints.
pub fn check_record(entity: &EntityDef, mut record: Record) -> Result<Record, SchemaError> {
    if let Some((name, value)) = record.fields().find(|(name, _)| entity.field(name).is_none()) {
        return Err(SchemaError::violation(
            entity.name,
            name,
            Rule::UndeclaredField,
            value.clone(),
        ));
    }

    let variant = entity.variant_of(&record)?;

    for field in &entity.fields {
        if !field.applies_to(variant) {
            record.remove(field.name);
            continue;
        }

        if !record.contains(field.name) {
            if let Some(default) = &field.default {
                record.set(field.name, default.clone());
            }
        }

        let value = record.get(field.name);
        let Some(actual) = value.field_type() else {
            if field.nullable {
                continue;
            }
            return Err(SchemaError::violation(
                entity.name,
                field.name,
                Rule::Required,
                Value::Null,
            ));
        };

        match (field.ty, actual) {
            (expected, actual) if expected == actual => {}
            // Integers carry no fractional digits, so the scale bound holds.
            (FieldType::Decimal, FieldType::Int) => {
                let widened = value.as_decimal();
                record.set(field.name, widened);
                continue;
            }
            (expected, _) => {
                return Err(SchemaError::violation(
                    entity.name,
                    field.name,
                    Rule::TypeMismatch(expected),
                    value.clone(),
                ));
            }
        }

        if let (Some(max), Value::Text(text)) = (field.max_len, value) {
            if text.chars().count() > max {
                return Err(SchemaError::violation(
                    entity.name,
                    field.name,
                    Rule::MaxLength(max),
                    value.clone(),
                ));
            }
        }

        if let (Some(scale), Value::Decimal(amount)) = (field.scale, value) {
            if amount.normalize().scale() > scale {
                return Err(SchemaError::violation(
                    entity.name,
                    field.name,
                    Rule::Scale(scale),
                    value.clone(),
                ));
            }
        }
    }

    for check in &entity.checks {
        if !check.predicate.holds(&record) {
            let field = check.predicate.subject();
            return Err(SchemaError::violation(
                entity.name,
                field,
                Rule::Check(check.name),
                record.get(field).clone(),
            ));
        }
    }

    Ok(record)
}

/// [`check_record`] for an entity looked up by name.
pub fn validate_record(
    schema: &Schema,
    entity: &str,
    record: Record,
) -> Result<Record, SchemaError> {
    check_record(schema.require_entity(entity)?, record)
}

/// Every relationship in which `entity` is the child must resolve to a
/// parent. Null foreign keys are not checked.
pub fn check_foreign_keys(
    schema: &Schema,
    entity: &EntityDef,
    record: &Record,
    parent_exists: impl Fn(&str, &Key) -> bool,
) -> Result<(), SchemaError> {
    for rel in schema.parents_of(entity.name) {
        let key = record.key(&rel.foreign_key);
        if key.has_null() {
            continue;
        }
        if !parent_exists(rel.parent, &key) {
            return Err(SchemaError::ForeignKeyUnresolved {
                entity: entity.name.to_string(),
                field: rel.foreign_key.join(","),
                parent: rel.parent.to_string(),
                value: key.to_value(),
            });
        }
    }
    Ok(())
}

/// Rules that need a second record, such as the answer shape against the
/// referenced question's variant. Unresolved references are skipped.
pub fn check_cross_records<'a>(
    schema: &Schema,
    entity: &EntityDef,
    record: &Record,
    lookup: impl Fn(&str, &Key) -> Option<&'a Record>,
) -> Result<(), SchemaError> {
    for cross in &entity.cross_checks {
        match cross {
            CrossCheck::AnswerMatchesVariant {
                name,
                question_entity,
                question_fk,
                selected_field,
                boolean_field,
            } => {
                let fk = record.key(slice::from_ref(question_fk));
                if fk.has_null() {
                    continue;
                }
                // An unresolved question is reported by the foreign key check.
                let Some(question) = lookup(*question_entity, &fk) else {
                    continue;
                };
                let Some(variant) = schema.require_entity(question_entity)?.variant_of(question)?
                else {
                    continue;
                };

                let selected = !record.get(selected_field).is_null();
                let boolean = !record.get(boolean_field).is_null();
                if !answer_shape_matches(variant, selected, boolean) {
                    let field = offending_answer_field(
                        variant,
                        selected,
                        *selected_field,
                        *boolean_field,
                    );
                    return Err(SchemaError::violation(
                        entity.name,
                        field,
                        Rule::Check(*name),
                        record.get(field).clone(),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn offending_answer_field(
    variant: QuestionType,
    has_selected: bool,
    selected_field: &'static str,
    boolean_field: &'static str,
) -> &'static str {
    match variant {
        QuestionType::MultipleChoice if !has_selected => selected_field,
        QuestionType::MultipleChoice => boolean_field,
        QuestionType::TrueFalse if has_selected => selected_field,
        QuestionType::TrueFalse => boolean_field,
        QuestionType::Essay if has_selected => selected_field,
        QuestionType::Essay => boolean_field,
    }
}

#[derive(Default)]
struct SeedIndex<'a> {
    primary: HashMap<&'static str, HashMap<Key, &'a Record>>,
}

impl<'a> SeedIndex<'a> {
    fn get(&self, entity: &str, key: &Key) -> Option<&'a Record> {
        self.primary.get(entity)?.get(key).copied()
    }
}

/// Validates a whole seed set: each record on its own, then primary-key and
/// unique constraints across the set, then foreign keys and cross-record
/// rules against parents anywhere in the set. Returns the first violation.
pub fn validate(schema: &Schema, seed: &SeedSet) -> Result<(), SchemaError> {
    let mut prepared: Vec<(&EntityDef, Record)> = Vec::with_capacity(seed.len());
    let mut taken: HashSet<(&'static str, &'static str, Key)> = HashSet::new();
    let mut primary: HashSet<(&'static str, Key)> = HashSet::new();

    for (entity, record) in seed.iter() {
        let def = schema.require_entity(entity)?;
        let record = check_record(def, record.clone())?;

        let key = record.key(def.primary_key.fields());
        if !primary.insert((def.name, key.clone())) {
            return Err(SchemaError::violation(
                def.name,
                def.primary_key.fields().join(","),
                Rule::PrimaryKey,
                key.to_value(),
            ));
        }

        for unique in &def.unique {
            let key = record.key(&unique.fields);
            if key.has_null() {
                continue;
            }
            if !taken.insert((def.name, unique.name, key.clone())) {
                return Err(SchemaError::violation(
                    def.name,
                    unique.fields.join(","),
                    Rule::Unique(unique.name),
                    key.to_value(),
                ));
            }
        }

        prepared.push((def, record));
    }

    let mut index = SeedIndex::default();
    for (def, record) in &prepared {
        index
            .primary
            .entry(def.name)
            .or_default()
            .insert(record.key(def.primary_key.fields()), record);
    }

    for (def, record) in &prepared {
        check_foreign_keys(schema, def, record, |parent, key| {
            index.get(parent, key).is_some()
        })?;
        check_cross_records(schema, def, record, |entity, key| index.get(entity, key))?;
    }

    debug!(records = prepared.len(), "seed set validated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, CourseId, EntityRecord, Exam, Question, Student, StudentId};
    use crate::schema::{
        COURSE_MAX_DEGREE_CHECK, EXAM_DURATION_WHOLE_SECONDS_CHECK, EXAM_END_AFTER_START_CHECK,
        examination_schema,
    };
    use crate::seed;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn schema() -> Schema {
        examination_schema().expect("schema should build")
    }

    fn at(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn missing_required_field_is_reported() {
        let record = Course::new(CourseId::new(9), "Compilers", Decimal::from(100), at(1, 0))
            .to_record()
            .with("title", Value::Null);

        let err = validate_record(&schema(), Course::ENTITY, record).expect_err("title required");

        assert_eq!(
            err,
            SchemaError::violation("courses", "title", Rule::Required, Value::Null)
        );
    }

    #[test]
    fn over_long_title_is_rejected() {
        let course = Course::new(CourseId::new(9), "x".repeat(201), Decimal::from(100), at(1, 0));

        let err = validate_record(&schema(), Course::ENTITY, course.to_record())
            .expect_err("201 chars is too long");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation { rule: Rule::MaxLength(200), .. }
        ));
    }

    #[test]
    fn non_positive_max_degree_is_rejected() {
        for degree in [Decimal::ZERO, Decimal::from(-10)] {
            let course = Course::new(CourseId::new(9), "Compilers", degree, at(1, 0));

            let err = validate_record(&schema(), Course::ENTITY, course.to_record())
                .expect_err("max degree must be positive");

            assert_eq!(
                err,
                SchemaError::violation(
                    "courses",
                    "max_degree",
                    Rule::Check(COURSE_MAX_DEGREE_CHECK),
                    Value::Decimal(degree),
                )
            );
        }
    }

    #[test]
    fn exam_ending_before_start_is_rejected() {
        let mut exam = seed::exams().remove(0);
        exam.start_date = at(15, 10);
        exam.end_date = at(15, 9);

        let err = validate_record(&schema(), Exam::ENTITY, exam.to_record())
            .expect_err("end before start");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation { rule: Rule::Check(EXAM_END_AFTER_START_CHECK), .. }
        ));
    }

    #[test]
    fn fractional_exam_duration_is_rejected() {
        let mut exam = seed::exams().remove(0);
        exam.duration = chrono::Duration::milliseconds(90_500);

        let err = validate_record(&schema(), Exam::ENTITY, exam.to_record())
            .expect_err("sub-second duration");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation {
                rule: Rule::Check(EXAM_DURATION_WHOLE_SECONDS_CHECK),
                ..
            }
        ));
    }

    #[test]
    fn over_long_email_is_rejected() {
        let email = format!("{}@example.edu", "a".repeat(244));
        let student = Student::new(StudentId::new(9), "Ada", email, "s0009", at(1, 0));

        let err = validate_record(&schema(), Student::ENTITY, student.to_record())
            .expect_err("256 chars is too long");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation { ref field, rule: Rule::MaxLength(255), .. }
                if field == "email"
        ));
    }

    #[test]
    fn marks_beyond_two_decimal_places_are_rejected() {
        let record = seed::questions()[0]
            .to_record()
            .with("marks", Decimal::new(5555, 3));

        let err = validate_record(&schema(), Question::ENTITY, record).expect_err("5.555");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation { rule: Rule::Scale(2), .. }
        ));

        let record = seed::questions()[0]
            .to_record()
            .with("marks", Decimal::new(55000, 4));
        let record = validate_record(&schema(), Question::ENTITY, record)
            .expect("trailing zeros do not count");
        assert_eq!(record.get("marks"), &Value::Decimal(Decimal::new(55, 1)));
    }

    #[test]
    fn defaults_are_applied_when_field_is_absent() {
        let mut record = Course::new(CourseId::new(9), "Compilers", Decimal::from(100), at(1, 0))
            .to_record();
        record.remove("is_active");

        let record = validate_record(&schema(), Course::ENTITY, record).expect("valid course");

        assert_eq!(record.get("is_active"), &Value::Bool(true));
    }

    #[test]
    fn undeclared_field_is_rejected() {
        let record = Course::new(CourseId::new(9), "Compilers", Decimal::from(100), at(1, 0))
            .to_record()
            .with("credits", 3);

        let err = validate_record(&schema(), Course::ENTITY, record).expect_err("unknown field");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation { rule: Rule::UndeclaredField, .. }
        ));
    }

    #[test]
    fn question_with_unknown_tag_fails_with_unknown_variant() {
        let record = seed::questions()[0]
            .to_record()
            .with("question_type", "ShortAnswer");

        let err = validate_record(&schema(), "questions", record).expect_err("bad tag");

        assert_eq!(err, SchemaError::UnknownVariant("ShortAnswer".to_string()));
    }

    #[test]
    fn essay_drops_fields_of_other_variants() {
        let essay = seed::questions()
            .into_iter()
            .find(|q| q.question_type() == QuestionType::Essay)
            .expect("seed has an essay");
        let record = essay.to_record().with("correct_option", 'A');

        let record = validate_record(&schema(), "questions", record).expect("essay is valid");

        assert!(!record.contains("correct_option"));
        assert_eq!(record.get("max_word_count"), &Value::Int(500));
    }

    #[test]
    fn seed_dataset_is_valid() {
        validate(&schema(), &seed::dataset()).expect("seed should satisfy the schema");
    }

    #[test]
    fn duplicate_email_in_seed_is_rejected() {
        let mut seed = seed::dataset();
        let mut clone = seed::students().remove(0);
        clone.id = crate::domain::StudentId::new(99);
        clone.student_number = "s9999".to_string();
        seed.push(&clone);

        let err = validate(&schema(), &seed).expect_err("email must be unique");

        assert!(matches!(
            err,
            SchemaError::ConstraintViolation { rule: Rule::Unique("IX_Students_Email"), .. }
        ));
    }

    #[test]
    fn dangling_foreign_key_in_seed_is_rejected() {
        let mut seed = seed::dataset();
        let mut exam = seed::exams().remove(0);
        exam.id = crate::domain::ExamId::new(50);
        exam.course_id = CourseId::new(404);
        seed.push(&exam);

        let err = validate(&schema(), &seed).expect_err("course 404 does not exist");

        assert_eq!(
            err,
            SchemaError::ForeignKeyUnresolved {
                entity: "exams".to_string(),
                field: "course_id".to_string(),
                parent: "courses".to_string(),
                value: Value::Int(404),
            }
        );
    }

    #[test]
    fn duplicate_enrollment_pair_in_seed_is_rejected() {
        let mut seed = seed::dataset();
        seed.push(&seed::student_courses()[0]);

        let err = validate(&schema(), &seed).expect_err("pair must be unique");

        assert!(err.is_primary_key_conflict());
    }
}

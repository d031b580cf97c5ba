//! Conversion between schema records and relational rows, dispatched per
//! table.

use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use examhall_core::domain::{
    Course, EntityRecord, Exam, ExamAttempt, FieldType, Instructor, InstructorCourse, Question,
    QuestionType, Student, StudentAnswer, StudentCourse,
};
use examhall_core::{Key, Record, Rule, SchemaError, Value};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr,
};

use crate::entity::{
    course, exam, exam_attempt, instructor, instructor_course, question, student, student_answer,
    student_course,
};
use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Courses,
    Students,
    Instructors,
    Exams,
    Questions,
    StudentCourses,
    InstructorCourses,
    ExamAttempts,
    StudentAnswers,
}

impl Table {
    pub const ALL: [Table; 9] = [
        Self::Courses,
        Self::Students,
        Self::Instructors,
        Self::Exams,
        Self::Questions,
        Self::StudentCourses,
        Self::InstructorCourses,
        Self::ExamAttempts,
        Self::StudentAnswers,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Courses => Course::ENTITY,
            Self::Students => Student::ENTITY,
            Self::Instructors => Instructor::ENTITY,
            Self::Exams => Exam::ENTITY,
            Self::Questions => Question::ENTITY,
            Self::StudentCourses => StudentCourse::ENTITY,
            Self::InstructorCourses => InstructorCourse::ENTITY,
            Self::ExamAttempts => ExamAttempt::ENTITY,
            Self::StudentAnswers => StudentAnswer::ENTITY,
        }
    }

    pub fn parse(name: &str) -> std::result::Result<Self, SchemaError> {
        Self::ALL
            .into_iter()
            .find(|table| table.name() == name)
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }
}

/// Typed reads out of a record that already passed `check_record`.
struct Fields<'a> {
    entity: &'static str,
    record: &'a Record,
}

impl Fields<'_> {
    fn optional<T>(
        &self,
        field: &str,
        expected: FieldType,
        read: impl Fn(&Value) -> Option<T>,
    ) -> std::result::Result<Option<T>, SchemaError> {
        let value = self.record.get(field);
        if value.is_null() {
            return Ok(None);
        }
        read(value).map(Some).ok_or_else(|| {
            SchemaError::violation(self.entity, field, Rule::TypeMismatch(expected), value.clone())
        })
    }

    fn required<T>(
        &self,
        field: &str,
        expected: FieldType,
        read: impl Fn(&Value) -> Option<T>,
    ) -> std::result::Result<T, SchemaError> {
        self.optional(field, expected, read)?
            .ok_or_else(|| SchemaError::violation(self.entity, field, Rule::Required, Value::Null))
    }

    fn int(&self, field: &str) -> std::result::Result<i32, SchemaError> {
        self.required(field, FieldType::Int, |v| {
            v.as_int().and_then(|raw| i32::try_from(raw).ok())
        })
    }

    fn opt_int(&self, field: &str) -> std::result::Result<Option<i32>, SchemaError> {
        self.optional(field, FieldType::Int, |v| {
            v.as_int().and_then(|raw| i32::try_from(raw).ok())
        })
    }

    fn text(&self, field: &str) -> std::result::Result<String, SchemaError> {
        self.required(field, FieldType::Text, |v| v.as_text().map(str::to_string))
    }

    fn opt_text(&self, field: &str) -> std::result::Result<Option<String>, SchemaError> {
        self.optional(field, FieldType::Text, |v| v.as_text().map(str::to_string))
    }

    fn opt_letter(&self, field: &str) -> std::result::Result<Option<String>, SchemaError> {
        self.optional(field, FieldType::Char, |v| v.as_char().map(String::from))
    }

    fn flag(&self, field: &str) -> std::result::Result<bool, SchemaError> {
        self.required(field, FieldType::Bool, Value::as_bool)
    }

    fn opt_flag(&self, field: &str) -> std::result::Result<Option<bool>, SchemaError> {
        self.optional(field, FieldType::Bool, Value::as_bool)
    }

    fn decimal(&self, field: &str) -> std::result::Result<Decimal, SchemaError> {
        self.required(field, FieldType::Decimal, Value::as_decimal)
    }

    fn opt_decimal(&self, field: &str) -> std::result::Result<Option<Decimal>, SchemaError> {
        self.optional(field, FieldType::Decimal, Value::as_decimal)
    }

    fn datetime(&self, field: &str) -> std::result::Result<NaiveDateTime, SchemaError> {
        self.required(field, FieldType::DateTime, Value::as_datetime)
    }

    fn opt_datetime(&self, field: &str) -> std::result::Result<Option<NaiveDateTime>, SchemaError> {
        self.optional(field, FieldType::DateTime, Value::as_datetime)
    }

    /// Whole seconds; sub-second durations are rejected by the schema.
    fn seconds(&self, field: &str) -> std::result::Result<i64, SchemaError> {
        self.required(field, FieldType::Duration, |v| {
            v.as_duration()
                .filter(|d| d.subsec_nanos() == 0)
                .map(|d| d.num_seconds())
        })
    }

    fn question_type(&self, field: &str) -> std::result::Result<i16, SchemaError> {
        let tag = self.text(field)?;
        Ok(tag.parse::<QuestionType>()?.code())
    }
}

fn key_part(table: Table, key: &Key, index: usize) -> std::result::Result<i32, SchemaError> {
    key.values()
        .get(index)
        .and_then(Value::as_int)
        .and_then(|raw| i32::try_from(raw).ok())
        .ok_or_else(|| SchemaError::NotFound {
            entity: table.name().to_string(),
            key: key.to_string(),
        })
}

fn letter(stored: Option<String>) -> Option<char> {
    stored.and_then(|s| s.chars().next())
}

pub(crate) async fn insert<C: ConnectionTrait>(
    conn: &C,
    table: Table,
    record: &Record,
) -> Result<()> {
    let f = Fields {
        entity: table.name(),
        record,
    };

    let written = match table {
        Table::Courses => {
            course::Entity::insert(course::ActiveModel {
                id: Set(f.int("id")?),
                title: Set(f.text("title")?),
                description: Set(f.opt_text("description")?),
                max_degree: Set(f.decimal("max_degree")?),
                created_date: Set(f.datetime("created_date")?),
                is_active: Set(f.flag("is_active")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::Students => {
            student::Entity::insert(student::ActiveModel {
                id: Set(f.int("id")?),
                name: Set(f.text("name")?),
                email: Set(f.text("email")?),
                student_number: Set(f.text("student_number")?),
                enrollment_date: Set(f.datetime("enrollment_date")?),
                is_active: Set(f.flag("is_active")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::Instructors => {
            instructor::Entity::insert(instructor::ActiveModel {
                id: Set(f.int("id")?),
                name: Set(f.text("name")?),
                email: Set(f.text("email")?),
                specialization: Set(f.text("specialization")?),
                hire_date: Set(f.datetime("hire_date")?),
                is_active: Set(f.flag("is_active")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::Exams => {
            exam::Entity::insert(exam::ActiveModel {
                id: Set(f.int("id")?),
                title: Set(f.text("title")?),
                description: Set(f.opt_text("description")?),
                total_marks: Set(f.decimal("total_marks")?),
                duration_seconds: Set(f.seconds("duration")?),
                start_date: Set(f.datetime("start_date")?),
                end_date: Set(f.datetime("end_date")?),
                course_id: Set(f.int("course_id")?),
                instructor_id: Set(f.int("instructor_id")?),
                is_active: Set(f.flag("is_active")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::Questions => {
            question::Entity::insert(question::ActiveModel {
                id: Set(f.int("id")?),
                question_text: Set(f.text("question_text")?),
                marks: Set(f.decimal("marks")?),
                created_date: Set(f.datetime("created_date")?),
                exam_id: Set(f.int("exam_id")?),
                question_type: Set(f.question_type("question_type")?),
                option_a: Set(f.opt_text("option_a")?),
                option_b: Set(f.opt_text("option_b")?),
                option_c: Set(f.opt_text("option_c")?),
                option_d: Set(f.opt_text("option_d")?),
                correct_option: Set(f.opt_letter("correct_option")?),
                correct_answer: Set(f.opt_flag("correct_answer")?),
                max_word_count: Set(f.opt_int("max_word_count")?),
                grading_criteria: Set(f.opt_text("grading_criteria")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::StudentCourses => {
            student_course::Entity::insert(student_course::ActiveModel {
                student_id: Set(f.int("student_id")?),
                course_id: Set(f.int("course_id")?),
                enrollment_date: Set(f.datetime("enrollment_date")?),
                grade: Set(f.opt_decimal("grade")?),
                is_completed: Set(f.flag("is_completed")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::InstructorCourses => {
            instructor_course::Entity::insert(instructor_course::ActiveModel {
                instructor_id: Set(f.int("instructor_id")?),
                course_id: Set(f.int("course_id")?),
                assigned_date: Set(f.datetime("assigned_date")?),
                is_active: Set(f.flag("is_active")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::ExamAttempts => {
            exam_attempt::Entity::insert(exam_attempt::ActiveModel {
                id: Set(f.int("id")?),
                start_time: Set(f.datetime("start_time")?),
                end_time: Set(f.opt_datetime("end_time")?),
                total_score: Set(f.opt_decimal("total_score")?),
                is_submitted: Set(f.flag("is_submitted")?),
                is_graded: Set(f.flag("is_graded")?),
                student_id: Set(f.int("student_id")?),
                exam_id: Set(f.int("exam_id")?),
            })
            .exec_without_returning(conn)
            .await
        }
        Table::StudentAnswers => {
            student_answer::Entity::insert(student_answer::ActiveModel {
                id: Set(f.int("id")?),
                answer_text: Set(f.text("answer_text")?),
                selected_option: Set(f.opt_letter("selected_option")?),
                boolean_answer: Set(f.opt_flag("boolean_answer")?),
                marks_obtained: Set(f.opt_decimal("marks_obtained")?),
                submitted_at: Set(f.datetime("submitted_at")?),
                exam_attempt_id: Set(f.int("exam_attempt_id")?),
                question_id: Set(f.int("question_id")?),
            })
            .exec_without_returning(conn)
            .await
        }
    };

    written.map_err(StoreError::from_write)?;
    Ok(())
}

pub(crate) async fn fetch<C: ConnectionTrait>(
    conn: &C,
    table: Table,
    key: &Key,
) -> Result<Option<Record>> {
    let id = |index| key_part(table, key, index);

    let record = match table {
        Table::Courses => course::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(course_record),
        Table::Students => student::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(student_record),
        Table::Instructors => instructor::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(instructor_record),
        Table::Exams => exam::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(exam_record),
        Table::Questions => question::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(question_record)
            .transpose()?,
        Table::StudentCourses => student_course::Entity::find_by_id((id(0)?, id(1)?))
            .one(conn)
            .await?
            .map(student_course_record),
        Table::InstructorCourses => instructor_course::Entity::find_by_id((id(0)?, id(1)?))
            .one(conn)
            .await?
            .map(instructor_course_record),
        Table::ExamAttempts => exam_attempt::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(exam_attempt_record),
        Table::StudentAnswers => student_answer::Entity::find_by_id(id(0)?)
            .one(conn)
            .await?
            .map(student_answer_record),
    };

    Ok(record)
}

/// Whether a stored row already holds `key` in `fields`.
pub(crate) async fn taken<C: ConnectionTrait>(
    conn: &C,
    table: Table,
    fields: &[&str],
    key: &Key,
) -> Result<bool> {
    match table {
        Table::Courses => any_row::<course::Entity, C>(conn, fields, key).await,
        Table::Students => any_row::<student::Entity, C>(conn, fields, key).await,
        Table::Instructors => any_row::<instructor::Entity, C>(conn, fields, key).await,
        Table::Exams => any_row::<exam::Entity, C>(conn, fields, key).await,
        Table::Questions => any_row::<question::Entity, C>(conn, fields, key).await,
        Table::StudentCourses => any_row::<student_course::Entity, C>(conn, fields, key).await,
        Table::InstructorCourses => {
            any_row::<instructor_course::Entity, C>(conn, fields, key).await
        }
        Table::ExamAttempts => any_row::<exam_attempt::Entity, C>(conn, fields, key).await,
        Table::StudentAnswers => any_row::<student_answer::Entity, C>(conn, fields, key).await,
    }
}

async fn any_row<E: EntityTrait, C: ConnectionTrait>(
    conn: &C,
    fields: &[&str],
    key: &Key,
) -> Result<bool> {
    let mut select = E::find();
    for (field, value) in fields.iter().zip(key.values()) {
        let column = E::Column::from_str(field)
            .map_err(|_| DbErr::Custom(format!("unknown column '{field}'")))?;
        select = select.filter(column.eq(column_value(value)));
    }
    Ok(select.one(conn).await?.is_some())
}

fn column_value(value: &Value) -> sea_orm::Value {
    match value {
        Value::Null => sea_orm::Value::String(None),
        Value::Int(v) => (*v).into(),
        Value::Text(v) => v.clone().into(),
        Value::Char(v) => v.to_string().into(),
        Value::Bool(v) => (*v).into(),
        Value::Decimal(v) => (*v).into(),
        Value::DateTime(v) => (*v).into(),
        Value::Duration(v) => v.num_seconds().into(),
    }
}

/// Deletes one row; the database applies the cascade and restrict actions
/// of the foreign keys pointing at it.
pub(crate) async fn delete<C: ConnectionTrait>(conn: &C, table: Table, key: &Key) -> Result<u64> {
    let id = |index| key_part(table, key, index);

    let deleted = match table {
        Table::Courses => course::Entity::delete_by_id(id(0)?).exec(conn).await,
        Table::Students => student::Entity::delete_by_id(id(0)?).exec(conn).await,
        Table::Instructors => instructor::Entity::delete_by_id(id(0)?).exec(conn).await,
        Table::Exams => exam::Entity::delete_by_id(id(0)?).exec(conn).await,
        Table::Questions => question::Entity::delete_by_id(id(0)?).exec(conn).await,
        Table::StudentCourses => {
            student_course::Entity::delete_by_id((id(0)?, id(1)?))
                .exec(conn)
                .await
        }
        Table::InstructorCourses => {
            instructor_course::Entity::delete_by_id((id(0)?, id(1)?))
                .exec(conn)
                .await
        }
        Table::ExamAttempts => exam_attempt::Entity::delete_by_id(id(0)?).exec(conn).await,
        Table::StudentAnswers => student_answer::Entity::delete_by_id(id(0)?).exec(conn).await,
    };

    match deleted {
        Ok(result) => Ok(result.rows_affected),
        Err(err) => Err(restricted(table, key, err)),
    }
}

fn restricted(table: Table, key: &Key, err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StoreError::RestrictedDeletion {
            entity: table.name().to_string(),
            key: key.to_string(),
            detail,
        },
        _ => StoreError::Database(err),
    }
}

pub(crate) async fn count<C: ConnectionTrait>(conn: &C, table: Table) -> Result<u64> {
    let rows = match table {
        Table::Courses => course::Entity::find().count(conn).await?,
        Table::Students => student::Entity::find().count(conn).await?,
        Table::Instructors => instructor::Entity::find().count(conn).await?,
        Table::Exams => exam::Entity::find().count(conn).await?,
        Table::Questions => question::Entity::find().count(conn).await?,
        Table::StudentCourses => student_course::Entity::find().count(conn).await?,
        Table::InstructorCourses => instructor_course::Entity::find().count(conn).await?,
        Table::ExamAttempts => exam_attempt::Entity::find().count(conn).await?,
        Table::StudentAnswers => student_answer::Entity::find().count(conn).await?,
    };
    Ok(rows)
}

fn course_record(model: course::Model) -> Record {
    Record::new()
        .with("id", model.id)
        .with("title", model.title)
        .with("description", model.description)
        .with("max_degree", model.max_degree)
        .with("created_date", model.created_date)
        .with("is_active", model.is_active)
}

fn student_record(model: student::Model) -> Record {
    Record::new()
        .with("id", model.id)
        .with("name", model.name)
        .with("email", model.email)
        .with("student_number", model.student_number)
        .with("enrollment_date", model.enrollment_date)
        .with("is_active", model.is_active)
}

fn instructor_record(model: instructor::Model) -> Record {
    Record::new()
        .with("id", model.id)
        .with("name", model.name)
        .with("email", model.email)
        .with("specialization", model.specialization)
        .with("hire_date", model.hire_date)
        .with("is_active", model.is_active)
}

fn exam_record(model: exam::Model) -> Record {
    Record::new()
        .with("id", model.id)
        .with("title", model.title)
        .with("description", model.description)
        .with("total_marks", model.total_marks)
        .with("duration", Duration::seconds(model.duration_seconds))
        .with("start_date", model.start_date)
        .with("end_date", model.end_date)
        .with("course_id", model.course_id)
        .with("instructor_id", model.instructor_id)
        .with("is_active", model.is_active)
}

/// Rebuilds the tagged record from the `question_type` code; columns of the
/// other variants are left out.
fn question_record(model: question::Model) -> std::result::Result<Record, SchemaError> {
    let question_type = QuestionType::from_code(model.question_type)?;
    let record = Record::new()
        .with("id", model.id)
        .with("question_text", model.question_text)
        .with("marks", model.marks)
        .with("created_date", model.created_date)
        .with("exam_id", model.exam_id)
        .with("question_type", question_type);

    Ok(match question_type {
        QuestionType::MultipleChoice => record
            .with("option_a", model.option_a)
            .with("option_b", model.option_b)
            .with("option_c", model.option_c)
            .with("option_d", model.option_d)
            .with("correct_option", letter(model.correct_option)),
        QuestionType::TrueFalse => record.with("correct_answer", model.correct_answer),
        QuestionType::Essay => record
            .with("max_word_count", model.max_word_count)
            .with("grading_criteria", model.grading_criteria),
    })
}

fn student_course_record(model: student_course::Model) -> Record {
    Record::new()
        .with("student_id", model.student_id)
        .with("course_id", model.course_id)
        .with("enrollment_date", model.enrollment_date)
        .with("grade", model.grade)
        .with("is_completed", model.is_completed)
}

fn instructor_course_record(model: instructor_course::Model) -> Record {
    Record::new()
        .with("instructor_id", model.instructor_id)
        .with("course_id", model.course_id)
        .with("assigned_date", model.assigned_date)
        .with("is_active", model.is_active)
}

fn exam_attempt_record(model: exam_attempt::Model) -> Record {
    Record::new()
        .with("id", model.id)
        .with("start_time", model.start_time)
        .with("end_time", model.end_time)
        .with("total_score", model.total_score)
        .with("is_submitted", model.is_submitted)
        .with("is_graded", model.is_graded)
        .with("student_id", model.student_id)
        .with("exam_id", model.exam_id)
}

fn student_answer_record(model: student_answer::Model) -> Record {
    Record::new()
        .with("id", model.id)
        .with("answer_text", model.answer_text)
        .with("selected_option", letter(model.selected_option))
        .with("boolean_answer", model.boolean_answer)
        .with("marks_obtained", model.marks_obtained)
        .with("submitted_at", model.submitted_at)
        .with("exam_attempt_id", model.exam_attempt_id)
        .with("question_id", model.question_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid datetime")
    }

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(Table::parse(table.name()).expect("known table"), table);
        }
        assert_eq!(
            Table::parse("grades"),
            Err(SchemaError::UnknownEntity("grades".to_string()))
        );
    }

    #[test]
    fn test_question_record_drops_other_variant_columns() {
        let model = question::Model {
            id: 2,
            question_text: "SQL is a programming language".to_string(),
            marks: Decimal::new(5, 0),
            created_date: noon(),
            exam_id: 2,
            question_type: QuestionType::TrueFalse.code(),
            option_a: Some("stale".to_string()),
            option_b: None,
            option_c: None,
            option_d: None,
            correct_option: None,
            correct_answer: Some(false),
            max_word_count: None,
            grading_criteria: None,
        };

        let record = question_record(model).expect("known code");
        assert_eq!(record.get("question_type"), &Value::from("TrueFalse"));
        assert_eq!(record.get("correct_answer"), &Value::Bool(false));
        assert!(!record.contains("option_a"));
    }

    #[test]
    fn test_unknown_question_code_is_rejected() {
        let model = question::Model {
            id: 9,
            question_text: "?".to_string(),
            marks: Decimal::ONE,
            created_date: noon(),
            exam_id: 1,
            question_type: 7,
            option_a: None,
            option_b: None,
            option_c: None,
            option_d: None,
            correct_option: None,
            correct_answer: None,
            max_word_count: None,
            grading_criteria: None,
        };

        assert_eq!(
            question_record(model),
            Err(SchemaError::UnknownVariant("7".to_string()))
        );
    }

    #[test]
    fn test_exam_duration_is_stored_in_seconds() {
        let record = Record::new().with("duration", Duration::seconds(90));
        let fields = Fields {
            entity: Exam::ENTITY,
            record: &record,
        };
        assert_eq!(fields.seconds("duration").expect("duration"), 90);

        let fractional = Record::new().with("duration", Duration::milliseconds(1500));
        let fields = Fields {
            entity: Exam::ENTITY,
            record: &fractional,
        };
        assert!(matches!(
            fields.seconds("duration"),
            Err(SchemaError::ConstraintViolation { rule: Rule::TypeMismatch(FieldType::Duration), .. })
        ));
    }

    #[test]
    fn test_composite_key_parts() {
        let key = Key::new(vec![Value::Int(3), Value::Int(1)]);
        assert_eq!(key_part(Table::StudentCourses, &key, 1).expect("second part"), 1);
        assert!(matches!(
            key_part(Table::StudentCourses, &key, 2),
            Err(SchemaError::NotFound { .. })
        ));
    }
}

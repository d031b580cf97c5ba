//! The examination platform's schema contract.

use super::{
    CheckConstraint, CrossCheck, DeletePolicy, EntityDef, FieldDef, Predicate, PrimaryKey,
    Relationship, Schema, SchemaBuilder, UniqueConstraint,
};
use crate::domain::{
    Course, EntityRecord, Exam, ExamAttempt, FieldType, Instructor, InstructorCourse, OptionLetter,
    Question, QuestionType, SchemaError, Student, StudentAnswer, StudentCourse,
    CORRECT_OPTION_CHECK,
};

use DeletePolicy::{Cascade, Restrict};
use FieldType::{Bool, Char, DateTime, Decimal, Duration, Int, Text};

pub const COURSE_MAX_DEGREE_CHECK: &str = "CK_Course_MaxDegree_Positive";
pub const EXAM_END_AFTER_START_CHECK: &str = "CK_Exam_EndDateAfterStart";
pub const QUESTION_MARKS_CHECK: &str = "CK_Question_Marks_Positive";
pub const ATTEMPT_END_AFTER_START_CHECK: &str = "CK_ExamAttempt_EndTimeAfterStart";
pub const ANSWER_SELECTED_OPTION_CHECK: &str = "CK_StudentAnswer_SelectedOption_Valid";
pub const ANSWER_MATCHES_QUESTION_CHECK: &str = "CK_StudentAnswer_MatchesQuestionType";
pub const EXAM_DURATION_WHOLE_SECONDS_CHECK: &str = "CK_Exam_Duration_WholeSeconds";

/// Decimal places kept for marks, degrees and grades.
const SCALE: u32 = 2;

fn id() -> FieldDef {
    FieldDef::required("id", Int)
}

fn courses() -> EntityDef {
    EntityDef::new(
        Course::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("title", Text).max_len(200),
            FieldDef::optional("description", Text).max_len(1000),
            FieldDef::required("max_degree", Decimal).scale(SCALE),
            FieldDef::required("created_date", DateTime),
            FieldDef::required("is_active", Bool).default_value(true),
        ],
    )
    .check(CheckConstraint::new(
        COURSE_MAX_DEGREE_CHECK,
        Predicate::Positive("max_degree"),
    ))
}

fn students() -> EntityDef {
    EntityDef::new(
        Student::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("name", Text).max_len(100),
            FieldDef::required("email", Text).max_len(255),
            FieldDef::required("student_number", Text).max_len(20),
            FieldDef::required("enrollment_date", DateTime),
            FieldDef::required("is_active", Bool).default_value(true),
        ],
    )
    .unique(UniqueConstraint::new("IX_Students_Email", &["email"]))
    .unique(UniqueConstraint::new(
        "IX_Students_StudentNumber",
        &["student_number"],
    ))
}

fn instructors() -> EntityDef {
    EntityDef::new(
        Instructor::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("name", Text).max_len(100),
            FieldDef::required("email", Text).max_len(255),
            FieldDef::required("specialization", Text).max_len(150),
            FieldDef::required("hire_date", DateTime),
            FieldDef::required("is_active", Bool).default_value(true),
        ],
    )
    .unique(UniqueConstraint::new("IX_Instructors_Email", &["email"]))
}

fn exams() -> EntityDef {
    EntityDef::new(
        Exam::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("title", Text).max_len(200),
            FieldDef::optional("description", Text).max_len(500),
            FieldDef::required("total_marks", Decimal).scale(SCALE),
            FieldDef::required("duration", Duration),
            FieldDef::required("start_date", DateTime),
            FieldDef::required("end_date", DateTime),
            FieldDef::required("course_id", Int),
            FieldDef::required("instructor_id", Int),
            FieldDef::required("is_active", Bool).default_value(true),
        ],
    )
    .check(CheckConstraint::new(
        EXAM_END_AFTER_START_CHECK,
        Predicate::GreaterThan("end_date", "start_date"),
    ))
    .check(CheckConstraint::new(
        EXAM_DURATION_WHOLE_SECONDS_CHECK,
        Predicate::WholeSeconds("duration"),
    ))
}

fn questions() -> EntityDef {
    use QuestionType::{Essay, MultipleChoice, TrueFalse};

    EntityDef::new(
        Question::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("question_text", Text).max_len(1000),
            FieldDef::required("marks", Decimal).scale(SCALE),
            FieldDef::required("created_date", DateTime),
            FieldDef::required("exam_id", Int),
            FieldDef::required("question_type", Text),
            FieldDef::required("option_a", Text).max_len(500).variant(MultipleChoice),
            FieldDef::required("option_b", Text).max_len(500).variant(MultipleChoice),
            FieldDef::required("option_c", Text).max_len(500).variant(MultipleChoice),
            FieldDef::required("option_d", Text).max_len(500).variant(MultipleChoice),
            FieldDef::required("correct_option", Char).variant(MultipleChoice),
            FieldDef::required("correct_answer", Bool).variant(TrueFalse),
            FieldDef::optional("max_word_count", Int).variant(Essay),
            FieldDef::optional("grading_criteria", Text)
                .max_len(1000)
                .variant(Essay),
        ],
    )
    .discriminated_by("question_type", &QuestionType::ALL)
    .check(CheckConstraint::new(
        QUESTION_MARKS_CHECK,
        Predicate::Positive("marks"),
    ))
    .check(CheckConstraint::new(
        CORRECT_OPTION_CHECK,
        Predicate::OneOf("correct_option", &OptionLetter::LETTERS),
    ))
}

fn student_courses() -> EntityDef {
    EntityDef::new(
        StudentCourse::ENTITY,
        PrimaryKey::Composite(vec!["student_id", "course_id"]),
        vec![
            FieldDef::required("student_id", Int),
            FieldDef::required("course_id", Int),
            FieldDef::required("enrollment_date", DateTime),
            FieldDef::optional("grade", Decimal).scale(SCALE),
            FieldDef::required("is_completed", Bool).default_value(false),
        ],
    )
}

fn instructor_courses() -> EntityDef {
    EntityDef::new(
        InstructorCourse::ENTITY,
        PrimaryKey::Composite(vec!["instructor_id", "course_id"]),
        vec![
            FieldDef::required("instructor_id", Int),
            FieldDef::required("course_id", Int),
            FieldDef::required("assigned_date", DateTime),
            FieldDef::required("is_active", Bool).default_value(true),
        ],
    )
}

fn exam_attempts() -> EntityDef {
    EntityDef::new(
        ExamAttempt::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("student_id", Int),
            FieldDef::required("exam_id", Int),
            FieldDef::required("start_time", DateTime),
            FieldDef::optional("end_time", DateTime),
            FieldDef::optional("total_score", Decimal).scale(SCALE),
            FieldDef::required("is_submitted", Bool).default_value(false),
            FieldDef::required("is_graded", Bool).default_value(false),
        ],
    )
    .check(CheckConstraint::new(
        ATTEMPT_END_AFTER_START_CHECK,
        Predicate::AtLeast("end_time", "start_time"),
    ))
}

fn student_answers() -> EntityDef {
    EntityDef::new(
        StudentAnswer::ENTITY,
        PrimaryKey::Single("id"),
        vec![
            id(),
            FieldDef::required("exam_attempt_id", Int),
            FieldDef::required("question_id", Int),
            FieldDef::required("answer_text", Text).max_len(2000),
            FieldDef::optional("selected_option", Char),
            FieldDef::optional("boolean_answer", Bool),
            FieldDef::optional("marks_obtained", Decimal).scale(SCALE),
            FieldDef::required("submitted_at", DateTime),
        ],
    )
    .check(CheckConstraint::new(
        ANSWER_SELECTED_OPTION_CHECK,
        Predicate::OneOf("selected_option", &OptionLetter::LETTERS),
    ))
    .cross_check(CrossCheck::AnswerMatchesVariant {
        name: ANSWER_MATCHES_QUESTION_CHECK,
        question_entity: Question::ENTITY,
        question_fk: "question_id",
        selected_field: "selected_option",
        boolean_field: "boolean_answer",
    })
}

/// Builds the full examination schema: entities in dependency order and
/// every relationship with its deletion policy.
pub fn examination_schema() -> Result<Schema, SchemaError> {
    SchemaBuilder::new()
        .entity(courses())
        .entity(students())
        .entity(instructors())
        .entity(exams())
        .entity(questions())
        .entity(student_courses())
        .entity(instructor_courses())
        .entity(exam_attempts())
        .entity(student_answers())
        .relationship(Relationship::new(
            "FK_Exams_Courses",
            Course::ENTITY,
            Exam::ENTITY,
            &["course_id"],
            Restrict,
        ))
        .relationship(Relationship::new(
            "FK_Exams_Instructors",
            Instructor::ENTITY,
            Exam::ENTITY,
            &["instructor_id"],
            Restrict,
        ))
        .relationship(Relationship::new(
            "FK_Questions_Exams",
            Exam::ENTITY,
            Question::ENTITY,
            &["exam_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_StudentCourses_Students",
            Student::ENTITY,
            StudentCourse::ENTITY,
            &["student_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_StudentCourses_Courses",
            Course::ENTITY,
            StudentCourse::ENTITY,
            &["course_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_InstructorCourses_Instructors",
            Instructor::ENTITY,
            InstructorCourse::ENTITY,
            &["instructor_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_InstructorCourses_Courses",
            Course::ENTITY,
            InstructorCourse::ENTITY,
            &["course_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_ExamAttempts_Students",
            Student::ENTITY,
            ExamAttempt::ENTITY,
            &["student_id"],
            Restrict,
        ))
        .relationship(Relationship::new(
            "FK_ExamAttempts_Exams",
            Exam::ENTITY,
            ExamAttempt::ENTITY,
            &["exam_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_StudentAnswers_ExamAttempts",
            ExamAttempt::ENTITY,
            StudentAnswer::ENTITY,
            &["exam_attempt_id"],
            Cascade,
        ))
        .relationship(Relationship::new(
            "FK_StudentAnswers_Questions",
            Question::ENTITY,
            StudentAnswer::ENTITY,
            &["question_id"],
            Restrict,
        ))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn examination_schema_builds_without_warnings() {
        let schema = examination_schema().expect("schema should build");

        assert_eq!(schema.entities().len(), 9);
        assert_eq!(schema.relationships().len(), 11);
        assert!(schema.warnings().is_empty());
    }

    #[test]
    fn exam_owns_questions_and_attempts() {
        let schema = examination_schema().expect("schema should build");

        let owned: Vec<(&str, DeletePolicy)> = schema
            .children_of(Exam::ENTITY)
            .map(|rel| (rel.child, rel.on_delete))
            .collect();

        assert_eq!(
            owned,
            vec![(Question::ENTITY, Cascade), (ExamAttempt::ENTITY, Cascade)]
        );
    }

    #[test]
    fn course_restricts_exams_but_cascades_junctions() {
        let schema = examination_schema().expect("schema should build");

        for rel in schema.children_of(Course::ENTITY) {
            let expected = if rel.child == Exam::ENTITY { Restrict } else { Cascade };
            assert_eq!(rel.on_delete, expected, "{}", rel.name);
        }
    }

    #[test]
    fn junction_entities_use_composite_keys() {
        let schema = examination_schema().expect("schema should build");

        let enrollment = schema.entity(StudentCourse::ENTITY).expect("declared");
        assert_eq!(
            enrollment.primary_key.fields(),
            &["student_id", "course_id"]
        );
        let assignment = schema.entity(InstructorCourse::ENTITY).expect("declared");
        assert_eq!(
            assignment.primary_key.fields(),
            &["instructor_id", "course_id"]
        );
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use examhall_core::domain::{
    Course, CourseId, ExamAttempt, ExamAttemptId, ExamId, Instructor, InstructorId, OptionLetter,
    QuestionId, StudentAnswer, StudentAnswerId, StudentCourse, StudentId,
};
use examhall_core::schema::{ANSWER_MATCHES_QUESTION_CHECK, ATTEMPT_END_AFTER_START_CHECK};
use examhall_core::{Key, MemoryStore, Rule, SchemaError, StorageBackend, bootstrap};
use rust_decimal::Decimal;

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid datetime")
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let inserted = bootstrap(&mut store).expect("seed should load");
    assert_eq!(inserted, 20);
    store
}

fn attempt(id: i32, student: i32, exam: i32) -> ExamAttempt {
    ExamAttempt::start(
        ExamAttemptId::new(id),
        StudentId::new(student),
        ExamId::new(exam),
        at(3, 15, 10),
    )
}

fn answer(id: i32, attempt: i32, question: i32) -> StudentAnswer {
    StudentAnswer {
        id: StudentAnswerId::new(id),
        exam_attempt_id: ExamAttemptId::new(attempt),
        question_id: QuestionId::new(question),
        answer_text: String::new(),
        selected_option: None,
        boolean_answer: None,
        marks_obtained: None,
        submitted_at: at(3, 15, 11),
    }
}

#[test]
fn test_bootstrap_loads_every_seed_record() {
    let store = seeded_store();

    assert_eq!(store.count("courses"), 3);
    assert_eq!(store.count("students"), 5);
    assert_eq!(store.count("instructors"), 2);
    assert_eq!(store.count("exams"), 2);
    assert_eq!(store.count("questions"), 3);
    assert_eq!(store.count("student_courses"), 3);
    assert_eq!(store.count("instructor_courses"), 2);
}

#[test]
fn test_bootstrap_twice_fails_on_primary_key_and_keeps_data() {
    let mut store = seeded_store();

    let err = bootstrap(&mut store).expect_err("second bootstrap must fail");

    assert_eq!(
        err,
        SchemaError::violation("courses", "id", Rule::PrimaryKey, examhall_core::Value::Int(1))
    );
    assert_eq!(store.count("courses"), 3);
    assert_eq!(store.count("students"), 5);
}

#[test]
fn test_insert_before_schema_is_rejected() {
    let mut store = MemoryStore::new();
    let course = Course::new(CourseId::new(1), "Compilers", Decimal::from(100), at(1, 1, 0));

    let err = store.insert_entity(&course).expect_err("no schema yet");

    assert!(matches!(err, SchemaError::SchemaDefinition(_)));
}

#[test]
fn test_duplicate_instructor_email_is_rejected() {
    let mut store = seeded_store();
    let duplicate = Instructor::new(
        InstructorId::new(3),
        "Dr. Someone Else",
        "omar.khaled@example.com",
        "Networks",
        at(1, 1, 0),
    );

    let err = store
        .insert_entity(&duplicate)
        .expect_err("email already used");

    assert!(matches!(
        err,
        SchemaError::ConstraintViolation { rule: Rule::Unique("IX_Instructors_Email"), .. }
    ));
    assert_eq!(store.count("instructors"), 2);
}

#[test]
fn test_duplicate_enrollment_pair_is_rejected() {
    let mut store = seeded_store();
    let again = StudentCourse::new(StudentId::new(1), CourseId::new(1), at(2, 1, 0));

    let err = store.insert_entity(&again).expect_err("pair already enrolled");

    assert!(err.is_primary_key_conflict());
}

#[test]
fn test_enrollment_for_missing_student_is_unresolved() {
    let mut store = seeded_store();
    let orphan = StudentCourse::new(StudentId::new(77), CourseId::new(1), at(2, 1, 0));

    let err = store.insert_entity(&orphan).expect_err("student 77 missing");

    assert!(matches!(err, SchemaError::ForeignKeyUnresolved { ref parent, .. } if parent == "students"));
}

#[test]
fn test_delete_course_with_exam_is_restricted() {
    let mut store = seeded_store();

    let err = store
        .delete("courses", &Key::single(1))
        .expect_err("course 1 has an exam");

    assert_eq!(
        err,
        SchemaError::RestrictedDeletion {
            entity: "courses".to_string(),
            key: "(1)".to_string(),
            child: "exams".to_string(),
        }
    );
    assert_eq!(store.count("courses"), 3);
    assert_eq!(store.count("student_courses"), 3);
}

#[test]
fn test_delete_course_without_exams_succeeds() {
    let mut store = seeded_store();

    let removed = store
        .delete("courses", &Key::single(2))
        .expect("course 2 has no exams");

    assert_eq!(removed, 1);
    assert_eq!(store.count("courses"), 2);
}

#[test]
fn test_delete_student_cascades_enrollments() {
    let mut store = seeded_store();

    let removed = store
        .delete("students", &Key::single(2))
        .expect("student 2 has no attempts");

    assert_eq!(removed, 2);
    assert_eq!(store.count("student_courses"), 2);
}

#[test]
fn test_delete_student_with_attempt_is_restricted() {
    let mut store = seeded_store();
    store.insert_entity(&attempt(1, 1, 1)).expect("attempt");

    let err = store
        .delete("students", &Key::single(1))
        .expect_err("student 1 has an attempt");

    assert!(matches!(err, SchemaError::RestrictedDeletion { ref child, .. } if child == "exam_attempts"));
}

#[test]
fn test_delete_exam_cascades_questions_attempts_and_answers() {
    let mut store = seeded_store();
    store.insert_entity(&attempt(1, 1, 1)).expect("attempt");
    let mut picked = answer(1, 1, 1);
    picked.selected_option = Some(OptionLetter::A);
    store.insert_entity(&picked).expect("answer");

    let removed = store
        .delete("exams", &Key::single(1))
        .expect("exam delete cascades");

    assert_eq!(removed, 4);
    assert_eq!(store.count("exams"), 1);
    assert_eq!(store.count("questions"), 2);
    assert_eq!(store.count("exam_attempts"), 0);
    assert_eq!(store.count("student_answers"), 0);
}

#[test]
fn test_delete_question_with_answers_is_restricted() {
    let mut store = seeded_store();
    store.insert_entity(&attempt(1, 1, 2)).expect("attempt");
    let mut judged = answer(1, 1, 2);
    judged.boolean_answer = Some(true);
    store.insert_entity(&judged).expect("answer");

    let err = store
        .delete("questions", &Key::single(2))
        .expect_err("answer still references question 2");

    assert!(matches!(err, SchemaError::RestrictedDeletion { ref child, .. } if child == "student_answers"));
    assert_eq!(store.count("questions"), 3);
}

#[test]
fn test_answer_must_match_question_variant() {
    let mut store = seeded_store();
    store.insert_entity(&attempt(1, 1, 1)).expect("attempt");
    let mut wrong = answer(1, 1, 1);
    wrong.boolean_answer = Some(true);

    let err = store.insert_entity(&wrong).expect_err("multiple choice needs an option");

    assert_eq!(
        err,
        SchemaError::violation(
            "student_answers",
            "selected_option",
            Rule::Check(ANSWER_MATCHES_QUESTION_CHECK),
            examhall_core::Value::Null,
        )
    );
}

#[test]
fn test_attempt_ending_before_start_is_rejected() {
    let mut store = seeded_store();
    let mut early = attempt(1, 1, 1);
    early.end_time = Some(at(3, 15, 9));

    let err = store.insert_entity(&early).expect_err("end before start");

    assert!(matches!(
        err,
        SchemaError::ConstraintViolation { rule: Rule::Check(ATTEMPT_END_AFTER_START_CHECK), .. }
    ));
}

#[test]
fn test_failed_transaction_rolls_back_earlier_inserts() {
    let mut store = seeded_store();
    let fresh = Course::new(CourseId::new(10), "Compilers", Decimal::from(100), at(1, 1, 0));
    let broken = Course::new(CourseId::new(11), "Broken", Decimal::ZERO, at(1, 1, 0));

    let result = store.within_transaction(|tx| {
        tx.insert_entity(&fresh)?;
        tx.insert_entity(&broken)
    });

    assert!(result.is_err());
    assert!(store.get("courses", &Key::single(CourseId::new(10))).is_none());
    assert_eq!(store.count("courses"), 3);
}

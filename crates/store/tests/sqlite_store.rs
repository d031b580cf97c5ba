use chrono::{Duration, NaiveDate, NaiveDateTime};
use examhall_core::domain::{
    Course, CourseId, ExamAttempt, ExamAttemptId, ExamId, OptionLetter, QuestionId, QuestionKind,
    QuestionType, Student, StudentAnswer, StudentAnswerId, StudentId,
};
use examhall_core::schema::{ANSWER_MATCHES_QUESTION_CHECK, EXAM_DURATION_WHOLE_SECONDS_CHECK};
use examhall_core::seed::{self, SeedSet};
use examhall_core::{Key, Rule, SchemaError, Value, examination_schema};
use examhall_store::{RecordStore, SeaOrmStore, StoreConfig, StoreError, bootstrap, db};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid datetime")
}

async fn connect() -> DatabaseConnection {
    let config = StoreConfig::from_str(r#"database_url = "sqlite::memory:""#)
        .expect("config should parse");
    db::init_pool_and_migrate(&config)
        .await
        .expect("sqlite in-memory database should migrate")
}

async fn seeded_store() -> SeaOrmStore {
    let db = connect().await;
    let inserted = bootstrap(&db).await.expect("seed should load");
    assert_eq!(inserted, 20);
    SeaOrmStore::new(db, examination_schema().expect("schema builds"))
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

#[tokio::test]
async fn test_bootstrap_loads_every_seed_record() {
    let store = seeded_store().await;

    for (entity, expected) in [
        ("courses", 3),
        ("students", 5),
        ("instructors", 2),
        ("exams", 2),
        ("questions", 3),
        ("student_courses", 3),
        ("instructor_courses", 2),
        ("exam_attempts", 0),
        ("student_answers", 0),
    ] {
        assert_eq!(store.count(entity).await.expect("count"), expected, "{entity}");
    }
}

#[tokio::test]
async fn test_second_bootstrap_fails_on_primary_key() {
    let db = connect().await;
    bootstrap(&db).await.expect("first run");

    let err = bootstrap(&db).await.expect_err("second run must fail");
    let store = SeaOrmStore::new(db, examination_schema().expect("schema builds"));

    assert!(err.is_primary_key_conflict());
    assert!(matches!(
        err,
        StoreError::Schema(SchemaError::ConstraintViolation { ref entity, ref value, .. })
            if entity == "courses" && *value == Value::Int(1)
    ));
    assert_eq!(store.count("courses").await.expect("count"), 3);
}

#[tokio::test]
async fn test_failed_seed_rolls_back_the_whole_batch() {
    let store = seeded_store().await;
    let mut seed = SeedSet::new();
    seed.push(&Course::new(
        CourseId::new(10),
        "Compilers",
        Decimal::from(100),
        at(1, 1, 0),
    ));
    seed.push(&Course::new(
        CourseId::new(1),
        "Clashes with seed",
        Decimal::from(100),
        at(1, 1, 0),
    ));

    let err = store.load(seed).await.expect_err("course 1 already stored");

    assert!(err.is_primary_key_conflict());
    assert_eq!(
        store
            .get("courses", &Key::single(CourseId::new(10)))
            .await
            .expect("lookup"),
        None
    );
    assert_eq!(store.count("courses").await.expect("count"), 3);
}

#[tokio::test]
async fn test_question_reads_back_as_its_variant() {
    let store = seeded_store().await;

    let question = store
        .question(QuestionId::new(3))
        .await
        .expect("lookup")
        .expect("question 3 is seeded");

    assert_eq!(question.question_type(), QuestionType::Essay);
    assert!(matches!(
        question.kind,
        QuestionKind::Essay(ref essay) if essay.max_word_count == Some(500)
    ));

    let choice = store
        .question(QuestionId::new(1))
        .await
        .expect("lookup")
        .expect("question 1 is seeded");
    assert!(matches!(
        choice.kind,
        QuestionKind::MultipleChoice(ref mc) if mc.correct_option == OptionLetter::A
    ));
}

#[tokio::test]
async fn test_duplicate_student_email_is_rejected() {
    let store = seeded_store().await;
    let first = &seed::students()[0];
    let duplicate = Student::new(
        StudentId::new(6),
        "Someone Else",
        first.email.as_str(),
        "s9999",
        at(1, 1, 0),
    );

    let err = store
        .insert_entity(&duplicate)
        .await
        .expect_err("email already used");

    assert!(matches!(
        err,
        StoreError::Schema(SchemaError::ConstraintViolation {
            ref field,
            rule: Rule::Unique("IX_Students_Email"),
            ..
        }) if field == "email"
    ));
    assert_eq!(store.count("students").await.expect("count"), 5);
}

#[tokio::test]
async fn test_exam_duration_keeps_its_seconds() {
    let store = seeded_store().await;
    let mut exam = seed::exams().remove(0);
    exam.id = ExamId::new(3);
    exam.duration = Duration::seconds(90);
    store.insert_entity(&exam).await.expect("90 seconds is valid");

    let stored = store
        .get("exams", &Key::single(3))
        .await
        .expect("lookup")
        .expect("exam 3 was inserted");

    assert_eq!(stored.get("duration").as_duration(), Some(Duration::seconds(90)));

    exam.id = ExamId::new(4);
    exam.duration = Duration::milliseconds(90_500);
    let err = store
        .insert_entity(&exam)
        .await
        .expect_err("sub-second duration");

    assert!(matches!(
        err,
        StoreError::Schema(SchemaError::ConstraintViolation {
            rule: Rule::Check(EXAM_DURATION_WHOLE_SECONDS_CHECK),
            ..
        })
    ));
    assert_eq!(store.count("exams").await.expect("count"), 3);
}

#[tokio::test]
async fn test_attempt_for_missing_exam_is_unresolved() {
    let store = seeded_store().await;

    let err = store
        .insert_entity(&attempt(1, 1, 99))
        .await
        .expect_err("exam 99 missing");

    assert!(matches!(
        err,
        StoreError::Schema(SchemaError::ForeignKeyUnresolved { ref parent, .. }) if parent == "exams"
    ));
}

#[tokio::test]
async fn test_answer_must_match_question_variant() {
    let store = seeded_store().await;
    store
        .insert_entity(&attempt(1, 1, 2))
        .await
        .expect("attempt");
    let mut wrong = answer(1, 1, 2);
    wrong.selected_option = Some(OptionLetter::B);

    let err = store
        .insert_entity(&wrong)
        .await
        .expect_err("true/false needs a boolean answer");

    assert!(matches!(
        err,
        StoreError::Schema(SchemaError::ConstraintViolation {
            rule: Rule::Check(ANSWER_MATCHES_QUESTION_CHECK),
            ..
        })
    ));
}

#[tokio::test]
async fn test_delete_course_with_exam_is_restricted() {
    let store = seeded_store().await;

    let err = store
        .delete("courses", &Key::single(1))
        .await
        .expect_err("course 1 has an exam");

    assert!(matches!(
        err,
        StoreError::RestrictedDeletion { ref entity, ref key, .. } if entity == "courses" && key == "(1)"
    ));
    assert_eq!(store.count("courses").await.expect("count"), 3);
    assert_eq!(store.count("student_courses").await.expect("count"), 3);
}

#[tokio::test]
async fn test_delete_student_cascades_enrollments() {
    let store = seeded_store().await;

    let removed = store
        .delete("students", &Key::single(2))
        .await
        .expect("student 2 has no attempts");

    assert_eq!(removed, 1);
    assert_eq!(store.count("students").await.expect("count"), 4);
    assert_eq!(store.count("student_courses").await.expect("count"), 2);
}

#[tokio::test]
async fn test_delete_exam_cascades_through_attempts_to_answers() {
    let store = seeded_store().await;
    store
        .insert_entity(&attempt(1, 1, 1))
        .await
        .expect("attempt");
    let mut picked = answer(1, 1, 1);
    picked.selected_option = Some(OptionLetter::A);
    store.insert_entity(&picked).await.expect("answer");

    store
        .delete("exams", &Key::single(1))
        .await
        .expect("exam delete cascades");

    assert_eq!(store.count("exams").await.expect("count"), 1);
    assert_eq!(store.count("questions").await.expect("count"), 2);
    assert_eq!(store.count("exam_attempts").await.expect("count"), 0);
    assert_eq!(store.count("student_answers").await.expect("count"), 0);
}

#[tokio::test]
async fn test_delete_question_with_answers_is_restricted() {
    let store = seeded_store().await;
    store
        .insert_entity(&attempt(1, 1, 2))
        .await
        .expect("attempt");
    let mut judged = answer(1, 1, 2);
    judged.boolean_answer = Some(true);
    store.insert_entity(&judged).await.expect("answer");

    let err = store
        .delete("questions", &Key::single(2))
        .await
        .expect_err("answer still references question 2");

    assert!(matches!(err, StoreError::RestrictedDeletion { .. }));
    assert_eq!(store.count("questions").await.expect("count"), 3);
}

#[tokio::test]
async fn test_delete_missing_record_is_not_found() {
    let store = seeded_store().await;

    let err = store
        .delete("instructors", &Key::single(42))
        .await
        .expect_err("no instructor 42");

    assert!(matches!(err, StoreError::Schema(SchemaError::NotFound { .. })));
}

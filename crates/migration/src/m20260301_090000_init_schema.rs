use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Restrict edges are declared NO ACTION rather than RESTRICT: the check runs
// at statement end, so a cascade that also removes the referencing rows
// (exam -> attempts -> answers alongside exam -> questions) still succeeds.
const RESTRICT: ForeignKeyAction = ForeignKeyAction::NoAction;
const CASCADE: ForeignKeyAction = ForeignKeyAction::Cascade;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(integer(Course::Id).primary_key())
                    .col(string_len(Course::Title, 200))
                    .col(string_len_null(Course::Description, 1000))
                    .col(
                        decimal_len(Course::MaxDegree, 16, 2)
                            .check(Expr::col(Course::MaxDegree).gt(0)),
                    )
                    .col(timestamp(Course::CreatedDate))
                    .col(boolean(Course::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(integer(Student::Id).primary_key())
                    .col(string_len(Student::Name, 100))
                    .col(string_len(Student::Email, 255).unique_key())
                    .col(string_len(Student::StudentNumber, 20).unique_key())
                    .col(timestamp(Student::EnrollmentDate))
                    .col(boolean(Student::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Instructor::Table)
                    .if_not_exists()
                    .col(integer(Instructor::Id).primary_key())
                    .col(string_len(Instructor::Name, 100))
                    .col(string_len(Instructor::Email, 255).unique_key())
                    .col(string_len(Instructor::Specialization, 150))
                    .col(timestamp(Instructor::HireDate))
                    .col(boolean(Instructor::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Exam::Table)
                    .if_not_exists()
                    .col(integer(Exam::Id).primary_key())
                    .col(string_len(Exam::Title, 200))
                    .col(string_len_null(Exam::Description, 500))
                    .col(decimal_len(Exam::TotalMarks, 16, 2))
                    .col(big_integer(Exam::DurationSeconds))
                    .col(timestamp(Exam::StartDate))
                    .col(timestamp(Exam::EndDate))
                    .col(integer(Exam::CourseId))
                    .col(integer(Exam::InstructorId))
                    .col(boolean(Exam::IsActive).default(true))
                    .check(Expr::col(Exam::EndDate).gt(Expr::col(Exam::StartDate)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exams-course_id")
                            .from(Exam::Table, Exam::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(RESTRICT),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exams-instructor_id")
                            .from(Exam::Table, Exam::InstructorId)
                            .to(Instructor::Table, Instructor::Id)
                            .on_delete(RESTRICT),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(integer(Question::Id).primary_key())
                    .col(string_len(Question::QuestionText, 1000))
                    .col(
                        decimal_len(Question::Marks, 16, 2)
                            .check(Expr::col(Question::Marks).gt(0)),
                    )
                    .col(timestamp(Question::CreatedDate))
                    .col(integer(Question::ExamId))
                    // Discriminator. 0=multiple_choice, 1=true_false, 2=essay
                    .col(
                        small_integer(Question::QuestionType)
                            .check(Expr::col(Question::QuestionType).gte(0))
                            .check(Expr::col(Question::QuestionType).lte(2)),
                    )
                    .col(string_len_null(Question::OptionA, 500))
                    .col(string_len_null(Question::OptionB, 500))
                    .col(string_len_null(Question::OptionC, 500))
                    .col(string_len_null(Question::OptionD, 500))
                    .col(
                        char_len_null(Question::CorrectOption, 1)
                            .check(Expr::col(Question::CorrectOption).is_in(["A", "B", "C", "D"])),
                    )
                    .col(boolean_null(Question::CorrectAnswer))
                    .col(integer_null(Question::MaxWordCount))
                    .col(string_len_null(Question::GradingCriteria, 1000))
                    // Variant-required columns.
                    .check(
                        Expr::col(Question::QuestionType).ne(0).or(Expr::col(Question::OptionA)
                            .is_not_null()
                            .and(Expr::col(Question::OptionB).is_not_null())
                            .and(Expr::col(Question::OptionC).is_not_null())
                            .and(Expr::col(Question::OptionD).is_not_null())
                            .and(Expr::col(Question::CorrectOption).is_not_null())),
                    )
                    .check(
                        Expr::col(Question::QuestionType)
                            .ne(1)
                            .or(Expr::col(Question::CorrectAnswer).is_not_null()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-questions-exam_id")
                            .from(Question::Table, Question::ExamId)
                            .to(Exam::Table, Exam::Id)
                            .on_delete(CASCADE),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentCourse::Table)
                    .if_not_exists()
                    .col(integer(StudentCourse::StudentId))
                    .col(integer(StudentCourse::CourseId))
                    .col(timestamp(StudentCourse::EnrollmentDate))
                    .col(decimal_len_null(StudentCourse::Grade, 16, 2))
                    .col(boolean(StudentCourse::IsCompleted).default(false))
                    .primary_key(
                        Index::create()
                            .col(StudentCourse::StudentId)
                            .col(StudentCourse::CourseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student_courses-student_id")
                            .from(StudentCourse::Table, StudentCourse::StudentId)
                            .to(Student::Table, Student::Id)
                            .on_delete(CASCADE),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student_courses-course_id")
                            .from(StudentCourse::Table, StudentCourse::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(CASCADE),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InstructorCourse::Table)
                    .if_not_exists()
                    .col(integer(InstructorCourse::InstructorId))
                    .col(integer(InstructorCourse::CourseId))
                    .col(timestamp(InstructorCourse::AssignedDate))
                    .col(boolean(InstructorCourse::IsActive).default(true))
                    .primary_key(
                        Index::create()
                            .col(InstructorCourse::InstructorId)
                            .col(InstructorCourse::CourseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-instructor_courses-instructor_id")
                            .from(InstructorCourse::Table, InstructorCourse::InstructorId)
                            .to(Instructor::Table, Instructor::Id)
                            .on_delete(CASCADE),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-instructor_courses-course_id")
                            .from(InstructorCourse::Table, InstructorCourse::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(CASCADE),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExamAttempt::Table)
                    .if_not_exists()
                    .col(integer(ExamAttempt::Id).primary_key())
                    .col(timestamp(ExamAttempt::StartTime))
                    .col(timestamp_null(ExamAttempt::EndTime))
                    .col(decimal_len_null(ExamAttempt::TotalScore, 16, 2))
                    .col(boolean(ExamAttempt::IsSubmitted).default(false))
                    .col(boolean(ExamAttempt::IsGraded).default(false))
                    .col(integer(ExamAttempt::StudentId))
                    .col(integer(ExamAttempt::ExamId))
                    .check(Expr::col(ExamAttempt::EndTime).gte(Expr::col(ExamAttempt::StartTime)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exam_attempts-student_id")
                            .from(ExamAttempt::Table, ExamAttempt::StudentId)
                            .to(Student::Table, Student::Id)
                            .on_delete(RESTRICT),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exam_attempts-exam_id")
                            .from(ExamAttempt::Table, ExamAttempt::ExamId)
                            .to(Exam::Table, Exam::Id)
                            .on_delete(CASCADE),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentAnswer::Table)
                    .if_not_exists()
                    .col(integer(StudentAnswer::Id).primary_key())
                    .col(string_len(StudentAnswer::AnswerText, 2000))
                    .col(
                        char_len_null(StudentAnswer::SelectedOption, 1).check(
                            Expr::col(StudentAnswer::SelectedOption).is_in(["A", "B", "C", "D"]),
                        ),
                    )
                    .col(boolean_null(StudentAnswer::BooleanAnswer))
                    .col(decimal_len_null(StudentAnswer::MarksObtained, 16, 2))
                    .col(timestamp(StudentAnswer::SubmittedAt))
                    .col(integer(StudentAnswer::ExamAttemptId))
                    .col(integer(StudentAnswer::QuestionId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student_answers-exam_attempt_id")
                            .from(StudentAnswer::Table, StudentAnswer::ExamAttemptId)
                            .to(ExamAttempt::Table, ExamAttempt::Id)
                            .on_delete(CASCADE),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student_answers-question_id")
                            .from(StudentAnswer::Table, StudentAnswer::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(RESTRICT),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exams_start_date")
                    .table(Exam::Table)
                    .col(Exam::StartDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exams_course_id")
                    .table(Exam::Table)
                    .col(Exam::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_questions_exam_id")
                    .table(Question::Table)
                    .col(Question::ExamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exam_attempts_start_time")
                    .table(ExamAttempt::Table)
                    .col(ExamAttempt::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exam_attempts_exam_id")
                    .table(ExamAttempt::Table)
                    .col(ExamAttempt::ExamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_answers_exam_attempt_id")
                    .table(StudentAnswer::Table)
                    .col(StudentAnswer::ExamAttemptId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentAnswer::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ExamAttempt::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(InstructorCourse::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(StudentCourse::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Exam::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Instructor::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Course {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    Title,
    Description,
    MaxDegree,
    CreatedDate,
    IsActive,
}

#[derive(DeriveIden)]
enum Student {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    Name,
    Email,
    StudentNumber,
    EnrollmentDate,
    IsActive,
}

#[derive(DeriveIden)]
enum Instructor {
    #[sea_orm(iden = "instructors")]
    Table,
    Id,
    Name,
    Email,
    Specialization,
    HireDate,
    IsActive,
}

#[derive(DeriveIden)]
enum Exam {
    #[sea_orm(iden = "exams")]
    Table,
    Id,
    Title,
    Description,
    TotalMarks,
    DurationSeconds,
    StartDate,
    EndDate,
    CourseId,
    InstructorId,
    IsActive,
}

#[derive(DeriveIden)]
enum Question {
    #[sea_orm(iden = "questions")]
    Table,
    Id,
    QuestionText,
    Marks,
    CreatedDate,
    ExamId,
    QuestionType,
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    CorrectOption,
    CorrectAnswer,
    MaxWordCount,
    GradingCriteria,
}

#[derive(DeriveIden)]
enum StudentCourse {
    #[sea_orm(iden = "student_courses")]
    Table,
    StudentId,
    CourseId,
    EnrollmentDate,
    Grade,
    IsCompleted,
}

#[derive(DeriveIden)]
enum InstructorCourse {
    #[sea_orm(iden = "instructor_courses")]
    Table,
    InstructorId,
    CourseId,
    AssignedDate,
    IsActive,
}

#[derive(DeriveIden)]
enum ExamAttempt {
    #[sea_orm(iden = "exam_attempts")]
    Table,
    Id,
    StartTime,
    EndTime,
    TotalScore,
    IsSubmitted,
    IsGraded,
    StudentId,
    ExamId,
}

#[derive(DeriveIden)]
enum StudentAnswer {
    #[sea_orm(iden = "student_answers")]
    Table,
    Id,
    AnswerText,
    SelectedOption,
    BooleanAnswer,
    MarksObtained,
    SubmittedAt,
    ExamAttemptId,
    QuestionId,
}

mod attempt;
mod course;
mod enrollment;
mod error;
mod exam;
mod ids;
mod person;
mod question;
mod value;

pub use attempt::{ExamAttempt, StudentAnswer, answer_shape_matches};
pub use course::Course;
pub use enrollment::{InstructorCourse, StudentCourse};
pub use error::{Rule, SchemaError};
pub use exam::Exam;
pub use ids::{
    CourseId, ExamAttemptId, ExamId, InstructorId, QuestionId, StudentAnswerId, StudentId,
};
pub use person::{Instructor, Student};
pub use question::{
    Essay, MultipleChoice, OptionLetter, Question, QuestionKind, QuestionType, TrueFalse,
};
pub use question::CORRECT_OPTION_CHECK;
pub use value::{EntityRecord, FieldType, Key, Record, Value};

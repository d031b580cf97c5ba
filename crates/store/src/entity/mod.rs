pub mod course;
pub mod exam;
pub mod exam_attempt;
pub mod instructor;
pub mod instructor_course;
pub mod question;
pub mod student;
pub mod student_answer;
pub mod student_course;

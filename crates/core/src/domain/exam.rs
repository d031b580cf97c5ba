use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

use super::{CourseId, EntityRecord, ExamId, InstructorId, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    pub id: ExamId,
    pub title: String,
    pub description: Option<String>,
    pub total_marks: Decimal,
    pub duration: Duration,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub course_id: CourseId,
    pub instructor_id: InstructorId,
    pub is_active: bool,
}

impl Exam {
    /// Scheduled window length, independent of the allotted `duration`.
    pub fn window(&self) -> Duration {
        self.end_date - self.start_date
    }
}

impl EntityRecord for Exam {
    const ENTITY: &'static str = "exams";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("title", self.title.as_str())
            .with("description", self.description.clone())
            .with("total_marks", self.total_marks)
            .with("duration", self.duration)
            .with("start_date", self.start_date)
            .with("end_date", self.end_date)
            .with("course_id", self.course_id)
            .with("instructor_id", self.instructor_id)
            .with("is_active", self.is_active)
    }
}

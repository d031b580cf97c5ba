use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{CourseId, EntityRecord, InstructorId, Record, StudentId};

/// Student enrolled in a course, keyed by the `(student_id, course_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCourse {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrollment_date: NaiveDateTime,
    pub grade: Option<Decimal>,
    pub is_completed: bool,
}

impl StudentCourse {
    pub fn new(student_id: StudentId, course_id: CourseId, enrollment_date: NaiveDateTime) -> Self {
        Self {
            student_id,
            course_id,
            enrollment_date,
            grade: None,
            is_completed: false,
        }
    }
}

impl EntityRecord for StudentCourse {
    const ENTITY: &'static str = "student_courses";

    fn to_record(&self) -> Record {
        Record::new()
            .with("student_id", self.student_id)
            .with("course_id", self.course_id)
            .with("enrollment_date", self.enrollment_date)
            .with("grade", self.grade)
            .with("is_completed", self.is_completed)
    }
}

/// Instructor assigned to a course, keyed by the `(instructor_id, course_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorCourse {
    pub instructor_id: InstructorId,
    pub course_id: CourseId,
    pub assigned_date: NaiveDateTime,
    pub is_active: bool,
}

impl InstructorCourse {
    pub fn new(instructor_id: InstructorId, course_id: CourseId, assigned_date: NaiveDateTime) -> Self {
        Self {
            instructor_id,
            course_id,
            assigned_date,
            is_active: true,
        }
    }
}

impl EntityRecord for InstructorCourse {
    const ENTITY: &'static str = "instructor_courses";

    fn to_record(&self) -> Record {
        Record::new()
            .with("instructor_id", self.instructor_id)
            .with("course_id", self.course_id)
            .with("assigned_date", self.assigned_date)
            .with("is_active", self.is_active)
    }
}

use chrono::NaiveDateTime;

use super::{EntityRecord, InstructorId, Record, StudentId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub student_number: String,
    pub enrollment_date: NaiveDateTime,
    pub is_active: bool,
}

impl Student {
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        email: impl Into<String>,
        student_number: impl Into<String>,
        enrollment_date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            student_number: student_number.into(),
            enrollment_date,
            is_active: true,
        }
    }
}

impl EntityRecord for Student {
    const ENTITY: &'static str = "students";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("email", self.email.as_str())
            .with("student_number", self.student_number.as_str())
            .with("enrollment_date", self.enrollment_date)
            .with("is_active", self.is_active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    pub id: InstructorId,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub hire_date: NaiveDateTime,
    pub is_active: bool,
}

impl Instructor {
    pub fn new(
        id: InstructorId,
        name: impl Into<String>,
        email: impl Into<String>,
        specialization: impl Into<String>,
        hire_date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            specialization: specialization.into(),
            hire_date,
            is_active: true,
        }
    }
}

impl EntityRecord for Instructor {
    const ENTITY: &'static str = "instructors";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("email", self.email.as_str())
            .with("specialization", self.specialization.as_str())
            .with("hire_date", self.hire_date)
            .with("is_active", self.is_active)
    }
}

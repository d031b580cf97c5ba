//! The literal initial dataset, expressed as typed fixtures.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::{
    Course, CourseId, EntityRecord, Essay, Exam, ExamId, Instructor, InstructorCourse,
    InstructorId, MultipleChoice, OptionLetter, Question, QuestionId, QuestionKind, Record,
    Student, StudentCourse, StudentId, TrueFalse,
};

/// Only called with the literal dates below.
fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("seed dates are literal calendar dates")
}

fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    at(year, month, day, 0)
}

/// Records in insertion order, parents before children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSet {
    records: Vec<(&'static str, Record)>,
}

impl SeedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<E: EntityRecord>(&mut self, entity: &E) {
        self.records.push((E::ENTITY, entity.to_record()));
    }

    pub fn extend<E: EntityRecord>(&mut self, entities: &[E]) {
        for entity in entities {
            self.push(entity);
        }
    }

    pub fn push_record(&mut self, entity: &'static str, record: Record) {
        self.records.push((entity, record));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count(&self, entity: &str) -> usize {
        self.records.iter().filter(|(name, _)| *name == entity).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Record)> {
        self.records.iter().map(|(entity, record)| (*entity, record))
    }
}

impl IntoIterator for SeedSet {
    type Item = (&'static str, Record);
    type IntoIter = std::vec::IntoIter<(&'static str, Record)>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

pub fn courses() -> Vec<Course> {
    vec![
        Course::new(
            CourseId::new(1),
            "Introduction to Programming",
            Decimal::from(100),
            day(2023, 9, 1),
        )
        .with_description("Basic programming concepts"),
        Course::new(
            CourseId::new(2),
            "Data Structures",
            Decimal::from(100),
            day(2023, 12, 1),
        )
        .with_description("Algorithms and structures"),
        Course::new(
            CourseId::new(3),
            "Database Systems",
            Decimal::from(100),
            day(2024, 1, 1),
        )
        .with_description("Relational databases and SQL"),
    ]
}

pub fn students() -> Vec<Student> {
    vec![
        Student::new(StudentId::new(1), "Salma Osama", "Salma@gmail.com", "s1001", day(2024, 10, 1)),
        Student::new(StudentId::new(2), "Sara Ahmed", "Sara@gmail.com", "s1002", day(2024, 10, 15)),
        Student::new(StudentId::new(3), "Omar Ali", "Omar@gmail.com", "s1003", day(2024, 10, 26)),
        Student::new(StudentId::new(4), "Menna Khaled", "Menna@gmail.com", "s1004", day(2024, 2, 1)),
        Student::new(StudentId::new(5), "Bilal Hassan", "Bilal@gmail.com", "s1005", day(2024, 1, 5)),
    ]
}

pub fn instructors() -> Vec<Instructor> {
    vec![
        Instructor::new(
            InstructorId::new(1),
            "Prof. Omar Khaled",
            "omar.khaled@example.com",
            "Software Engineering",
            day(2022, 9, 1),
        ),
        Instructor::new(
            InstructorId::new(2),
            "Dr. Laila Mansour",
            "laila.mansour@example.com",
            "Databases",
            day(2020, 2, 1),
        ),
    ]
}

pub fn exams() -> Vec<Exam> {
    vec![
        Exam {
            id: ExamId::new(1),
            title: "Intro Programming Midterm".to_string(),
            description: Some("Midterm exam covering basics".to_string()),
            total_marks: Decimal::from(50),
            duration: Duration::hours(2),
            start_date: at(2024, 3, 15, 10),
            end_date: at(2024, 3, 15, 12),
            course_id: CourseId::new(1),
            instructor_id: InstructorId::new(1),
            is_active: true,
        },
        Exam {
            id: ExamId::new(2),
            title: "Database Systems Final".to_string(),
            description: Some("Final exam for DB course".to_string()),
            total_marks: Decimal::from(100),
            duration: Duration::hours(3),
            start_date: at(2024, 6, 10, 9),
            end_date: at(2024, 6, 10, 12),
            course_id: CourseId::new(3),
            instructor_id: InstructorId::new(2),
            is_active: true,
        },
    ]
}

/// One question per variant.
pub fn questions() -> Vec<Question> {
    vec![
        Question {
            id: QuestionId::new(1),
            exam_id: ExamId::new(1),
            question_text: "What is a variable?".to_string(),
            marks: Decimal::from(5),
            created_date: day(2024, 3, 1),
            kind: QuestionKind::MultipleChoice(MultipleChoice {
                option_a: "A place to store data".to_string(),
                option_b: "A function".to_string(),
                option_c: "A class".to_string(),
                option_d: "An operator".to_string(),
                correct_option: OptionLetter::A,
            }),
        },
        Question {
            id: QuestionId::new(2),
            exam_id: ExamId::new(2),
            question_text: "SQL is used to manage relational databases.".to_string(),
            marks: Decimal::from(5),
            created_date: day(2024, 5, 25),
            kind: QuestionKind::TrueFalse(TrueFalse {
                correct_answer: true,
            }),
        },
        Question {
            id: QuestionId::new(3),
            exam_id: ExamId::new(2),
            question_text: "Explain normalization and its types.".to_string(),
            marks: Decimal::from(10),
            created_date: day(2024, 5, 25),
            kind: QuestionKind::Essay(Essay {
                max_word_count: Some(500),
                grading_criteria: Some("Clarity, completeness, examples".to_string()),
            }),
        },
    ]
}

pub fn student_courses() -> Vec<StudentCourse> {
    vec![
        StudentCourse::new(StudentId::new(1), CourseId::new(1), day(2023, 10, 1)),
        StudentCourse::new(StudentId::new(2), CourseId::new(1), day(2023, 1, 10)),
        StudentCourse::new(StudentId::new(3), CourseId::new(3), day(2023, 6, 1)),
    ]
}

pub fn instructor_courses() -> Vec<InstructorCourse> {
    vec![
        InstructorCourse::new(InstructorId::new(1), CourseId::new(1), day(2023, 9, 5)),
        InstructorCourse::new(InstructorId::new(2), CourseId::new(3), day(2023, 9, 5)),
    ]
}

pub fn dataset() -> SeedSet {
    let mut seed = SeedSet::new();
    seed.extend(&courses());
    seed.extend(&students());
    seed.extend(&instructors());
    seed.extend(&exams());
    seed.extend(&questions());
    seed.extend(&student_courses());
    seed.extend(&instructor_courses());
    seed
}

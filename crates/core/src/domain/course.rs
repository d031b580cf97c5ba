use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{CourseId, EntityRecord, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: Option<String>,
    pub max_degree: Decimal,
    pub created_date: NaiveDateTime,
    pub is_active: bool,
}

impl Course {
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        max_degree: Decimal,
        created_date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            max_degree,
            created_date,
            is_active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl EntityRecord for Course {
    const ENTITY: &'static str = "courses";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("title", self.title.as_str())
            .with("description", self.description.clone())
            .with("max_degree", self.max_degree)
            .with("created_date", self.created_date)
            .with("is_active", self.is_active)
    }
}

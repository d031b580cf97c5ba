use sea_orm::entity::prelude::*;

/// Single-table question family. `question_type` selects the variant; the
/// columns of the other variants are NULL.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub question_text: String,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub marks: Decimal,
    pub created_date: DateTime,
    pub exam_id: i32,
    pub question_type: i16,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_option: Option<String>,
    pub correct_answer: Option<bool>,
    pub max_word_count: Option<i32>,
    pub grading_criteria: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam::Entity",
        from = "Column::ExamId",
        to = "super::exam::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Exam,
    #[sea_orm(has_many = "super::student_answer::Entity")]
    StudentAnswer,
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::student_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentAnswer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

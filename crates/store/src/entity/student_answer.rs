use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "student_answers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub answer_text: String,
    pub selected_option: Option<String>,
    pub boolean_answer: Option<bool>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub marks_obtained: Option<Decimal>,
    pub submitted_at: DateTime,
    pub exam_attempt_id: i32,
    pub question_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exam_attempt::Entity",
        from = "Column::ExamAttemptId",
        to = "super::exam_attempt::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ExamAttempt,
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Question,
}

impl Related<super::exam_attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExamAttempt.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

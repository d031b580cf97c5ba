use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub start_time: DateTime,
    pub end_time: Option<DateTime>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
    pub total_score: Option<Decimal>,
    pub is_submitted: bool,
    pub is_graded: bool,
    pub student_id: i32,
    pub exam_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Student,
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

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
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

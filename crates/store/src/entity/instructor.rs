use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "instructors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub specialization: String,
    pub hire_date: DateTime,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam::Entity")]
    Exam,
    #[sea_orm(has_many = "super::instructor_course::Entity")]
    InstructorCourse,
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::instructor_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstructorCourse.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::instructor_course::Relation::Course.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::instructor_course::Relation::Instructor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

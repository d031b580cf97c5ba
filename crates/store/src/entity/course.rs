use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub max_degree: Decimal,
    pub created_date: DateTime,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::exam::Entity")]
    Exam,
    #[sea_orm(has_many = "super::student_course::Entity")]
    StudentCourse,
    #[sea_orm(has_many = "super::instructor_course::Entity")]
    InstructorCourse,
}

impl Related<super::exam::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::student_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCourse.def()
    }
}

impl Related<super::instructor_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstructorCourse.def()
    }
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_course::Relation::Student.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::student_course::Relation::Course.def().rev())
    }
}

impl Related<super::instructor::Entity> for Entity {
    fn to() -> RelationDef {
        super::instructor_course::Relation::Instructor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::instructor_course::Relation::Course.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

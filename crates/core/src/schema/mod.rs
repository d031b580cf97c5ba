mod builder;
mod catalog;
mod contract;

pub use builder::SchemaBuilder;
pub use catalog::{
    ANSWER_MATCHES_QUESTION_CHECK, ANSWER_SELECTED_OPTION_CHECK, ATTEMPT_END_AFTER_START_CHECK,
    COURSE_MAX_DEGREE_CHECK, EXAM_DURATION_WHOLE_SECONDS_CHECK, EXAM_END_AFTER_START_CHECK,
    QUESTION_MARKS_CHECK, examination_schema,
};
pub use contract::{
    CheckConstraint, CrossCheck, DeletePolicy, Discriminator, EntityDef, FieldDef, Predicate,
    PrimaryKey, Relationship, Schema, UniqueConstraint,
};

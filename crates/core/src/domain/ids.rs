use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use super::Value;

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            pub fn value(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.value()
            }
        }

        impl From<$name> for Value {
            fn from(value: $name) -> Self {
                Value::Int(i64::from(value.0))
            }
        }
    };
}

define_id_type!(CourseId);
define_id_type!(StudentId);
define_id_type!(InstructorId);
define_id_type!(ExamId);
define_id_type!(QuestionId);
define_id_type!(ExamAttemptId);
define_id_type!(StudentAnswerId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_id_can_roundtrip_from_string() {
        let id = CourseId::new(42);
        let parsed: CourseId = id
            .to_string()
            .parse()
            .expect("formatted course id should parse");

        assert_eq!(id, parsed);
    }

    #[test]
    fn id_converts_to_int_value() {
        assert_eq!(Value::from(ExamId::new(7)), Value::Int(7));
    }
}

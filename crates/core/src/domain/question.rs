use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{EntityRecord, ExamId, FieldType, QuestionId, Record, Rule, SchemaError, Value};

/// Discriminator of the question family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Essay,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [Self::MultipleChoice, Self::TrueFalse, Self::Essay];

    pub fn tag(self) -> &'static str {
        match self {
            Self::MultipleChoice => "MultipleChoice",
            Self::TrueFalse => "TrueFalse",
            Self::Essay => "Essay",
        }
    }

    /// Compact code used by the relational `question_type` column.
    pub fn code(self) -> i16 {
        match self {
            Self::MultipleChoice => 0,
            Self::TrueFalse => 1,
            Self::Essay => 2,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, SchemaError> {
        match code {
            0 => Ok(Self::MultipleChoice),
            1 => Ok(Self::TrueFalse),
            2 => Ok(Self::Essay),
            _ => Err(SchemaError::UnknownVariant(code.to_string())),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for QuestionType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.tag() == s)
            .ok_or_else(|| SchemaError::UnknownVariant(s.to_string()))
    }
}

impl From<QuestionType> for Value {
    fn from(value: QuestionType) -> Self {
        Value::Text(value.tag().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl TryFrom<char> for OptionLetter {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'A' => Ok(Self::A),
            'B' => Ok(Self::B),
            'C' => Ok(Self::C),
            'D' => Ok(Self::D),
            other => Err(other),
        }
    }
}

impl From<OptionLetter> for Value {
    fn from(value: OptionLetter) -> Self {
        Value::Char(value.as_char())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleChoice {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: OptionLetter,
}

impl MultipleChoice {
    pub fn option(&self, letter: OptionLetter) -> &str {
        match letter {
            OptionLetter::A => &self.option_a,
            OptionLetter::B => &self.option_b,
            OptionLetter::C => &self.option_c,
            OptionLetter::D => &self.option_d,
        }
    }

    pub fn correct_text(&self) -> &str {
        self.option(self.correct_option)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrueFalse {
    pub correct_answer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Essay {
    pub max_word_count: Option<i32>,
    pub grading_criteria: Option<String>,
}

/// Variant payload; the tag is derived from it and never stored separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice(MultipleChoice),
    TrueFalse(TrueFalse),
    Essay(Essay),
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Self::MultipleChoice(_) => QuestionType::MultipleChoice,
            Self::TrueFalse(_) => QuestionType::TrueFalse,
            Self::Essay(_) => QuestionType::Essay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub exam_id: ExamId,
    pub question_text: String,
    pub marks: Decimal,
    pub created_date: NaiveDateTime,
    pub kind: QuestionKind,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Resolves a field bag into the variant selected by `tag`.
    ///
    /// Only the selected variant's fields are read; fields belonging to the
    /// other variants are ignored.
    pub fn resolve(tag: &str, record: &Record) -> Result<Self, SchemaError> {
        let question_type: QuestionType = tag.parse()?;
        let fields = Fields(record);

        let kind = match question_type {
            QuestionType::MultipleChoice => {
                let letter = fields.required("correct_option", FieldType::Char, Value::as_char)?;
                let correct_option = OptionLetter::try_from(letter).map_err(|c| {
                    SchemaError::violation(
                        Self::ENTITY,
                        "correct_option",
                        Rule::Check(CORRECT_OPTION_CHECK),
                        Value::Char(c),
                    )
                })?;

                QuestionKind::MultipleChoice(MultipleChoice {
                    option_a: fields.required_text("option_a")?,
                    option_b: fields.required_text("option_b")?,
                    option_c: fields.required_text("option_c")?,
                    option_d: fields.required_text("option_d")?,
                    correct_option,
                })
            }
            QuestionType::TrueFalse => QuestionKind::TrueFalse(TrueFalse {
                correct_answer: fields.required("correct_answer", FieldType::Bool, Value::as_bool)?,
            }),
            QuestionType::Essay => QuestionKind::Essay(Essay {
                max_word_count: fields.optional_int("max_word_count")?,
                grading_criteria: fields.optional("grading_criteria", FieldType::Text, |v| {
                    v.as_text().map(str::to_string)
                })?,
            }),
        };

        Ok(Self {
            id: QuestionId::new(fields.required_id("id")?),
            exam_id: ExamId::new(fields.required_id("exam_id")?),
            question_text: fields.required_text("question_text")?,
            marks: fields.required("marks", FieldType::Decimal, Value::as_decimal)?,
            created_date: fields.required("created_date", FieldType::DateTime, Value::as_datetime)?,
            kind,
        })
    }

    /// Resolves using the record's own `question_type` tag.
    pub fn from_record(record: &Record) -> Result<Self, SchemaError> {
        let tag = record.get("question_type").as_text().ok_or_else(|| {
            SchemaError::violation(
                Self::ENTITY,
                "question_type",
                Rule::Required,
                record.get("question_type").clone(),
            )
        })?;
        Self::resolve(tag, record)
    }
}

pub const CORRECT_OPTION_CHECK: &str = "CK_Question_CorrectOption_Valid";

impl EntityRecord for Question {
    const ENTITY: &'static str = "questions";

    fn to_record(&self) -> Record {
        let record = Record::new()
            .with("id", self.id)
            .with("exam_id", self.exam_id)
            .with("question_text", self.question_text.as_str())
            .with("marks", self.marks)
            .with("created_date", self.created_date)
            .with("question_type", self.question_type());

        match &self.kind {
            QuestionKind::MultipleChoice(mc) => record
                .with("option_a", mc.option_a.as_str())
                .with("option_b", mc.option_b.as_str())
                .with("option_c", mc.option_c.as_str())
                .with("option_d", mc.option_d.as_str())
                .with("correct_option", mc.correct_option),
            QuestionKind::TrueFalse(tf) => record.with("correct_answer", tf.correct_answer),
            QuestionKind::Essay(essay) => record
                .with("max_word_count", essay.max_word_count)
                .with("grading_criteria", essay.grading_criteria.clone()),
        }
    }
}

struct Fields<'a>(&'a Record);

impl Fields<'_> {
    fn optional<T>(
        &self,
        field: &str,
        expected: FieldType,
        read: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, SchemaError> {
        let value = self.0.get(field);
        if value.is_null() {
            return Ok(None);
        }
        read(value).map(Some).ok_or_else(|| {
            SchemaError::violation(
                Question::ENTITY,
                field,
                Rule::TypeMismatch(expected),
                value.clone(),
            )
        })
    }

    fn required<T>(
        &self,
        field: &str,
        expected: FieldType,
        read: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, SchemaError> {
        self.optional(field, expected, read)?.ok_or_else(|| {
            SchemaError::violation(Question::ENTITY, field, Rule::Required, Value::Null)
        })
    }

    fn required_text(&self, field: &str) -> Result<String, SchemaError> {
        self.required(field, FieldType::Text, |v| v.as_text().map(str::to_string))
    }

    fn optional_int(&self, field: &str) -> Result<Option<i32>, SchemaError> {
        self.optional(field, FieldType::Int, Value::as_int)?
            .map(|raw| {
                i32::try_from(raw).map_err(|_| {
                    SchemaError::violation(
                        Question::ENTITY,
                        field,
                        Rule::TypeMismatch(FieldType::Int),
                        Value::Int(raw),
                    )
                })
            })
            .transpose()
    }

    fn required_id(&self, field: &str) -> Result<i32, SchemaError> {
        self.optional_int(field)?.ok_or_else(|| {
            SchemaError::violation(Question::ENTITY, field, Rule::Required, Value::Null)
        })
    }
}

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::{
    EntityRecord, ExamAttemptId, ExamId, OptionLetter, QuestionId, QuestionType, Record,
    StudentAnswerId, StudentId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamAttempt {
    pub id: ExamAttemptId,
    pub student_id: StudentId,
    pub exam_id: ExamId,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub total_score: Option<Decimal>,
    pub is_submitted: bool,
    pub is_graded: bool,
}

impl ExamAttempt {
    pub fn start(
        id: ExamAttemptId,
        student_id: StudentId,
        exam_id: ExamId,
        start_time: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            student_id,
            exam_id,
            start_time,
            end_time: None,
            total_score: None,
            is_submitted: false,
            is_graded: false,
        }
    }
}

impl EntityRecord for ExamAttempt {
    const ENTITY: &'static str = "exam_attempts";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("student_id", self.student_id)
            .with("exam_id", self.exam_id)
            .with("start_time", self.start_time)
            .with("end_time", self.end_time)
            .with("total_score", self.total_score)
            .with("is_submitted", self.is_submitted)
            .with("is_graded", self.is_graded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentAnswer {
    pub id: StudentAnswerId,
    pub exam_attempt_id: ExamAttemptId,
    pub question_id: QuestionId,
    pub answer_text: String,
    pub selected_option: Option<OptionLetter>,
    pub boolean_answer: Option<bool>,
    pub marks_obtained: Option<Decimal>,
    pub submitted_at: NaiveDateTime,
}

impl StudentAnswer {
    /// Whether the populated answer field matches the answered question's variant.
    pub fn matches(&self, question_type: QuestionType) -> bool {
        answer_shape_matches(
            question_type,
            self.selected_option.is_some(),
            self.boolean_answer.is_some(),
        )
    }
}

/// Multiple choice answers carry only `selected_option`, true/false answers
/// only `boolean_answer`, essays neither.
pub fn answer_shape_matches(
    question_type: QuestionType,
    has_selected_option: bool,
    has_boolean_answer: bool,
) -> bool {
    match question_type {
        QuestionType::MultipleChoice => has_selected_option && !has_boolean_answer,
        QuestionType::TrueFalse => has_boolean_answer && !has_selected_option,
        QuestionType::Essay => !has_selected_option && !has_boolean_answer,
    }
}

impl EntityRecord for StudentAnswer {
    const ENTITY: &'static str = "student_answers";

    fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("exam_attempt_id", self.exam_attempt_id)
            .with("question_id", self.question_id)
            .with("answer_text", self.answer_text.as_str())
            .with("selected_option", self.selected_option)
            .with("boolean_answer", self.boolean_answer)
            .with("marks_obtained", self.marks_obtained)
            .with("submitted_at", self.submitted_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_shape_follows_question_variant() {
        assert!(answer_shape_matches(QuestionType::MultipleChoice, true, false));
        assert!(!answer_shape_matches(QuestionType::MultipleChoice, false, true));
        assert!(answer_shape_matches(QuestionType::TrueFalse, false, true));
        assert!(!answer_shape_matches(QuestionType::TrueFalse, true, true));
        assert!(answer_shape_matches(QuestionType::Essay, false, false));
        assert!(!answer_shape_matches(QuestionType::Essay, true, false));
    }
}

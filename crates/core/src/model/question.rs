use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {question} lists option {option} more than once")]
    DuplicateOption {
        question: QuestionId,
        option: OptionId,
    },

    #[error("question {question} marks unknown option {option} as correct")]
    UnknownCorrectOption {
        question: QuestionId,
        option: OptionId,
    },
}

//
// ─── OPTION ────────────────────────────────────────────────────────────────────
//

/// One selectable answer of a question, e.g. label "A".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    id: OptionId,
    label: String,
    text: String,
    display_order: u32,
}

impl AnswerOption {
    #[must_use]
    pub fn new(
        id: OptionId,
        label: impl Into<String>,
        text: impl Into<String>,
        display_order: u32,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            text: text.into(),
            display_order,
        }
    }

    #[must_use]
    pub fn id(&self) -> &OptionId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn display_order(&self) -> u32 {
        self.display_order
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<AnswerOption>,
    pub correct_option: Option<OptionId>,
    pub points_correct: i32,
    pub points_wrong: i32,
    pub display_order: u32,
}

impl QuestionDraft {
    /// Validate the draft and sort its options by display order.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, there are no options,
    /// an option id repeats, or the correct option is not among the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let text = self.text.trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.is_empty() {
            return Err(QuestionError::NoOptions(self.id));
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            if !seen.insert(option.id()) {
                return Err(QuestionError::DuplicateOption {
                    question: self.id.clone(),
                    option: option.id().clone(),
                });
            }
        }

        if let Some(correct) = &self.correct_option {
            if !seen.contains(correct) {
                return Err(QuestionError::UnknownCorrectOption {
                    question: self.id.clone(),
                    option: correct.clone(),
                });
            }
        }

        let mut options = self.options;
        options.sort_by_key(|o| o.display_order());

        Ok(Question {
            id: self.id,
            text,
            options,
            correct_option: self.correct_option,
            points_correct: self.points_correct,
            points_wrong: self.points_wrong,
            display_order: self.display_order,
        })
    }
}

/// A validated, immutable quiz question.
///
/// `correct_option` is only present when the backend discloses it; local
/// result previews depend on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<AnswerOption>,
    correct_option: Option<OptionId>,
    points_correct: i32,
    points_wrong: i32,
    display_order: u32,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[AnswerOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&OptionId> {
        self.correct_option.as_ref()
    }

    #[must_use]
    pub fn points_correct(&self) -> i32 {
        self.points_correct
    }

    #[must_use]
    pub fn points_wrong(&self) -> i32 {
        self.points_wrong
    }

    #[must_use]
    pub fn display_order(&self) -> u32 {
        self.display_order
    }

    #[must_use]
    pub fn has_option(&self, option_id: &OptionId) -> bool {
        self.options.iter().any(|o| o.id() == option_id)
    }

    #[must_use]
    pub fn option(&self, option_id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id() == option_id)
    }

    /// Returns `Some(true)` for the correct option, `Some(false)` otherwise,
    /// and `None` when the correct option is not known.
    #[must_use]
    pub fn is_correct(&self, option_id: &OptionId) -> Option<bool> {
        self.correct_option.as_ref().map(|c| c == option_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, order: u32) -> AnswerOption {
        AnswerOption::new(OptionId::new(id), id.to_uppercase(), format!("text {id}"), order)
    }

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new("q1"),
            text: "Which temple is oldest?".into(),
            options: vec![option("b", 2), option("a", 1)],
            correct_option: Some(OptionId::new("a")),
            points_correct: 10,
            points_wrong: -2,
            display_order: 1,
        }
    }

    #[test]
    fn validate_sorts_options_by_display_order() {
        let q = draft().validate().unwrap();
        let ids: Vec<_> = q.options().iter().map(|o| o.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut d = draft();
        d.text = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptyText);
    }

    #[test]
    fn question_without_options_is_rejected() {
        let mut d = draft();
        d.options.clear();
        assert!(matches!(d.validate(), Err(QuestionError::NoOptions(_))));
    }

    #[test]
    fn duplicate_option_ids_are_rejected() {
        let mut d = draft();
        d.options.push(option("a", 3));
        assert!(matches!(
            d.validate(),
            Err(QuestionError::DuplicateOption { .. })
        ));
    }

    #[test]
    fn correct_option_must_be_listed() {
        let mut d = draft();
        d.correct_option = Some(OptionId::new("z"));
        assert!(matches!(
            d.validate(),
            Err(QuestionError::UnknownCorrectOption { .. })
        ));
    }

    #[test]
    fn correctness_is_unknown_without_correct_option() {
        let mut d = draft();
        d.correct_option = None;
        let q = d.validate().unwrap();
        assert_eq!(q.is_correct(&OptionId::new("a")), None);
        assert!(q.has_option(&OptionId::new("b")));
    }
}

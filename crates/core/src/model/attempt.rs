use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{AttemptId, QuestionId};
use crate::model::level::Level;
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt has no questions")]
    NoQuestions,

    #[error("attempt duration must be > 0 seconds")]
    ZeroDuration,

    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// One user's run through a quiz level, as created by the backend.
///
/// Immutable once built. Questions are kept in display order and indexed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    id: AttemptId,
    level: Level,
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
    duration_seconds: u32,
    started_at: DateTime<Utc>,
}

impl Attempt {
    /// Build an attempt from backend-provided question drafts.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if there are no questions, the duration is zero,
    /// a question id repeats, or a question fails validation.
    pub fn new(
        id: AttemptId,
        level: Level,
        questions: Vec<QuestionDraft>,
        duration_seconds: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if questions.is_empty() {
            return Err(AttemptError::NoQuestions);
        }
        if duration_seconds == 0 {
            return Err(AttemptError::ZeroDuration);
        }

        let mut questions = questions
            .into_iter()
            .map(QuestionDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;
        // Stable sort keeps backend order for equal display orders.
        questions.sort_by_key(Question::display_order);

        let mut index = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            if index.insert(q.id().clone(), i).is_some() {
                return Err(AttemptError::DuplicateQuestion(q.id().clone()));
            }
        }

        Ok(Self {
            id,
            level,
            questions,
            index,
            duration_seconds,
            started_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &AttemptId {
        &self.id
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Position of a question in display order.
    #[must_use]
    pub fn position_of(&self, id: &QuestionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

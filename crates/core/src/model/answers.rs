use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::attempt::Attempt;
use crate::model::ids::{OptionId, QuestionId};

/// Chosen option per question. Absence means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    choices: HashMap<QuestionId, OptionId>,
}

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the answer for a question, returning the option it replaced.
    pub fn select(&mut self, question: QuestionId, option: OptionId) -> Option<OptionId> {
        self.choices.insert(question, option)
    }

    /// Remove the answer for a question, returning it if there was one.
    pub fn clear(&mut self, question: &QuestionId) -> Option<OptionId> {
        self.choices.remove(question)
    }

    #[must_use]
    pub fn get(&self, question: &QuestionId) -> Option<&OptionId> {
        self.choices.get(question)
    }

    #[must_use]
    pub fn is_answered(&self, question: &QuestionId) -> bool {
        self.choices.contains_key(question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &OptionId)> {
        self.choices.iter()
    }

    /// One entry per attempt question, in display order; unanswered questions
    /// carry `None`.
    #[must_use]
    pub fn to_entries(&self, attempt: &Attempt) -> Vec<AnswerEntry> {
        attempt
            .questions()
            .iter()
            .map(|q| AnswerEntry {
                question_id: q.id().clone(),
                option_id: self.choices.get(q.id()).cloned(),
            })
            .collect()
    }
}

/// Wire shape of a single submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub option_id: Option<OptionId>,
}

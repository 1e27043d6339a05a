use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LevelId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("pass percentage must be within 0..=100, got {0}")]
    InvalidPercentage(f64),
}

//
// ─── PASS CONDITION ────────────────────────────────────────────────────────────
//

/// Rule deciding whether a finished attempt counts as passed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "threshold", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassCondition {
    /// Passed when `percent_correct >= threshold`.
    Percentage(f64),
    /// Passed when at least this many questions were answered correctly.
    MinCorrect(u32),
    /// Passed when the score reaches this many points.
    MinScore(i32),
}

impl PassCondition {
    /// Builds a percentage condition.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::InvalidPercentage` when the threshold is outside `0..=100`.
    pub fn percentage(threshold: f64) -> Result<Self, LevelError> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(LevelError::InvalidPercentage(threshold));
        }
        Ok(Self::Percentage(threshold))
    }

    #[must_use]
    pub fn is_met(&self, score_points: i32, correct_count: u32, percent_correct: f64) -> bool {
        match *self {
            PassCondition::Percentage(threshold) => percent_correct >= threshold,
            PassCondition::MinCorrect(n) => correct_count >= n,
            PassCondition::MinScore(points) => score_points >= points,
        }
    }
}

impl Default for PassCondition {
    fn default() -> Self {
        PassCondition::Percentage(60.0)
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// The quiz level an attempt belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    name: String,
    pass_condition: PassCondition,
}

impl Level {
    #[must_use]
    pub fn new(id: LevelId, name: impl Into<String>, pass_condition: PassCondition) -> Self {
        Self {
            id,
            name: name.into(),
            pass_condition,
        }
    }

    #[must_use]
    pub fn id(&self) -> &LevelId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn pass_condition(&self) -> PassCondition {
        self.pass_condition
    }
}

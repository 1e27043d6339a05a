use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quiz_core::model::{
    AnswerEntry, AnswerOption, Attempt, AttemptId, Badge, Level, LevelId, OptionId,
    PassCondition, QuestionDraft, QuestionId, QuizResult, ResultSource,
};

use crate::error::ApiError;

/// Envelope every backend response is wrapped in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when `success` is false, and
    /// `ApiError::Decode` when a successful envelope has no data.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_owned()),
            ));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("successful response without data".to_owned()))
    }
}

//
// ─── START ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDto {
    pub id: LevelId,
    pub name: String,
    #[serde(default)]
    pub pass_condition_type: Option<String>,
    #[serde(default)]
    pub pass_threshold: Option<f64>,
}

impl LevelDto {
    /// Map the wire level into the domain `Level`.
    ///
    /// A missing condition falls back to `PassCondition::default()`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` for an unknown condition type or a threshold
    /// that does not fit it.
    pub fn into_level(self) -> Result<Level, ApiError> {
        let condition = match (self.pass_condition_type.as_deref(), self.pass_threshold) {
            (None, _) => PassCondition::default(),
            (Some(_), None) => {
                return Err(ApiError::Decode(format!(
                    "level {} has a pass condition without threshold",
                    self.id
                )));
            }
            (Some(kind), Some(threshold)) => pass_condition(kind, threshold)?,
        };
        Ok(Level::new(self.id, self.name, condition))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pass_condition(kind: &str, threshold: f64) -> Result<PassCondition, ApiError> {
    match kind.to_ascii_uppercase().as_str() {
        "PERCENTAGE" => {
            PassCondition::percentage(threshold).map_err(|e| ApiError::Decode(e.to_string()))
        }
        "MIN_CORRECT" if threshold >= 0.0 => Ok(PassCondition::MinCorrect(threshold.ceil() as u32)),
        "MIN_SCORE" => Ok(PassCondition::MinScore(threshold.ceil() as i32)),
        other => Err(ApiError::Decode(format!(
            "unsupported pass condition {other} with threshold {threshold}"
        ))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDto {
    pub id: OptionId,
    pub label: String,
    pub text: String,
    #[serde(default)]
    pub display_order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionDto>,
    pub points_correct: i32,
    #[serde(default)]
    pub points_wrong: i32,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub correct_option_id: Option<OptionId>,
}

impl QuestionDto {
    #[must_use]
    pub fn into_draft(self) -> QuestionDraft {
        QuestionDraft {
            id: self.id,
            text: self.text,
            options: self
                .options
                .into_iter()
                .map(|o| AnswerOption::new(o.id, o.label, o.text, o.display_order))
                .collect(),
            correct_option: self.correct_option_id,
            points_correct: self.points_correct,
            points_wrong: self.points_wrong,
            display_order: self.display_order,
        }
    }
}

/// Payload of `startQuiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizResponse {
    pub attempt_id: AttemptId,
    pub level: LevelDto,
    pub questions: Vec<QuestionDto>,
    pub duration_seconds: u32,
    pub started_at: DateTime<Utc>,
}

impl StartQuizResponse {
    /// Convert the response into a validated `Attempt`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` for a bad level and `ApiError::InvalidAttempt`
    /// when the attempt fails validation.
    pub fn into_attempt(self) -> Result<Attempt, ApiError> {
        let level = self.level.into_level()?;
        let questions = self
            .questions
            .into_iter()
            .map(QuestionDto::into_draft)
            .collect();
        Ok(Attempt::new(
            self.attempt_id,
            level,
            questions,
            self.duration_seconds,
            self.started_at,
        )?)
    }
}

//
// ─── SUBMIT ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest<'a> {
    pub answers: &'a [AnswerEntry],
}

/// Payload of `submitQuiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub score_points: i32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub unanswered_count: u32,
    pub percent_correct: f64,
    #[serde(default)]
    pub xp_earned: u32,
    #[serde(default)]
    pub points_earned: u32,
    pub is_passed: bool,
    #[serde(default)]
    pub new_total_xp: Option<u32>,
    #[serde(default)]
    pub badges_earned: Vec<Badge>,
}

impl SubmitQuizResponse {
    #[must_use]
    pub fn into_result(self) -> QuizResult {
        QuizResult {
            score_points: self.score_points,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            unanswered_count: self.unanswered_count,
            percent_correct: self.percent_correct,
            xp_earned: self.xp_earned,
            points_earned: self.points_earned,
            is_passed: self.is_passed,
            new_total_xp: self.new_total_xp,
            badges_earned: self.badges_earned,
            source: ResultSource::Server,
        }
    }
}

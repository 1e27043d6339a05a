//! Boundary contract with the quiz backend.

mod dto;
mod http;
mod in_memory;

use async_trait::async_trait;

use quiz_core::model::{AnswerEntry, Attempt, AttemptId, LevelId, QuizResult};

use crate::error::ApiError;

pub use dto::{
    ApiEnvelope, LevelDto, OptionDto, QuestionDto, StartQuizResponse, SubmitQuizRequest,
    SubmitQuizResponse,
};
pub use http::HttpQuizApi;
pub use in_memory::{InMemoryQuizApi, QuizFixture, RecordedSubmission};

/// Networking collaborator consumed by the session engine.
///
/// Implementations are stateless from the engine's point of view: they are
/// called and awaited, never shared as mutable session state.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Create a new attempt for the level.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network/server failure or a malformed attempt.
    async fn start_quiz(&self, level_id: &LevelId) -> Result<Attempt, ApiError>;

    /// Submit the answers of an attempt and return the authoritative result.
    ///
    /// `answers` holds one entry per question; unanswered ones carry `None`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network/server failure.
    async fn submit_quiz(
        &self,
        attempt_id: &AttemptId,
        answers: &[AnswerEntry],
    ) -> Result<QuizResult, ApiError>;
}

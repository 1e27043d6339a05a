use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use quiz_core::model::{AnswerEntry, Attempt, AttemptId, LevelId, QuizResult};

use super::QuizApi;
use super::dto::{ApiEnvelope, StartQuizResponse, SubmitQuizRequest, SubmitQuizResponse};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// `QuizApi` over the backend's JSON HTTP interface.
#[derive(Clone)]
pub struct HttpQuizApi {
    client: Client,
    config: ApiConfig,
}

impl HttpQuizApi {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.auth_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.bytes().await?;
        decode_envelope(status, &body)
    }
}

/// Map a status and raw body onto the payload or an `ApiError`.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    // Error statuses may still carry an envelope with a useful message.
    match serde_json::from_slice::<ApiEnvelope<T>>(body) {
        Ok(envelope) if status.is_success() => envelope.into_data(),
        Ok(envelope) => Err(envelope
            .message
            .map_or(ApiError::HttpStatus(status), ApiError::Rejected)),
        Err(_) if !status.is_success() => Err(ApiError::HttpStatus(status)),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn start_quiz(&self, level_id: &LevelId) -> Result<Attempt, ApiError> {
        let url = self
            .config
            .endpoint(&["quiz", "levels", level_id.as_str(), "start"]);
        tracing::debug!(%url, "starting quiz attempt");

        let response = self.authorized(self.client.post(url)).send().await?;
        let body: StartQuizResponse = Self::read_envelope(response).await?;
        body.into_attempt()
    }

    async fn submit_quiz(
        &self,
        attempt_id: &AttemptId,
        answers: &[AnswerEntry],
    ) -> Result<QuizResult, ApiError> {
        let url = self
            .config
            .endpoint(&["quiz", "attempts", attempt_id.as_str(), "submit"]);
        tracing::debug!(%url, answers = answers.len(), "submitting quiz attempt");

        let response = self
            .authorized(self.client.post(url))
            .json(&SubmitQuizRequest { answers })
            .send()
            .await?;
        let body: SubmitQuizResponse = Self::read_envelope(response).await?;
        Ok(body.into_result())
    }
}

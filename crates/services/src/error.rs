//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use quiz_core::model::AttemptError;

/// Errors surfaced by a `QuizApi` implementation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("quiz API request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("quiz API rejected the request: {0}")]
    Rejected(String),
    #[error("quiz API response could not be decoded: {0}")]
    Decode(String),
    #[error("quiz API returned an invalid attempt: {0}")]
    InvalidAttempt(#[from] AttemptError),
    #[error("quiz API did not answer within {0:?}")]
    Timeout(Duration),
    #[error("quiz API unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the quiz session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("operation not allowed while the session is {phase}")]
    InvalidPhase { phase: &'static str },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("no attempt is loaded")]
    NoAttempt,
    #[error("completion belongs to a discarded attempt")]
    Superseded,
    #[error("failed to start quiz: {0}")]
    Load(#[source] ApiError),
    #[error("failed to submit quiz: {0}")]
    Submit(#[source] ApiError),
    #[error("session has been closed")]
    Closed,
}

/// Errors emitted while building configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("QUIZ_API_BASE_URL is not set")]
    MissingBaseUrl,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("base URL must be http(s) and hierarchical: {0}")]
    UnsupportedBaseUrl(String),
    #[error("invalid request timeout: {0}")]
    InvalidTimeout(String),
}

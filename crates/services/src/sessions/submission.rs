use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use quiz_core::model::QuizResult;

use super::store::{SessionStore, SubmissionTicket};
use crate::api::QuizApi;
use crate::error::{ApiError, SessionError};

/// Runs the submit flow: snapshot, call the API, apply the outcome.
///
/// The network half (`execute`) holds no borrow of the store, so the actor
/// can keep ticking and taking commands while a submission is in flight.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    api: Arc<dyn QuizApi>,
    request_timeout: Duration,
}

impl SubmissionCoordinator {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, request_timeout: Duration) -> Self {
        Self {
            api,
            request_timeout,
        }
    }

    /// Send the ticket's answers. Exceeding the request timeout is a failure.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` from the backend, or `ApiError::Timeout`.
    pub async fn execute(&self, ticket: &SubmissionTicket) -> Result<QuizResult, ApiError> {
        debug!(
            attempt_id = %ticket.attempt_id(),
            answers = ticket.answers().len(),
            "sending quiz submission"
        );
        let call = self.api.submit_quiz(ticket.attempt_id(), ticket.answers());
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::Timeout(self.request_timeout)),
        }
    }

    /// Submit the store's current attempt and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the phase does not allow submitting, or
    /// `SessionError::Submit` after recording `SubmitFailed` in the store.
    pub async fn submit<'s>(
        &self,
        store: &'s mut SessionStore,
    ) -> Result<&'s QuizResult, SessionError> {
        let ticket = store.begin_submission()?;
        let outcome = self.execute(&ticket).await;
        store.finish_submission(ticket, outcome)
    }
}

impl std::fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

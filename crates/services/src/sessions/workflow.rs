use std::sync::Arc;

use tracing::debug;

use quiz_core::model::{Attempt, LevelId, QuizResult};

use super::store::{LoadTicket, SessionStore, TickOutcome};
use super::submission::SubmissionCoordinator;
use crate::Clock;
use crate::api::QuizApi;
use crate::config::EngineConfig;
use crate::error::{ApiError, SessionError};

/// Orchestrates the async steps of a quiz session over a borrowed store.
///
/// Each method takes `&mut SessionStore`, so one operation finishes before
/// the next can begin. Failures are returned *and* recorded in the phase.
#[derive(Clone)]
pub struct QuizSessionService {
    clock: Clock,
    api: Arc<dyn QuizApi>,
    config: EngineConfig,
    submissions: SubmissionCoordinator,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, config: EngineConfig) -> Self {
        let submissions = SubmissionCoordinator::new(Arc::clone(&api), config.request_timeout);
        Self {
            clock: Clock::default(),
            api,
            config,
            submissions,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn submissions(&self) -> &SubmissionCoordinator {
        &self.submissions
    }

    /// Fresh `Idle` store stamped with this service's clock.
    #[must_use]
    pub fn new_store(&self) -> SessionStore {
        SessionStore::new(self.clock)
    }

    /// Start an attempt for `level_id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` if a session is in progress, or
    /// `SessionError::Load` when the API fails (phase becomes `LoadFailed`).
    pub async fn start<'s>(
        &self,
        store: &'s mut SessionStore,
        level_id: LevelId,
    ) -> Result<&'s Attempt, SessionError> {
        let ticket = store.begin_loading(level_id, false)?;
        let outcome = self.load(&ticket).await;
        store.finish_loading(ticket, outcome)
    }

    /// Like `start`, but discards whatever the session was doing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` when the API fails.
    pub async fn start_forced<'s>(
        &self,
        store: &'s mut SessionStore,
        level_id: LevelId,
    ) -> Result<&'s Attempt, SessionError> {
        let ticket = store.begin_loading(level_id, true)?;
        let outcome = self.load(&ticket).await;
        store.finish_loading(ticket, outcome)
    }

    /// Submit the current answers and return the authoritative result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if submitting is not allowed now, or
    /// `SessionError::Submit` when the API fails (phase becomes `SubmitFailed`).
    pub async fn submit(&self, store: &mut SessionStore) -> Result<QuizResult, SessionError> {
        self.submissions.submit(store).await.cloned()
    }

    /// Advance the timer by one tick. Reaching zero submits immediately.
    ///
    /// A failed forced submission only shows up as `SubmitFailed` in the
    /// store; the outcome returned is still `TimeUp`.
    pub async fn tick(&self, store: &mut SessionStore) -> TickOutcome {
        let outcome = store.tick();
        if outcome == TickOutcome::TimeUp {
            if let Err(err) = self.submissions.submit(store).await {
                debug!(error = %err, "forced submission did not complete");
            }
        }
        outcome
    }

    /// Fetch an attempt for a load ticket, bounded by the request timeout.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` from the backend, or `ApiError::Timeout`.
    pub async fn load(&self, ticket: &LoadTicket) -> Result<Attempt, ApiError> {
        debug!(level_id = %ticket.level_id(), "requesting quiz attempt");
        let call = self.api.start_quiz(ticket.level_id());
        match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::Timeout(self.config.request_timeout)),
        }
    }
}

impl std::fmt::Debug for QuizSessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSessionService")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use quiz_core::Clock;
use quiz_core::model::{
    AnswerEntry, AnswerMap, Attempt, AttemptId, Badge, Level, LevelId, QuestionDraft, QuizResult,
    ResultSource,
};
use quiz_core::scoring::score_locally;

use super::QuizApi;
use crate::error::ApiError;

/// Quiz served by `InMemoryQuizApi` for one level.
#[derive(Debug, Clone)]
pub struct QuizFixture {
    pub level: Level,
    pub questions: Vec<QuestionDraft>,
    pub duration_seconds: u32,
    pub xp_per_correct: u32,
    pub points_per_correct: u32,
    pub badge_on_pass: Option<Badge>,
}

/// A submission the in-memory backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub attempt_id: AttemptId,
    pub answers: Vec<AnswerEntry>,
    pub accepted: bool,
}

#[derive(Default)]
struct Backend {
    quizzes: HashMap<LevelId, QuizFixture>,
    attempts: HashMap<AttemptId, (Attempt, QuizFixture)>,
    completed: HashMap<AttemptId, QuizResult>,
    submissions: Vec<RecordedSubmission>,
    start_failures: Vec<String>,
    submit_failures: Vec<String>,
    total_xp: u32,
}

/// In-process stand-in for the quiz backend.
///
/// Scores with the same rules as local previews, then adds rewards from the
/// fixture. Failures can be queued to exercise retry paths.
#[derive(Clone, Default)]
pub struct InMemoryQuizApi {
    clock: Clock,
    backend: Arc<Mutex<Backend>>,
}

impl InMemoryQuizApi {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            backend: Arc::new(Mutex::new(Backend::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Backend>, ApiError> {
        self.backend
            .lock()
            .map_err(|e| ApiError::Unavailable(e.to_string()))
    }

    /// Register (or replace) the quiz served for a level.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the backend lock is poisoned.
    pub fn insert_quiz(&self, fixture: QuizFixture) -> Result<(), ApiError> {
        let mut backend = self.lock()?;
        backend.quizzes.insert(fixture.level.id().clone(), fixture);
        Ok(())
    }

    /// The next `start_quiz` call fails with `message`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the backend lock is poisoned.
    pub fn fail_next_start(&self, message: impl Into<String>) -> Result<(), ApiError> {
        self.lock()?.start_failures.push(message.into());
        Ok(())
    }

    /// The next `submit_quiz` call fails with `message`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the backend lock is poisoned.
    pub fn fail_next_submit(&self, message: impl Into<String>) -> Result<(), ApiError> {
        self.lock()?.submit_failures.push(message.into());
        Ok(())
    }

    /// Every submission received so far, including failed ones.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the backend lock is poisoned.
    pub fn submissions(&self) -> Result<Vec<RecordedSubmission>, ApiError> {
        Ok(self.lock()?.submissions.clone())
    }

    /// Total XP accumulated by the (single) user of this backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unavailable` if the backend lock is poisoned.
    pub fn total_xp(&self) -> Result<u32, ApiError> {
        Ok(self.lock()?.total_xp)
    }
}

#[async_trait]
impl QuizApi for InMemoryQuizApi {
    async fn start_quiz(&self, level_id: &LevelId) -> Result<Attempt, ApiError> {
        let mut backend = self.lock()?;
        if !backend.start_failures.is_empty() {
            return Err(ApiError::Unavailable(backend.start_failures.remove(0)));
        }

        let fixture = backend
            .quizzes
            .get(level_id)
            .cloned()
            .ok_or_else(|| ApiError::Rejected(format!("unknown level {level_id}")))?;

        let attempt = Attempt::new(
            AttemptId::new(Uuid::new_v4().to_string()),
            fixture.level.clone(),
            fixture.questions.clone(),
            fixture.duration_seconds,
            self.clock.now(),
        )?;
        backend
            .attempts
            .insert(attempt.id().clone(), (attempt.clone(), fixture));
        Ok(attempt)
    }

    async fn submit_quiz(
        &self,
        attempt_id: &AttemptId,
        answers: &[AnswerEntry],
    ) -> Result<QuizResult, ApiError> {
        let mut backend = self.lock()?;
        let mut record = RecordedSubmission {
            attempt_id: attempt_id.clone(),
            answers: answers.to_vec(),
            accepted: false,
        };

        if !backend.submit_failures.is_empty() {
            let message = backend.submit_failures.remove(0);
            backend.submissions.push(record);
            return Err(ApiError::Unavailable(message));
        }
        if backend.completed.contains_key(attempt_id) {
            backend.submissions.push(record);
            return Err(ApiError::Rejected(format!(
                "attempt {attempt_id} was already submitted"
            )));
        }
        let Some((attempt, fixture)) = backend.attempts.get(attempt_id).cloned() else {
            backend.submissions.push(record);
            return Err(ApiError::Rejected(format!("unknown attempt {attempt_id}")));
        };

        let mut map = AnswerMap::new();
        for entry in answers {
            let Some(option) = &entry.option_id else {
                continue;
            };
            let valid = attempt
                .question(&entry.question_id)
                .is_some_and(|q| q.has_option(option));
            if valid {
                map.select(entry.question_id.clone(), option.clone());
            }
        }

        let mut result = score_locally(&attempt, &map);
        result.source = ResultSource::Server;
        result.xp_earned = result.correct_count.saturating_mul(fixture.xp_per_correct);
        result.points_earned = result.correct_count.saturating_mul(fixture.points_per_correct);
        if result.is_passed {
            result.badges_earned.extend(fixture.badge_on_pass);
        }
        backend.total_xp = backend.total_xp.saturating_add(result.xp_earned);
        result.new_total_xp = Some(backend.total_xp);

        record.accepted = true;
        backend.submissions.push(record);
        backend.completed.insert(attempt_id.clone(), result.clone());
        Ok(result)
    }
}

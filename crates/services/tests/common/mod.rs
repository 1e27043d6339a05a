#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use quiz_core::model::{
    AnswerEntry, AnswerOption, Attempt, AttemptId, Level, LevelId, OptionId, PassCondition,
    QuestionDraft, QuestionId, QuizResult,
};
use quiz_core::time::fixed_now;
use quiz_services::{ApiError, Clock, EngineConfig, InMemoryQuizApi, QuizApi, QuizFixture};

pub const LEVEL: &str = "level-1";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn level_id() -> LevelId {
    LevelId::new(LEVEL)
}

pub fn q(id: &str) -> QuestionId {
    QuestionId::new(id)
}

pub fn o(id: &str) -> OptionId {
    OptionId::new(id)
}

fn question(id: &str, order: u32, points_wrong: i32) -> QuestionDraft {
    QuestionDraft {
        id: q(id),
        text: format!("Question {id}"),
        options: vec![
            AnswerOption::new(o(&format!("{id}-a")), "A", "right", 1),
            AnswerOption::new(o(&format!("{id}-b")), "B", "wrong", 2),
            AnswerOption::new(o(&format!("{id}-c")), "C", "also wrong", 3),
        ],
        correct_option: Some(o(&format!("{id}-a"))),
        points_correct: 10,
        points_wrong,
        display_order: order,
    }
}

/// Two questions, ten seconds, pass at 60%.
pub fn fixture() -> QuizFixture {
    QuizFixture {
        level: Level::new(level_id(), "Warm-up", PassCondition::Percentage(60.0)),
        questions: vec![question("q1", 1, 0), question("q2", 2, -2)],
        duration_seconds: 10,
        xp_per_correct: 15,
        points_per_correct: 3,
        badge_on_pass: None,
    }
}

pub fn in_memory_api() -> InMemoryQuizApi {
    let api = InMemoryQuizApi::new(Clock::fixed(fixed_now()));
    api.insert_quiz(fixture()).unwrap();
    api
}

pub fn engine_config() -> EngineConfig {
    EngineConfig::default().with_request_timeout(Duration::from_secs(5))
}

/// Wraps another API and holds every submission until a permit is released.
#[derive(Clone)]
pub struct GatedApi {
    inner: InMemoryQuizApi,
    gate: Arc<Semaphore>,
    submit_calls: Arc<AtomicUsize>,
}

impl GatedApi {
    pub fn new(inner: InMemoryQuizApi) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
            submit_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizApi for GatedApi {
    async fn start_quiz(&self, level_id: &LevelId) -> Result<Attempt, ApiError> {
        self.inner.start_quiz(level_id).await
    }

    async fn submit_quiz(
        &self,
        attempt_id: &AttemptId,
        answers: &[AnswerEntry],
    ) -> Result<QuizResult, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| ApiError::Unavailable(e.to_string()))?;
        permit.forget();
        self.inner.submit_quiz(attempt_id, answers).await
    }
}

/// Starts fine, never answers a submission.
#[derive(Clone)]
pub struct StalledSubmitApi {
    pub inner: InMemoryQuizApi,
}

#[async_trait]
impl QuizApi for StalledSubmitApi {
    async fn start_quiz(&self, level_id: &LevelId) -> Result<Attempt, ApiError> {
        self.inner.start_quiz(level_id).await
    }

    async fn submit_quiz(
        &self,
        _attempt_id: &AttemptId,
        _answers: &[AnswerEntry],
    ) -> Result<QuizResult, ApiError> {
        std::future::pending().await
    }
}

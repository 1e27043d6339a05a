mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{GatedApi, engine_config, in_memory_api, init_tracing, level_id, o, q};
use quiz_core::model::ResultSource;
use quiz_services::sessions::{ManualTicks, TimerState};
use quiz_services::{
    EngineConfig, NavDirection, Phase, QuizSessionService, SessionError, SessionHandle,
};

fn spawn_with_manual_ticks(
    api: Arc<dyn quiz_services::QuizApi>,
) -> (SessionHandle, quiz_services::sessions::ManualTickHandle) {
    let (ticks, ticker) = ManualTicks::channel();
    let handle = SessionHandle::spawn(QuizSessionService::new(api, engine_config()), ticks);
    (handle, ticker)
}

#[tokio::test]
async fn manual_ticks_expire_and_submit() {
    init_tracing();
    let api = in_memory_api();
    let (handle, ticker) = spawn_with_manual_ticks(Arc::new(api.clone()));

    handle.start(level_id()).await.unwrap();
    let running = handle.wait_for(|s| s.phase == Phase::Running).await.unwrap();
    assert_eq!(running.progress.remaining_seconds, 10);
    assert_eq!(running.timer, TimerState::Running);

    assert!(ticker.advance(10));
    let done = handle.wait_for(|s| s.is_completed()).await.unwrap();

    assert_eq!(done.progress.remaining_seconds, 0);
    assert_eq!(done.timer, TimerState::Stopped);
    let result = done.result.unwrap();
    assert_eq!(result.unanswered_count, 2);
    assert_eq!(result.source, ResultSource::Server);
    assert_eq!(api.submissions().unwrap().len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn answers_flow_through_commands() {
    init_tracing();
    let api = in_memory_api();
    let (handle, _ticker) = spawn_with_manual_ticks(Arc::new(api.clone()));

    handle.start(level_id()).await.unwrap();
    handle.wait_for(|s| s.can_answer()).await.unwrap();

    handle.select_answer(q("q1"), o("q1-b")).await.unwrap();
    handle.select_answer(q("q1"), o("q1-a")).await.unwrap();
    handle.navigate(NavDirection::Next).await.unwrap();
    handle.select_answer(q("q2"), o("q2-a")).await.unwrap();
    let on_second = handle
        .wait_for(|s| s.selected_option == Some(o("q2-a")))
        .await
        .unwrap();
    assert_eq!(on_second.progress.answered, 2);
    assert!(on_second.progress.is_last());

    handle.submit().await.unwrap();
    let done = handle.wait_for(|s| s.is_completed()).await.unwrap();
    let result = done.result.unwrap();
    assert!(result.is_passed);
    assert_eq!(result.correct_count, 2);
    assert_eq!(result.xp_earned, 30);

    // Answers are frozen once completed.
    handle.select_answer(q("q2"), o("q2-b")).await.unwrap();
    handle.goto_index(0).await.unwrap();
    let after = handle
        .wait_for(|s| s.progress.current_index == 0)
        .await
        .unwrap();
    assert_eq!(after.selected_option, Some(o("q1-a")));
    let accepted = api.submissions().unwrap();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].answers[1].option_id, Some(o("q2-a")));
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    init_tracing();
    let api = GatedApi::new(in_memory_api());
    let (handle, _ticker) = spawn_with_manual_ticks(Arc::new(api.clone()));

    handle.start(level_id()).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Running).await.unwrap();

    handle.submit().await.unwrap();
    let submitting = handle
        .wait_for(|s| s.phase == Phase::Submitting)
        .await
        .unwrap();
    let estimate = submitting.result.unwrap();
    assert_eq!(estimate.source, ResultSource::Local);

    handle.submit().await.unwrap();
    // Commands are handled in order, so seeing the move means the second submit was seen too.
    handle.goto_index(1).await.unwrap();
    handle
        .wait_for(|s| s.progress.current_index == 1)
        .await
        .unwrap();
    assert_eq!(handle.snapshot().phase, Phase::Submitting);

    api.release(1);
    let done = handle.wait_for(|s| s.is_completed()).await.unwrap();
    assert_eq!(done.result.unwrap().source, ResultSource::Server);
    assert_eq!(api.submit_calls(), 1);
}

#[tokio::test]
async fn forced_start_discards_pending_submission() {
    init_tracing();
    let api = GatedApi::new(in_memory_api());
    let (handle, _ticker) = spawn_with_manual_ticks(Arc::new(api.clone()));

    handle.start(level_id()).await.unwrap();
    let first = handle.wait_for(|s| s.phase == Phase::Running).await.unwrap();
    handle.submit().await.unwrap();
    handle
        .wait_for(|s| s.phase == Phase::Submitting)
        .await
        .unwrap();

    handle.start_forced(level_id()).await.unwrap();
    let second = handle
        .wait_for(|s| s.phase == Phase::Running && s.attempt_id != first.attempt_id)
        .await
        .unwrap();

    assert!(second.result.is_none());
    assert_eq!(second.progress.answered, 0);
}

#[tokio::test]
async fn load_failure_is_published() {
    init_tracing();
    let api = in_memory_api();
    api.fail_next_start("maintenance").unwrap();
    let (handle, _ticker) = spawn_with_manual_ticks(Arc::new(api.clone()));

    handle.start(level_id()).await.unwrap();
    let failed = handle
        .wait_for(|s| s.phase.is_retryable())
        .await
        .unwrap();
    assert_eq!(
        failed.phase.error_message(),
        Some("quiz API unavailable: maintenance")
    );

    handle.start(level_id()).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Running).await.unwrap();
}

#[tokio::test]
async fn closed_handle_rejects_commands() {
    init_tracing();
    let (handle, _ticker) = spawn_with_manual_ticks(Arc::new(in_memory_api()));
    let mut updates = handle.subscribe();
    let _ = updates.borrow_and_update();

    handle.close();
    assert!(handle.is_closed());
    assert!(updates.changed().await.is_err());

    let err = handle.start(level_id()).await.unwrap_err();
    assert!(matches!(err, SessionError::Closed));
}

#[tokio::test]
async fn expiry_publishes_submitting_before_completed() {
    init_tracing();
    let api = GatedApi::new(in_memory_api());
    let (handle, ticker) = spawn_with_manual_ticks(Arc::new(api.clone()));

    handle.start(level_id()).await.unwrap();
    handle.wait_for(|s| s.phase == Phase::Running).await.unwrap();

    assert!(ticker.advance(10));
    let submitting = handle
        .wait_for(|s| s.phase == Phase::Submitting)
        .await
        .unwrap();
    assert_eq!(submitting.progress.remaining_seconds, 0);
    assert_eq!(submitting.timer, TimerState::Stopped);
    assert_eq!(submitting.result.unwrap().source, ResultSource::Local);
    assert_eq!(api.submit_calls(), 1);

    api.release(1);
    let done = handle.wait_for(|s| s.is_completed()).await.unwrap();
    assert_eq!(done.result.unwrap().unanswered_count, 2);
}

#[tokio::test(start_paused = true)]
async fn zero_tick_interval_still_runs_the_clock() {
    init_tracing();
    let config = EngineConfig {
        tick_interval: Duration::ZERO,
        ..engine_config()
    };
    let handle = SessionHandle::spawn_with_interval(QuizSessionService::new(
        Arc::new(in_memory_api()),
        config,
    ));

    handle.start(level_id()).await.unwrap();
    let done = handle.wait_for(|s| s.is_completed()).await.unwrap();
    assert_eq!(done.result.unwrap().unanswered_count, 2);
}

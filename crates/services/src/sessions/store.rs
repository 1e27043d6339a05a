use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use quiz_core::model::{
    AnswerEntry, AnswerMap, Attempt, AttemptId, LevelId, OptionId, Question, QuestionId,
    QuizResult,
};
use quiz_core::scoring::score_locally;
use quiz_core::{Clock, Countdown, CountdownStep};

use super::phase::Phase;
use super::progress::SessionProgress;
use super::timer::{TickDecision, TimerDriver, TimerState};
use crate::error::{ApiError, SessionError};

//
// ─── COMMAND / OUTCOME TYPES ───────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Previous,
    Next,
}

/// Effect of a single timer tick on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is stopped or the session already left `Running`.
    Ignored,
    /// The timer is paused; remaining time is unchanged.
    Paused,
    Ticked { remaining: u32 },
    /// Remaining time hit zero on this tick; the session is now `Expired`.
    TimeUp,
}

/// Issued when a load begins; must be handed back with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    level_id: LevelId,
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn level_id(&self) -> &LevelId {
        &self.level_id
    }
}

/// Snapshot of what is being submitted, taken when entering `Submitting`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    attempt_id: AttemptId,
    answers: Vec<AnswerEntry>,
    forced: bool,
    generation: u64,
}

impl SubmissionTicket {
    #[must_use]
    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    /// One entry per question, unanswered ones with `None`.
    #[must_use]
    pub fn answers(&self) -> &[AnswerEntry] {
        &self.answers
    }

    /// Triggered by the timer rather than by the user.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.forced
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Sole owner of one quiz session's state.
///
/// Every mutation goes through a method here, and each method checks the
/// phase before touching anything. Operations that are not allowed in the
/// current phase are no-ops (synchronous ones return `false`).
///
/// Network calls happen outside the store: `begin_*` hands out a ticket,
/// the caller awaits the API, and `finish_*` applies the outcome. Tickets
/// from a discarded session are refused.
pub struct SessionStore {
    clock: Clock,
    generation: u64,
    phase: Phase,
    level_id: Option<LevelId>,
    attempt: Option<Attempt>,
    answers: AnswerMap,
    current: usize,
    countdown: Countdown,
    timer: TimerDriver,
    result: Option<QuizResult>,
    submit_count: u32,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Clock::default())
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            generation: 0,
            phase: Phase::Idle,
            level_id: None,
            attempt: None,
            answers: AnswerMap::new(),
            current: 0,
            countdown: Countdown::new(0),
            timer: TimerDriver::default(),
            result: None,
            submit_count: 0,
            submitted_at: None,
            completed_at: None,
        }
    }

    // ── accessors ──────────────────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn level_id(&self) -> Option<&LevelId> {
        self.level_id.as_ref()
    }

    #[must_use]
    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    /// Whether ticks should still be delivered (running or paused).
    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.timer.is_active()
    }

    /// Cached result: a local estimate while submitting, the server result once completed.
    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Number of submissions started for the current attempt.
    #[must_use]
    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.attempt.as_ref().map_or(0, Attempt::question_count)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.attempt.as_ref()?.question_at(self.current)
    }

    #[must_use]
    pub fn selected_option(&self, question: &QuestionId) -> Option<&OptionId> {
        self.answers.get(question)
    }

    #[must_use]
    pub fn is_answered(&self, question: &QuestionId) -> bool {
        self.answers.is_answered(question)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.question_count().saturating_sub(self.answers.len())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.question_count(),
            answered: self.answered_count(),
            unanswered: self.unanswered_count(),
            current_index: self.current,
            remaining_seconds: self.countdown.remaining(),
            elapsed_seconds: self.countdown.elapsed(),
        }
    }

    /// Local estimate of the result for the current answers.
    #[must_use]
    pub fn preview_result(&self) -> Option<QuizResult> {
        self.attempt
            .as_ref()
            .map(|attempt| score_locally(attempt, &self.answers))
    }

    // ── loading ────────────────────────────────────────────────────────────────

    /// Enter `Loading` for `level_id`, discarding any previous attempt.
    ///
    /// Without `force`, only allowed from `Idle`, `Completed`, `SubmitFailed`
    /// and `LoadFailed`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhase` when starting is not allowed.
    pub fn begin_loading(
        &mut self,
        level_id: LevelId,
        force: bool,
    ) -> Result<LoadTicket, SessionError> {
        if !force && !self.phase.can_start() {
            debug!(phase = %self.phase, level_id = %level_id, "start rejected");
            return Err(SessionError::InvalidPhase {
                phase: self.phase.name(),
            });
        }

        if let Some(previous) = &self.attempt {
            if self.phase != Phase::Completed {
                info!(
                    attempt_id = %previous.id(),
                    phase = %self.phase,
                    "discarding unfinished attempt"
                );
            }
        }

        self.discard();
        self.level_id = Some(level_id.clone());
        self.phase = Phase::Loading;
        Ok(LoadTicket {
            level_id,
            generation: self.generation,
        })
    }

    /// Apply the outcome of a load started with `begin_loading`.
    ///
    /// On success the attempt starts `Running` with a full countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Superseded` for a stale ticket, and
    /// `SessionError::Load` when the API failed (the phase becomes `LoadFailed`).
    pub fn finish_loading(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Attempt, ApiError>,
    ) -> Result<&Attempt, SessionError> {
        self.check_ticket(ticket.generation, &Phase::Loading)?;

        match outcome {
            Ok(attempt) => {
                info!(
                    attempt_id = %attempt.id(),
                    level_id = %ticket.level_id,
                    questions = attempt.question_count(),
                    duration_seconds = attempt.duration_seconds(),
                    "quiz attempt started"
                );
                self.answers = AnswerMap::new();
                self.current = 0;
                self.countdown = Countdown::new(attempt.duration_seconds());
                self.timer.start();
                self.phase = Phase::Running;
                Ok(&*self.attempt.insert(attempt))
            }
            Err(err) => {
                warn!(level_id = %ticket.level_id, error = %err, "failed to start quiz");
                self.phase = Phase::LoadFailed {
                    message: err.to_string(),
                };
                Err(SessionError::Load(err))
            }
        }
    }

    // ── answering & navigation ─────────────────────────────────────────────────

    /// Choose `option` for `question`, replacing any earlier choice.
    ///
    /// Returns false (and changes nothing) unless the session is `Running`
    /// and the option belongs to that question of the current attempt.
    pub fn select_answer(&mut self, question: &QuestionId, option: &OptionId) -> bool {
        if !self.phase.accepts_answers() {
            debug!(
                phase = %self.phase,
                question = %question,
                "answer ignored outside running phase"
            );
            return false;
        }
        let valid = self
            .attempt
            .as_ref()
            .and_then(|a| a.question(question))
            .is_some_and(|q| q.has_option(option));
        if !valid {
            debug!(
                question = %question,
                option = %option,
                "answer ignored for unknown question or option"
            );
            return false;
        }

        self.answers.select(question.clone(), option.clone());
        true
    }

    /// Select an option for the question currently shown.
    pub fn select_current(&mut self, option: &OptionId) -> bool {
        let Some(question) = self.current_question().map(|q| q.id().clone()) else {
            return false;
        };
        self.select_answer(&question, option)
    }

    /// Remove the answer for `question`. Only while `Running`.
    pub fn clear_answer(&mut self, question: &QuestionId) -> bool {
        if !self.phase.accepts_answers() {
            debug!(
                phase = %self.phase,
                question = %question,
                "clear ignored outside running phase"
            );
            return false;
        }
        self.answers.clear(question).is_some()
    }

    /// Move one question back or forward, clamped to the question range.
    pub fn navigate(&mut self, direction: NavDirection) -> usize {
        let target = match direction {
            NavDirection::Previous => self.current.saturating_sub(1),
            NavDirection::Next => self.current.saturating_add(1),
        };
        self.goto_index(target)
    }

    /// Jump to `index`, clamped to the question range.
    pub fn goto_index(&mut self, index: usize) -> usize {
        let count = self.question_count();
        self.current = if count == 0 { 0 } else { index.min(count - 1) };
        self.current
    }

    // ── timer ──────────────────────────────────────────────────────────────────

    pub fn pause(&mut self) -> bool {
        self.phase.accepts_answers() && self.timer.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.phase.accepts_answers() && self.timer.resume()
    }

    /// Process one tick of the timer.
    ///
    /// Reaching zero moves the session to `Expired` exactly once; the caller
    /// is expected to start the forced submission right after `TimeUp`.
    pub fn tick(&mut self) -> TickOutcome {
        match self.timer.on_tick() {
            TickDecision::Ignore => return TickOutcome::Ignored,
            TickDecision::Skip => return TickOutcome::Paused,
            TickDecision::Decrement => {}
        }
        if !self.phase.accepts_answers() {
            self.timer.stop();
            return TickOutcome::Ignored;
        }

        match self.countdown.tick() {
            CountdownStep::Remaining(remaining) => TickOutcome::Ticked { remaining },
            CountdownStep::ReachedZero | CountdownStep::AlreadyExpired => {
                if self.timer.claim_time_up() {
                    self.on_time_up();
                    TickOutcome::TimeUp
                } else {
                    TickOutcome::Ignored
                }
            }
        }
    }

    fn on_time_up(&mut self) {
        self.phase = Phase::Expired;
        info!(
            attempt_id = %self.attempt.as_ref().map_or("-", |a| a.id().as_str()),
            answered = self.answers.len(),
            "time is up, answers are frozen"
        );
    }

    // ── submission ─────────────────────────────────────────────────────────────

    /// Enter `Submitting`: stop the timer, snapshot the answers and cache a
    /// local estimate of the result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::SubmissionInFlight` while already submitting,
    /// `SessionError::InvalidPhase` outside `Running`/`Expired`/`SubmitFailed`,
    /// and `SessionError::NoAttempt` if nothing is loaded.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, SessionError> {
        if self.phase == Phase::Submitting {
            debug!("submit rejected, one is already in flight");
            return Err(SessionError::SubmissionInFlight);
        }
        if !self.phase.can_submit() {
            debug!(phase = %self.phase, "submit rejected");
            return Err(SessionError::InvalidPhase {
                phase: self.phase.name(),
            });
        }
        let attempt = self.attempt.as_ref().ok_or(SessionError::NoAttempt)?;

        let forced = self.phase == Phase::Expired;
        let ticket = SubmissionTicket {
            attempt_id: attempt.id().clone(),
            answers: self.answers.to_entries(attempt),
            forced,
            generation: self.generation,
        };
        let estimate = score_locally(attempt, &self.answers);

        self.timer.stop();
        self.phase = Phase::Submitting;
        self.submit_count = self.submit_count.saturating_add(1);
        self.submitted_at = Some(self.clock.now());
        self.result = Some(match self.result.take() {
            Some(previous) => previous.reconcile(estimate),
            None => estimate,
        });

        info!(
            attempt_id = %ticket.attempt_id,
            forced,
            try_number = self.submit_count,
            "submitting quiz attempt"
        );
        Ok(ticket)
    }

    /// Apply the outcome of a submission started with `begin_submission`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Superseded` for a stale ticket, and
    /// `SessionError::Submit` when the API failed (the phase becomes
    /// `SubmitFailed` and answers are kept for a retry).
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<QuizResult, ApiError>,
    ) -> Result<&QuizResult, SessionError> {
        self.check_ticket(ticket.generation, &Phase::Submitting)?;
        if self.attempt.as_ref().map(Attempt::id) != Some(&ticket.attempt_id) {
            return Err(SessionError::Superseded);
        }

        match outcome {
            Ok(result) => {
                let result = match self.result.take() {
                    Some(previous) => previous.reconcile(result),
                    None => result,
                };
                info!(
                    attempt_id = %ticket.attempt_id,
                    score = result.score_points,
                    passed = result.is_passed,
                    xp = result.xp_earned,
                    "quiz attempt completed"
                );
                self.phase = Phase::Completed;
                self.completed_at = Some(self.clock.now());
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                warn!(attempt_id = %ticket.attempt_id, error = %err, "quiz submission failed");
                self.phase = Phase::SubmitFailed {
                    message: err.to_string(),
                };
                Err(SessionError::Submit(err))
            }
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────────────

    /// Drop everything and return to `Idle`. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.discard();
        self.level_id = None;
        self.phase = Phase::Idle;
    }

    fn discard(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.timer.stop();
        self.attempt = None;
        self.answers = AnswerMap::new();
        self.current = 0;
        self.countdown = Countdown::new(0);
        self.result = None;
        self.submit_count = 0;
        self.submitted_at = None;
        self.completed_at = None;
    }

    fn check_ticket(&self, generation: u64, expected: &Phase) -> Result<(), SessionError> {
        if generation != self.generation || &self.phase != expected {
            debug!(phase = %self.phase, expected = %expected, "stale completion ignored");
            return Err(SessionError::Superseded);
        }
        Ok(())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("phase", &self.phase)
            .field("attempt_id", &self.attempt.as_ref().map(Attempt::id))
            .field("answers_len", &self.answers.len())
            .field("current", &self.current)
            .field("remaining", &self.countdown.remaining())
            .field("timer", &self.timer.state())
            .field("submit_count", &self.submit_count)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerOption, Level, PassCondition, QuestionDraft, ResultSource};
    use quiz_core::time::fixed_now;

    fn draft(id: &str, order: u32) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(id),
            text: format!("Question {id}"),
            options: vec![
                AnswerOption::new(OptionId::new(format!("{id}-a")), "A", "right", 1),
                AnswerOption::new(OptionId::new(format!("{id}-b")), "B", "wrong", 2),
            ],
            correct_option: Some(OptionId::new(format!("{id}-a"))),
            points_correct: 10,
            points_wrong: -2,
            display_order: order,
        }
    }

    fn attempt(duration: u32) -> Attempt {
        Attempt::new(
            AttemptId::new("att-1"),
            Level::new(LevelId::new("level-1"), "Level 1", PassCondition::Percentage(50.0)),
            vec![draft("q1", 1), draft("q2", 2), draft("q3", 3)],
            duration,
            fixed_now(),
        )
        .unwrap()
    }

    fn running_store(duration: u32) -> SessionStore {
        let mut store = SessionStore::new(Clock::fixed(fixed_now()));
        let ticket = store.begin_loading(LevelId::new("level-1"), false).unwrap();
        store.finish_loading(ticket, Ok(attempt(duration))).unwrap();
        store
    }

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    fn o(id: &str) -> OptionId {
        OptionId::new(id)
    }

    #[test]
    fn loading_success_starts_running() {
        let store = running_store(30);
        assert_eq!(store.phase(), &Phase::Running);
        assert_eq!(store.remaining_seconds(), 30);
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.timer_state(), TimerState::Running);
        assert_eq!(store.unanswered_count(), 3);
    }

    #[test]
    fn loading_failure_records_message() {
        let mut store = SessionStore::default();
        let ticket = store.begin_loading(LevelId::new("level-1"), false).unwrap();
        let err = store
            .finish_loading(ticket, Err(ApiError::Unavailable("offline".into())))
            .unwrap_err();

        assert!(matches!(err, SessionError::Load(_)));
        assert!(matches!(
            store.phase(),
            Phase::LoadFailed { message } if message.contains("offline")
        ));
        assert!(store.phase().can_start());
    }

    #[test]
    fn start_while_running_requires_force() {
        let mut store = running_store(30);
        let err = store.begin_loading(LevelId::new("level-2"), false).unwrap_err();
        assert!(matches!(err, SessionError::InvalidPhase { phase: "running" }));

        store.begin_loading(LevelId::new("level-2"), true).unwrap();
        assert_eq!(store.phase(), &Phase::Loading);
        assert!(store.attempt().is_none());
        assert!(store.answers().is_empty());
    }

    #[test]
    fn stale_load_ticket_is_refused() {
        let mut store = SessionStore::default();
        let stale = store.begin_loading(LevelId::new("level-1"), false).unwrap();
        let fresh = store.begin_loading(LevelId::new("level-2"), true).unwrap();

        let err = store.finish_loading(stale, Ok(attempt(30))).unwrap_err();
        assert!(matches!(err, SessionError::Superseded));
        assert_eq!(store.phase(), &Phase::Loading);

        store.finish_loading(fresh, Ok(attempt(30))).unwrap();
        assert_eq!(store.level_id(), Some(&LevelId::new("level-2")));
    }

    #[test]
    fn last_selection_wins() {
        let mut store = running_store(30);
        assert!(store.select_answer(&q("q1"), &o("q1-a")));
        assert!(store.select_answer(&q("q1"), &o("q1-b")));

        assert_eq!(store.answered_count(), 1);
        assert_eq!(store.selected_option(&q("q1")), Some(&o("q1-b")));
    }

    #[test]
    fn foreign_question_or_option_is_ignored() {
        let mut store = running_store(30);
        assert!(!store.select_answer(&q("q9"), &o("q1-a")));
        assert!(!store.select_answer(&q("q1"), &o("q2-a")));
        assert!(store.answers().is_empty());
    }

    #[test]
    fn select_current_uses_current_question() {
        let mut store = running_store(30);
        store.navigate(NavDirection::Next);
        assert!(store.select_current(&o("q2-a")));
        assert!(store.is_answered(&q("q2")));
    }

    #[test]
    fn answers_are_frozen_outside_running() {
        let mut store = running_store(30);
        store.select_answer(&q("q1"), &o("q1-a"));
        store.begin_submission().unwrap();
        let before = store.answers().clone();

        assert!(!store.select_answer(&q("q2"), &o("q2-a")));
        assert!(!store.clear_answer(&q("q1")));
        assert_eq!(store.answers(), &before);
    }

    #[test]
    fn clear_answer_while_running() {
        let mut store = running_store(30);
        store.select_answer(&q("q1"), &o("q1-a"));
        assert!(store.clear_answer(&q("q1")));
        assert!(!store.clear_answer(&q("q1")));
    }

    #[test]
    fn navigation_is_clamped() {
        let mut store = running_store(30);
        assert_eq!(store.navigate(NavDirection::Previous), 0);
        for _ in 0..10 {
            store.navigate(NavDirection::Next);
        }
        assert_eq!(store.current_index(), 2);
        assert_eq!(store.goto_index(99), 2);
        assert_eq!(store.goto_index(1), 1);
        assert_eq!(store.current_question().unwrap().id(), &q("q2"));
    }

    #[test]
    fn navigation_without_attempt_stays_at_zero() {
        let mut store = SessionStore::default();
        assert_eq!(store.navigate(NavDirection::Next), 0);
        assert!(store.current_question().is_none());
    }

    #[test]
    fn navigation_still_works_after_expiry() {
        let mut store = running_store(1);
        assert_eq!(store.tick(), TickOutcome::TimeUp);
        assert_eq!(store.navigate(NavDirection::Next), 1);
        assert!(!store.select_current(&o("q2-a")));
    }

    #[test]
    fn ticks_count_down_and_expire_once() {
        let mut store = running_store(3);
        let mut outcomes = Vec::new();
        let mut last = store.remaining_seconds();
        for _ in 0..6 {
            outcomes.push(store.tick());
            assert!(store.remaining_seconds() <= last);
            last = store.remaining_seconds();
        }

        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Ticked { remaining: 2 },
                TickOutcome::Ticked { remaining: 1 },
                TickOutcome::TimeUp,
                TickOutcome::Ignored,
                TickOutcome::Ignored,
                TickOutcome::Ignored,
            ]
        );
        assert_eq!(store.phase(), &Phase::Expired);
        assert_eq!(store.remaining_seconds(), 0);
    }

    #[test]
    fn pause_keeps_remaining_time() {
        let mut store = running_store(5);
        store.tick();
        assert!(store.pause());
        assert_eq!(store.tick(), TickOutcome::Paused);
        assert_eq!(store.tick(), TickOutcome::Paused);
        assert_eq!(store.remaining_seconds(), 4);
        assert!(store.resume());
        assert_eq!(store.tick(), TickOutcome::Ticked { remaining: 3 });
    }

    #[test]
    fn pause_is_rejected_outside_running() {
        let mut store = SessionStore::default();
        assert!(!store.pause());
        let mut store = running_store(5);
        store.begin_submission().unwrap();
        assert!(!store.pause());
        assert!(!store.resume());
    }

    #[test]
    fn submission_snapshots_all_questions() {
        let mut store = running_store(30);
        store.select_answer(&q("q2"), &o("q2-b"));

        let ticket = store.begin_submission().unwrap();

        assert_eq!(store.phase(), &Phase::Submitting);
        assert_eq!(store.timer_state(), TimerState::Stopped);
        assert!(!ticket.is_forced());
        let entries: Vec<_> = ticket
            .answers()
            .iter()
            .map(|e| (e.question_id.as_str(), e.option_id.as_ref().map(OptionId::as_str)))
            .collect();
        assert_eq!(
            entries,
            vec![("q1", None), ("q2", Some("q2-b")), ("q3", None)]
        );
        let estimate = store.result().unwrap();
        assert_eq!(estimate.source, ResultSource::Local);
        assert_eq!(estimate.score_points, -2);
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut store = running_store(30);
        store.begin_submission().unwrap();
        let err = store.begin_submission().unwrap_err();
        assert!(matches!(err, SessionError::SubmissionInFlight));
        assert_eq!(store.submit_count(), 1);
    }

    #[test]
    fn submit_from_idle_is_invalid() {
        let mut store = SessionStore::default();
        assert!(matches!(
            store.begin_submission(),
            Err(SessionError::InvalidPhase { phase: "idle" })
        ));
    }

    #[test]
    fn failed_submission_keeps_answers_and_attempt() {
        let mut store = running_store(30);
        store.select_answer(&q("q1"), &o("q1-a"));
        let answers_before = store.answers().clone();
        let attempt_before = store.attempt().cloned();

        let ticket = store.begin_submission().unwrap();
        let err = store
            .finish_submission(ticket, Err(ApiError::Unavailable("502".into())))
            .unwrap_err();

        assert!(matches!(err, SessionError::Submit(_)));
        assert!(store.phase().is_retryable());
        assert_eq!(store.answers(), &answers_before);
        assert_eq!(store.attempt().cloned(), attempt_before);

        // Retry is allowed from SubmitFailed.
        let retry = store.begin_submission().unwrap();
        assert_eq!(retry.answers(), answers_before.to_entries(store.attempt().unwrap()));
        assert_eq!(store.submit_count(), 2);
    }

    #[test]
    fn server_result_replaces_estimate() {
        let mut store = running_store(30);
        store.select_answer(&q("q1"), &o("q1-a"));
        let ticket = store.begin_submission().unwrap();

        let mut server = store.preview_result().unwrap();
        server.source = ResultSource::Server;
        server.xp_earned = 50;
        let result = store.finish_submission(ticket, Ok(server)).unwrap();

        assert_eq!(result.source, ResultSource::Server);
        assert_eq!(result.xp_earned, 50);
        assert_eq!(store.phase(), &Phase::Completed);
        assert_eq!(store.completed_at(), Some(fixed_now()));
    }

    #[test]
    fn expired_submission_is_forced() {
        let mut store = running_store(1);
        store.tick();
        let ticket = store.begin_submission().unwrap();
        assert!(ticket.is_forced());
    }

    #[test]
    fn completion_for_discarded_attempt_is_refused() {
        let mut store = running_store(30);
        let ticket = store.begin_submission().unwrap();
        store.reset();

        let err = store
            .finish_submission(ticket, Ok(score_locally(&attempt(30), &AnswerMap::new())))
            .unwrap_err();
        assert!(matches!(err, SessionError::Superseded));
        assert_eq!(store.phase(), &Phase::Idle);
    }
}

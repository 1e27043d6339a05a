use quiz_core::model::{AttemptId, LevelId, OptionId, Question, QuizResult};
use quiz_core::time::format_seconds;

use super::phase::Phase;
use super::progress::SessionProgress;
use super::store::SessionStore;
use super::timer::TimerState;

/// Presentation-agnostic view of a session at one instant.
///
/// Owned and cloneable so it can be broadcast to observers without holding
/// the store. Contains no formatted strings besides `remaining_label`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub level_id: Option<LevelId>,
    pub attempt_id: Option<AttemptId>,
    pub progress: SessionProgress,
    pub timer: TimerState,
    pub current_question: Option<Question>,
    pub selected_option: Option<OptionId>,
    pub result: Option<QuizResult>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(store: &SessionStore) -> Self {
        let current_question = store.current_question().cloned();
        let selected_option = current_question
            .as_ref()
            .and_then(|q| store.selected_option(q.id()))
            .cloned();
        Self {
            phase: store.phase().clone(),
            level_id: store.level_id().cloned(),
            attempt_id: store.attempt().map(|a| a.id().clone()),
            progress: store.progress(),
            timer: store.timer_state(),
            current_question,
            selected_option,
            result: store.result().cloned(),
        }
    }

    #[must_use]
    pub fn can_answer(&self) -> bool {
        self.phase.accepts_answers()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// A load or submission is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.current_question.is_some() && !self.progress.is_first()
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.current_question.is_some() && !self.progress.is_last()
    }

    /// Remaining time as `mm:ss`.
    #[must_use]
    pub fn remaining_label(&self) -> String {
        format_seconds(self.progress.remaining_seconds)
    }
}

impl From<&SessionStore> for SessionSnapshot {
    fn from(store: &SessionStore) -> Self {
        Self::capture(store)
    }
}

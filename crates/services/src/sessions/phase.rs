use std::fmt;

/// Lifecycle of a quiz session.
///
/// ```text
/// Idle ─► Loading ─► Running ─► Submitting ─► Completed
///            │          │            ▲  │
///            ▼          ▼            │  ▼
///       LoadFailed   Expired ────────┘ SubmitFailed ─► (retry) Submitting
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Running,
    /// Time ran out; answers are frozen and a forced submission follows.
    Expired,
    Submitting,
    Completed,
    SubmitFailed {
        message: String,
    },
    LoadFailed {
        message: String,
    },
}

impl Phase {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Running => "running",
            Phase::Expired => "expired",
            Phase::Submitting => "submitting",
            Phase::Completed => "completed",
            Phase::SubmitFailed { .. } => "submit-failed",
            Phase::LoadFailed { .. } => "load-failed",
        }
    }

    /// Phases from which a new attempt may be started without forcing.
    #[must_use]
    pub fn can_start(&self) -> bool {
        matches!(
            self,
            Phase::Idle | Phase::Completed | Phase::SubmitFailed { .. } | Phase::LoadFailed { .. }
        )
    }

    #[must_use]
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Phase::Running)
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        matches!(
            self,
            Phase::Running | Phase::Expired | Phase::SubmitFailed { .. }
        )
    }

    /// A network call is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Loading | Phase::Submitting)
    }

    /// The UI should offer a retry affordance.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Phase::SubmitFailed { .. } | Phase::LoadFailed { .. })
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Phase::SubmitFailed { message } | Phase::LoadFailed { message } => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

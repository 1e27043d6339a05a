use chrono::{DateTime, Utc};

/// A simple clock abstraction for deterministic timestamps in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

//
// ─── COUNTDOWN ─────────────────────────────────────────────────────────────────
//

/// What a single countdown step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Time left after the decrement.
    Remaining(u32),
    /// This step brought the countdown to zero.
    ReachedZero,
    /// Already at zero; nothing changed.
    AlreadyExpired,
}

/// Remaining-time accounting for an attempt, in whole seconds.
///
/// `remaining` only ever goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(total_seconds: u32) -> Self {
        Self {
            total: total_seconds,
            remaining: total_seconds,
        }
    }

    /// Decrement by one second.
    pub fn tick(&mut self) -> CountdownStep {
        match self.remaining {
            0 => CountdownStep::AlreadyExpired,
            1 => {
                self.remaining = 0;
                CountdownStep::ReachedZero
            }
            n => {
                self.remaining = n - 1;
                CountdownStep::Remaining(self.remaining)
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.total - self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Remaining time as `mm:ss`.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format_seconds(self.remaining)
    }
}

/// `mm:ss`; minutes are not wrapped at an hour.
#[must_use]
pub fn format_seconds(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

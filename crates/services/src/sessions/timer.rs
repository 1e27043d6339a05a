//! Timer driver for the active attempt.
//!
//! The driver never touches remaining time itself. It tells the store whether
//! a tick should count and guards the time-up signal so it fires once.

/// Lifecycle of the ticking process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// What the store should do with an incoming tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Count down one second.
    Decrement,
    /// Paused: stay alive, leave remaining time alone.
    Skip,
    /// Stopped: the tick arrived late and must not mutate anything.
    Ignore,
}

#[derive(Debug, Clone, Default)]
pub struct TimerDriver {
    state: TimerState,
    time_up_fired: bool,
    ticks_counted: u64,
}

impl TimerDriver {
    /// Arm the driver for a fresh attempt.
    pub fn start(&mut self) {
        self.state = TimerState::Running;
        self.time_up_fired = false;
        self.ticks_counted = 0;
    }

    /// Safe to call any number of times.
    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    pub fn pause(&mut self) -> bool {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
            true
        } else {
            false
        }
    }

    pub fn on_tick(&mut self) -> TickDecision {
        match self.state {
            TimerState::Running => {
                self.ticks_counted += 1;
                TickDecision::Decrement
            }
            TimerState::Paused => TickDecision::Skip,
            TimerState::Stopped => TickDecision::Ignore,
        }
    }

    /// Returns true exactly once per armed attempt, and stops the driver.
    pub fn claim_time_up(&mut self) -> bool {
        if self.time_up_fired {
            return false;
        }
        self.time_up_fired = true;
        self.stop();
        true
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Running or paused: the tick source should keep delivering ticks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != TimerState::Stopped
    }

    #[must_use]
    pub fn time_up_fired(&self) -> bool {
        self.time_up_fired
    }

    /// Ticks that decremented time since the last `start`.
    #[must_use]
    pub fn ticks_counted(&self) -> u64 {
        self.ticks_counted
    }
}

mod actor;
mod phase;
mod progress;
mod store;
mod submission;
mod ticks;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use actor::{SessionCommand, SessionHandle};
pub use phase::Phase;
pub use progress::SessionProgress;
pub use store::{LoadTicket, NavDirection, SessionStore, SubmissionTicket, TickOutcome};
pub use submission::SubmissionCoordinator;
pub use ticks::{IntervalTicks, ManualTickHandle, ManualTicks, TickSource};
pub use timer::{TickDecision, TimerDriver, TimerState};
pub use view::SessionSnapshot;
pub use workflow::QuizSessionService;

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use api::{HttpQuizApi, InMemoryQuizApi, QuizApi, QuizFixture};
pub use config::{ApiConfig, EngineConfig};
pub use error::{ApiError, ConfigError, SessionError};

pub use sessions::{
    NavDirection, Phase, QuizSessionService, SessionCommand, SessionHandle, SessionProgress,
    SessionSnapshot, SessionStore, TickOutcome,
};

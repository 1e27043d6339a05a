use thiserror::Error;

use crate::model::{AttemptError, LevelError, ParseIdError, QuestionError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}

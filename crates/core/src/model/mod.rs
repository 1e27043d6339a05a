mod answers;
mod attempt;
mod ids;
mod level;
mod question;
mod result;

pub use answers::{AnswerEntry, AnswerMap};
pub use attempt::{Attempt, AttemptError};
pub use ids::{AttemptId, LevelId, OptionId, ParseIdError, QuestionId};
pub use level::{Level, LevelError, PassCondition};
pub use question::{AnswerOption, Question, QuestionDraft, QuestionError};
pub use result::{Badge, QuizResult, ResultSource};

use thiserror::Error;

use crate::api::ApiError;

/// Validation and flow errors from the flashcard/quiz session controller.
/// None of these are fatal; the panel can always be closed and reopened.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Quiz generation produced zero usable questions, or there were no
    /// flashcard ids to generate from.
    #[error("The generated quiz had no questions.")]
    EmptyQuiz,

    /// An operation that needs a live quiz ran without one.
    #[error("No active quiz.")]
    NoActiveQuiz,

    /// Answer submission failed; the question stays answerable.
    #[error("Answer submit failed: {0}")]
    AnswerSubmit(String),

    /// Collaborator failure outside answer submission (e.g. generation).
    #[error(transparent)]
    Backend(#[from] ApiError),
}

//! Error types for lesson-core.

use thiserror::Error;

/// Result type alias using ExerciseError.
pub type Result<T> = std::result::Result<T, ExerciseError>;

/// Errors raised by exercise generators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExerciseError {
    #[error("lesson {lesson_id} has no content for {kind} exercises")]
    NoSourceMaterial { lesson_id: String, kind: &'static str },

    #[error("unknown exercise type: {0}")]
    UnknownKind(String),
}

//! Error handling for the lesson engine

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::repository::RepositoryError;

/// Engine error types
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Lesson not found: {lesson_id}")]
    LessonNotFound { lesson_id: String },

    #[error("Lesson {lesson_id} is locked")]
    LessonLocked {
        lesson_id: String,
        unmet_prerequisites: Vec<String>,
    },

    #[error("Failed to generate {exercise_type} exercises for lesson {lesson_id}: {reason}")]
    ExerciseGenerationFailed {
        lesson_id: String,
        exercise_type: String,
        reason: String,
    },

    #[error("Exercise not found: {exercise_id}")]
    ExerciseNotFound { exercise_id: String },

    #[error("Failed to validate exercise {exercise_id}: {reason}")]
    ExerciseValidationFailed { exercise_id: String, reason: String },

    #[error("No progress for lesson {lesson_id}")]
    ProgressNotFound { user_id: String, lesson_id: String },

    #[error("User not authenticated")]
    UserNotAuthenticated,

    #[error("Internal error: {0}")]
    Internal(#[from] RepositoryError),
}

/// Error body for a presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub details: Value,
}

impl EngineError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::LessonNotFound { .. } => "lesson_not_found",
            EngineError::LessonLocked { .. } => "lesson_locked",
            EngineError::ExerciseGenerationFailed { .. } => "exercise_generation_failed",
            EngineError::ExerciseNotFound { .. } => "exercise_not_found",
            EngineError::ExerciseValidationFailed { .. } => "exercise_validation_failed",
            EngineError::ProgressNotFound { .. } => "progress_not_found",
            EngineError::UserNotAuthenticated => "user_not_authenticated",
            EngineError::Internal(_) => "internal_error",
        }
    }

    /// Structured context for the error
    pub fn details(&self) -> Value {
        match self {
            EngineError::LessonNotFound { lesson_id } => json!({ "lesson_id": lesson_id }),
            EngineError::LessonLocked {
                lesson_id,
                unmet_prerequisites,
            } => json!({
                "lesson_id": lesson_id,
                "unmet_prerequisites": unmet_prerequisites,
            }),
            EngineError::ExerciseGenerationFailed {
                lesson_id,
                exercise_type,
                reason,
            } => json!({
                "lesson_id": lesson_id,
                "exercise_type": exercise_type,
                "reason": reason,
            }),
            EngineError::ExerciseNotFound { exercise_id } => json!({ "exercise_id": exercise_id }),
            EngineError::ExerciseValidationFailed {
                exercise_id,
                reason,
            } => json!({ "exercise_id": exercise_id, "reason": reason }),
            EngineError::ProgressNotFound { user_id, lesson_id } => {
                json!({ "user_id": user_id, "lesson_id": lesson_id })
            }
            EngineError::UserNotAuthenticated => json!({}),
            EngineError::Internal(source) => json!({ "source": source.to_string() }),
        }
    }

    /// Whether the error is safe to show to the learner as-is
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, EngineError::Internal(_))
    }

    /// Body for a presentation layer. Internal errors keep their source
    /// out of the message and details.
    pub fn to_body(&self) -> ErrorBody {
        if !self.is_user_facing() {
            return ErrorBody {
                error: self.code(),
                message: "Internal error".to_string(),
                details: json!({}),
            };
        }
        ErrorBody {
            error: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

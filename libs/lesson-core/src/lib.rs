//! Core lesson library shared by the engine and its callers.
//!
//! Provides:
//! - Review scheduling (SM-2 driven by 0-100 performance scores)
//! - Exercise generators (flashcard, multiple choice) with seedable randomness
//! - Answer matching for typed answers (Levenshtein distance)
//! - Shared types (Lesson, UserProgress, SrsData, Exercise, etc.)

pub mod algorithm;
pub mod error;
pub mod exercise;
pub mod matching;
pub mod types;

pub use algorithm::{
    baseline_interval, review_schedule, sm2::Sm2, QualityBand, ReviewOutcome, ReviewScheduler,
};
pub use error::{ExerciseError, Result};
pub use exercise::{
    ExerciseGenerator, ExerciseRegistry, FlashcardGenerator, MultipleChoiceGenerator,
    ScoreBreakdown, Validation,
};
pub use matching::{compare_answers, levenshtein_distance, normalized_similarity, MatchResult};
pub use types::{
    Answer, Exercise, ExerciseKind, ExerciseMetadata, ExerciseSource, GrammarPoint, Lesson,
    LessonContent, LessonFilter, LessonOverview, LessonQuery, LessonStatus, SrsData, UserProgress,
    UserStats, VocabularyItem,
};

//! Core types for lessons, progress and exercises.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExerciseError;

/// Lowest lesson difficulty.
pub const MIN_DIFFICULTY: u8 = 1;
/// Highest lesson difficulty.
pub const MAX_DIFFICULTY: u8 = 5;

/// Clamp a difficulty value into the supported 1-5 range.
pub fn clamp_difficulty(difficulty: u8) -> u8 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Word/translation pair used as exercise source material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub word: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
}

impl VocabularyItem {
    pub fn new(word: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            translation: translation.into(),
            difficulty: None,
        }
    }
}

/// Grammar rule with its answer and authored distractors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarPoint {
    pub rule: String,
    pub answer: String,
    #[serde(default)]
    pub distractors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
}

/// Lesson content used to build exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonContent {
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    pub grammar: Vec<GrammarPoint>,
}

/// Immutable content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub difficulty: u8,
    pub xp_reward: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub content: LessonContent,
    #[serde(default)]
    pub is_locked: bool,
}

/// Per-(user, lesson) learning status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Locked,
    Available,
    InProgress,
    Completed,
}

impl Default for LessonStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Available => "available",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// Spaced repetition state for one (user, lesson) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrsData {
    pub ease_factor: f64,
    pub interval_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: u32,
    /// Consecutive passing reviews.
    pub streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl Default for SrsData {
    fn default() -> Self {
        Self {
            ease_factor: 2.5,
            interval_days: 1,
            next_review: None,
            review_count: 0,
            streak: 0,
            last_reviewed: None,
        }
    }
}

impl SrsData {
    /// Whether a review is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map_or(false, |due| due <= now)
    }
}

/// A learner's response to one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub exercise_id: String,
    /// Raw answer text, or the choice index rendered as text.
    pub response: String,
    pub is_correct: bool,
    pub score: u32,
    pub time_spent_ms: u64,
    pub answered_at: DateTime<Utc>,
}

/// Progress record for one (user, lesson) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub lesson_id: String,
    pub status: LessonStatus,
    /// Best score seen, 0-100.
    pub score: u32,
    pub time_spent_ms: u64,
    #[serde(default)]
    pub answers: Vec<Answer>,
    pub srs: SrsData,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UserProgress {
    /// Fresh in-progress record with the given SRS state.
    pub fn start(user_id: &str, lesson_id: &str, srs: SrsData, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            lesson_id: lesson_id.to_string(),
            status: LessonStatus::InProgress,
            score: 0,
            time_spent_ms: 0,
            answers: Vec::new(),
            srs,
            started_at: now,
            completed_at: None,
            updated_at: now,
        }
    }
}

/// Aggregate per-user rollup updated on every completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub lessons_completed: u32,
    pub total_xp: u64,
    pub total_time_spent_ms: u64,
    pub total_reviews: u32,
    pub average_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// Exercise type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Flashcard,
    MultipleChoice,
}

impl ExerciseKind {
    /// Get the exercise type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flashcard => "flashcard",
            Self::MultipleChoice => "multiple_choice",
        }
    }
}

impl FromStr for ExerciseKind {
    type Err = ExerciseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flashcard" => Ok(Self::Flashcard),
            "multiple_choice" => Ok(Self::MultipleChoice),
            other => Err(ExerciseError::UnknownKind(other.to_string())),
        }
    }
}

/// Lesson content an exercise was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExerciseSource {
    Vocabulary { index: usize, word: String },
    Grammar { index: usize, rule: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseMetadata {
    pub source: ExerciseSource,
    pub difficulty: u8,
}

/// Generated exercise. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub lesson_id: String,
    pub kind: ExerciseKind,
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub metadata: ExerciseMetadata,
}

/// Content filter passed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_difficulty: Option<u8>,
    /// Case-insensitive substring match on the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
}

impl LessonFilter {
    pub fn matches(&self, lesson: &Lesson) -> bool {
        if let Some(difficulty) = self.difficulty {
            if lesson.difficulty != difficulty {
                return false;
            }
        }
        if let Some(max) = self.max_difficulty {
            if lesson.difficulty > max {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !lesson.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.iter().any(|id| id == &lesson.id) {
                return false;
            }
        }
        true
    }
}

/// Lesson list request: content filter plus progress-aware options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonQuery {
    #[serde(default)]
    pub filter: LessonFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LessonStatus>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Lesson list entry enriched with the learner's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonOverview {
    pub id: String,
    pub title: String,
    pub difficulty: u8,
    pub xp_reward: u32,
    pub prerequisites: Vec<String>,
    pub status: LessonStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unmet_prerequisites: Vec<String>,
}

//! Repository port for lessons, progress and aggregate stats.
//!
//! Storage is owned by the caller; the engine only talks to this trait.
//! Timeouts and retries are the implementation's concern.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::types::{Lesson, LessonFilter, UserProgress, UserStats};
use thiserror::Error;

pub use memory::InMemoryRepository;

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_lesson_by_id(&self, lesson_id: &str) -> Result<Option<Lesson>>;

    /// Lessons matching the filter, in authoring order.
    async fn get_lessons_by_filter(&self, filter: &LessonFilter) -> Result<Vec<Lesson>>;

    /// Insert or replace the progress record for (user, lesson).
    async fn update_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        progress: &UserProgress,
    ) -> Result<()>;

    async fn get_user_progress(&self, user_id: &str) -> Result<Vec<UserProgress>>;

    /// The lesson whose review is most overdue at `now`, if any.
    async fn get_next_review_lesson(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Lesson>>;

    async fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>>;

    async fn update_user_stats(&self, user_id: &str, stats: &UserStats) -> Result<()>;
}

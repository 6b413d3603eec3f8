//! In-memory repository used by tests and the demo binary.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::types::{Lesson, LessonFilter, UserProgress, UserStats};

use super::{Repository, Result};

#[derive(Default)]
struct MemoryState {
    /// Authoring order is preserved.
    lessons: Vec<Lesson>,
    progress: HashMap<(String, String), UserProgress>,
    stats: HashMap<String, UserStats>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lessons(lessons: Vec<Lesson>) -> Self {
        let repository = Self::new();
        for lesson in lessons {
            repository.insert_lesson(lesson);
        }
        repository
    }

    /// Insert a lesson, replacing any lesson with the same id in place.
    pub fn insert_lesson(&self, lesson: Lesson) {
        let mut state = self.write();
        match state.lessons.iter_mut().find(|l| l.id == lesson.id) {
            Some(existing) => *existing = lesson,
            None => state.lessons.push(lesson),
        }
    }

    pub fn lesson_count(&self) -> usize {
        self.read().lessons.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_lesson_by_id(&self, lesson_id: &str) -> Result<Option<Lesson>> {
        Ok(self.read().lessons.iter().find(|l| l.id == lesson_id).cloned())
    }

    async fn get_lessons_by_filter(&self, filter: &LessonFilter) -> Result<Vec<Lesson>> {
        Ok(self
            .read()
            .lessons
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn update_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        progress: &UserProgress,
    ) -> Result<()> {
        self.write().progress.insert(
            (user_id.to_string(), lesson_id.to_string()),
            progress.clone(),
        );
        Ok(())
    }

    async fn get_user_progress(&self, user_id: &str) -> Result<Vec<UserProgress>> {
        let state = self.read();
        let mut records: Vec<UserProgress> = state
            .progress
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, progress)| progress.clone())
            .collect();
        records.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.lesson_id.cmp(&b.lesson_id)));
        Ok(records)
    }

    async fn get_next_review_lesson(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Lesson>> {
        let state = self.read();
        let due = state
            .progress
            .iter()
            .filter(|((user, _), _)| user == user_id)
            .map(|(_, progress)| progress)
            .filter(|progress| progress.srs.is_due(now))
            .filter_map(|progress| {
                progress
                    .srs
                    .next_review
                    .map(|due| (due, progress.lesson_id.as_str()))
            })
            .min();

        Ok(due.and_then(|(_, lesson_id)| {
            state.lessons.iter().find(|l| l.id == lesson_id).cloned()
        }))
    }

    async fn get_user_stats(&self, user_id: &str) -> Result<Option<UserStats>> {
        Ok(self.read().stats.get(user_id).cloned())
    }

    async fn update_user_stats(&self, user_id: &str, stats: &UserStats) -> Result<()> {
        self.write()
            .stats
            .insert(user_id.to_string(), stats.clone());
        Ok(())
    }
}

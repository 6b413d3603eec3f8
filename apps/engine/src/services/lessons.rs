//! Lesson reads and the start/complete lifecycle.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lesson_core::types::{
    Answer, Lesson, LessonOverview, LessonQuery, LessonStatus, UserProgress, UserStats,
};

use super::LessonService;
use crate::cache::keys::{lesson_key, lesson_list_key, user_lessons_prefix};
use crate::cache::{get_json, set_json};
use crate::error::{EngineError, Result};
use crate::events::LessonEvent;

/// Upper bound for a lesson score.
pub const MAX_SCORE: u32 = 100;

impl LessonService {
    /// Lesson content by id.
    pub async fn get_lesson(&self, lesson_id: &str) -> Result<Lesson> {
        let lesson = self.load_lesson(lesson_id).await?;

        self.metrics.lesson_loaded();
        self.events.publish(LessonEvent::LessonLoaded {
            lesson_id: lesson.id.clone(),
        });
        Ok(lesson)
    }

    /// Lessons matching the query, enriched with the current learner's progress.
    pub async fn get_lessons(&self, query: &LessonQuery) -> Result<Vec<LessonOverview>> {
        let user = self.current_user()?;
        let cache_key = serde_json::to_string(query)
            .ok()
            .map(|json| lesson_list_key(&user.id, user.is_premium, &json));

        if let Some(key) = &cache_key {
            if let Some(cached) = get_json::<Vec<LessonOverview>>(self.cache.as_ref(), key) {
                tracing::debug!(user_id = %user.id, "Lesson list served from cache");
                return Ok(cached);
            }
        }

        let lessons = self.repository.get_lessons_by_filter(&query.filter).await?;
        let progress = self.repository.get_user_progress(&user.id).await?;
        let by_lesson = index_progress(&progress);

        let overviews: Vec<LessonOverview> = lessons
            .iter()
            .map(|lesson| overview(lesson, &by_lesson, user.is_premium))
            .filter(|entry| query.status.map_or(true, |status| entry.status == status))
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        if let Some(key) = &cache_key {
            set_json(
                self.cache.as_ref(),
                key,
                &overviews,
                self.cache_settings.list_ttl,
            );
        }

        tracing::debug!(user_id = %user.id, count = overviews.len(), "Lesson list loaded");
        Ok(overviews)
    }

    /// Begin or re-enter a lesson.
    ///
    /// A lesson already in progress is returned untouched. A completed lesson
    /// goes back to in progress with its SRS data and best score intact.
    pub async fn start_lesson(&self, lesson_id: &str) -> Result<UserProgress> {
        let user = self.current_user()?;
        let lesson = self.load_lesson(lesson_id).await?;
        let progress = self.repository.get_user_progress(&user.id).await?;
        let existing = progress.iter().find(|p| p.lesson_id == lesson.id).cloned();

        if existing.is_none() && !user.is_premium {
            let unmet = unmet_prerequisites(&lesson, &index_progress(&progress));
            if !unmet.is_empty() {
                tracing::info!(
                    user_id = %user.id,
                    lesson_id = %lesson.id,
                    unmet = ?unmet,
                    "Lesson locked"
                );
                return Err(EngineError::LessonLocked {
                    lesson_id: lesson.id,
                    unmet_prerequisites: unmet,
                });
            }
        }

        let now = Utc::now();
        let (record, resumed) = match existing {
            Some(record) if record.status == LessonStatus::InProgress => return Ok(record),
            Some(mut record) => {
                record.status = LessonStatus::InProgress;
                record.updated_at = now;
                let resumed = record.completed_at.is_some();
                (record, resumed)
            }
            None => (
                UserProgress::start(&user.id, &lesson.id, self.scheduler.initial_state(), now),
                false,
            ),
        };

        self.repository
            .update_lesson_progress(&user.id, &lesson.id, &record)
            .await?;
        self.invalidate_lesson_lists(&user.id);

        tracing::info!(user_id = %user.id, lesson_id = %lesson.id, resumed, "Lesson started");
        self.metrics.lesson_started();
        self.events.publish(LessonEvent::LessonStarted {
            user_id: user.id,
            lesson_id: lesson.id,
            resumed,
        });
        Ok(record)
    }

    /// Record a completed attempt and schedule the next review.
    ///
    /// `score` is clamped to 0-100. The stored score is the best seen so far.
    /// Stats rollup failures are logged and do not fail the completion.
    pub async fn complete_lesson(
        &self,
        lesson_id: &str,
        score: u32,
        time_spent_ms: u64,
        answers: Vec<Answer>,
    ) -> Result<UserProgress> {
        let user = self.current_user()?;
        let lesson = self.load_lesson(lesson_id).await?;
        let score = score.min(MAX_SCORE);

        let mut progress = self
            .repository
            .get_user_progress(&user.id)
            .await?
            .into_iter()
            .find(|p| p.lesson_id == lesson.id)
            .ok_or_else(|| EngineError::ProgressNotFound {
                user_id: user.id.clone(),
                lesson_id: lesson.id.clone(),
            })?;

        let first_completion = progress.completed_at.is_none();
        let now = Utc::now();

        progress.srs = self
            .scheduler
            .schedule(&progress.srs, lesson.difficulty, score as f64, now);
        progress.status = LessonStatus::Completed;
        progress.score = progress.score.max(score);
        progress.time_spent_ms = progress.time_spent_ms.saturating_add(time_spent_ms);
        progress.answers.extend(answers);
        progress.completed_at = Some(now);
        progress.updated_at = now;

        self.repository
            .update_lesson_progress(&user.id, &lesson.id, &progress)
            .await?;
        self.invalidate_lesson_lists(&user.id);

        self.roll_up_stats(&user.id, &lesson, score, time_spent_ms, first_completion, now)
            .await;

        tracing::info!(
            user_id = %user.id,
            lesson_id = %lesson.id,
            score,
            best_score = progress.score,
            interval_days = progress.srs.interval_days,
            scheduler = self.scheduler.name(),
            "Lesson completed"
        );
        self.metrics.lesson_completed();
        self.events.publish(LessonEvent::LessonCompleted {
            user_id: user.id,
            lesson_id: lesson.id,
            score,
            best_score: progress.score,
            interval_days: progress.srs.interval_days,
            review_count: progress.srs.review_count,
            next_review: progress.srs.next_review.unwrap_or(now),
        });
        Ok(progress)
    }

    /// The learner's most overdue review, if any is due now.
    pub async fn get_next_review_lesson(&self) -> Result<Option<Lesson>> {
        let user = self.current_user()?;
        let lesson = self
            .repository
            .get_next_review_lesson(&user.id, Utc::now())
            .await?;
        Ok(lesson)
    }

    pub(super) async fn load_lesson(&self, lesson_id: &str) -> Result<Lesson> {
        let key = lesson_key(lesson_id);
        if let Some(lesson) = get_json::<Lesson>(self.cache.as_ref(), &key) {
            return Ok(lesson);
        }

        let lesson = self
            .repository
            .get_lesson_by_id(lesson_id)
            .await?
            .ok_or_else(|| EngineError::LessonNotFound {
                lesson_id: lesson_id.to_string(),
            })?;

        set_json(
            self.cache.as_ref(),
            &key,
            &lesson,
            self.cache_settings.lesson_ttl,
        );
        Ok(lesson)
    }

    fn invalidate_lesson_lists(&self, user_id: &str) {
        let removed = self.cache.invalidate_prefix(&user_lessons_prefix(user_id));
        tracing::debug!(user_id, removed, "Lesson lists invalidated");
    }

    async fn roll_up_stats(
        &self,
        user_id: &str,
        lesson: &Lesson,
        score: u32,
        time_spent_ms: u64,
        first_completion: bool,
        now: DateTime<Utc>,
    ) {
        let current = match self.repository.get_user_stats(user_id).await {
            Ok(stats) => stats.unwrap_or_default(),
            Err(e) => {
                self.metrics.stats_failed();
                tracing::warn!(user_id, lesson_id = %lesson.id, error = %e, "Failed to read user stats");
                return;
            }
        };

        let stats = roll_up(current, lesson, score, time_spent_ms, first_completion, now);
        if let Err(e) = self.repository.update_user_stats(user_id, &stats).await {
            self.metrics.stats_failed();
            tracing::warn!(user_id, lesson_id = %lesson.id, error = %e, "Failed to update user stats");
        }
    }
}

fn index_progress(progress: &[UserProgress]) -> HashMap<&str, &UserProgress> {
    progress.iter().map(|p| (p.lesson_id.as_str(), p)).collect()
}

/// Completed at least once, even if re-entered since.
fn has_completed(progress: &UserProgress) -> bool {
    progress.status == LessonStatus::Completed || progress.completed_at.is_some()
}

fn unmet_prerequisites(lesson: &Lesson, progress: &HashMap<&str, &UserProgress>) -> Vec<String> {
    lesson
        .prerequisites
        .iter()
        .filter(|id| !progress.get(id.as_str()).map_or(false, |p| has_completed(p)))
        .cloned()
        .collect()
}

fn overview(
    lesson: &Lesson,
    progress: &HashMap<&str, &UserProgress>,
    is_premium: bool,
) -> LessonOverview {
    let record = progress.get(lesson.id.as_str()).copied();
    let unmet = unmet_prerequisites(lesson, progress);

    let status = match record {
        Some(p) => p.status,
        None if !unmet.is_empty() && !is_premium => LessonStatus::Locked,
        None => LessonStatus::Available,
    };

    LessonOverview {
        id: lesson.id.clone(),
        title: lesson.title.clone(),
        difficulty: lesson.difficulty,
        xp_reward: lesson.xp_reward,
        prerequisites: lesson.prerequisites.clone(),
        status,
        best_score: record.filter(|p| has_completed(p)).map(|p| p.score),
        next_review: record.and_then(|p| p.srs.next_review),
        unmet_prerequisites: unmet,
    }
}

/// Fold one completion into the learner's aggregate stats.
fn roll_up(
    mut stats: UserStats,
    lesson: &Lesson,
    score: u32,
    time_spent_ms: u64,
    first_completion: bool,
    now: DateTime<Utc>,
) -> UserStats {
    if first_completion {
        stats.lessons_completed += 1;
        stats.total_xp += u64::from(lesson.xp_reward);
    }
    let reviews = f64::from(stats.total_reviews);
    stats.average_score = (stats.average_score * reviews + f64::from(score)) / (reviews + 1.0);
    stats.total_reviews += 1;
    stats.total_time_spent_ms = stats.total_time_spent_ms.saturating_add(time_spent_ms);
    stats.last_activity_at = Some(now);
    stats
}

//! Operation counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::CacheStats;

#[derive(Debug, Default)]
pub struct EngineMetrics {
    lessons_loaded: AtomicU64,
    lessons_started: AtomicU64,
    lessons_completed: AtomicU64,
    exercises_generated: AtomicU64,
    answers_validated: AtomicU64,
    answers_correct: AtomicU64,
    stats_failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lessons_loaded: u64,
    pub lessons_started: u64,
    pub lessons_completed: u64,
    pub exercises_generated: u64,
    pub answers_validated: u64,
    pub answers_correct: u64,
    /// Stats rollups that failed and were skipped.
    pub stats_failures: u64,
    pub cache: CacheStats,
}

impl EngineMetrics {
    pub(crate) fn lesson_loaded(&self) {
        self.lessons_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn lesson_started(&self) {
        self.lessons_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn lesson_completed(&self) {
        self.lessons_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn exercises_generated(&self, count: usize) {
        self.exercises_generated
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn answer_validated(&self, is_correct: bool) {
        self.answers_validated.fetch_add(1, Ordering::Relaxed);
        if is_correct {
            self.answers_correct.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn stats_failed(&self) {
        self.stats_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, cache: CacheStats) -> MetricsSnapshot {
        MetricsSnapshot {
            lessons_loaded: self.lessons_loaded.load(Ordering::Relaxed),
            lessons_started: self.lessons_started.load(Ordering::Relaxed),
            lessons_completed: self.lessons_completed.load(Ordering::Relaxed),
            exercises_generated: self.exercises_generated.load(Ordering::Relaxed),
            answers_validated: self.answers_validated.load(Ordering::Relaxed),
            answers_correct: self.answers_correct.load(Ordering::Relaxed),
            stats_failures: self.stats_failures.load(Ordering::Relaxed),
            cache,
        }
    }
}

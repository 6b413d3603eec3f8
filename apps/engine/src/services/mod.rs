//! Lesson orchestration.
//!
//! `LessonService` ties the repository, cache, session, scheduler and
//! exercise generators together. Operations are split by concern:
//! - `lessons`: lesson reads and the start/complete lifecycle
//! - `exercises`: exercise generation and answer validation
//! - `metrics`: operation counters

pub mod exercises;
pub mod lessons;
pub mod metrics;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lesson_core::algorithm::sm2::Sm2;
use lesson_core::exercise::ExerciseRegistry;
use lesson_core::ReviewScheduler;

use crate::cache::keys::{LESSON_LIST_TTL, LESSON_TTL};
use crate::cache::{CacheProvider, MemoryCache};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EventPublisher, TracingPublisher};
use crate::repository::Repository;
use crate::session::{SessionStore, UserContext};

use exercises::PendingExercises;

pub use exercises::{ExerciseResult, DEFAULT_PENDING_CAPACITY};
pub use metrics::{EngineMetrics, MetricsSnapshot};

/// Cache lifetimes for lesson content and per-user lesson lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub lesson_ttl: Duration,
    pub list_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            lesson_ttl: LESSON_TTL,
            list_ttl: LESSON_LIST_TTL,
        }
    }
}

pub struct LessonService {
    repository: Arc<dyn Repository>,
    cache: Arc<dyn CacheProvider>,
    session: Arc<dyn SessionStore>,
    events: Arc<dyn EventPublisher>,
    scheduler: Arc<dyn ReviewScheduler>,
    registry: ExerciseRegistry,
    cache_settings: CacheSettings,
    pending: Mutex<PendingExercises>,
    metrics: EngineMetrics,
}

impl LessonService {
    /// Service with an in-memory cache, log-only events, default SM-2 and
    /// entropy-seeded generators.
    pub fn new(repository: Arc<dyn Repository>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            repository,
            cache: Arc::new(MemoryCache::new()),
            session,
            events: Arc::new(TracingPublisher),
            scheduler: Arc::new(Sm2::default()),
            registry: ExerciseRegistry::with_defaults(
                None,
                lesson_core::matching::DEFAULT_FUZZY_THRESHOLD,
            ),
            cache_settings: CacheSettings::default(),
            pending: Mutex::new(PendingExercises::with_capacity(DEFAULT_PENDING_CAPACITY)),
            metrics: EngineMetrics::default(),
        }
    }

    /// Service wired from configuration.
    pub fn from_config(
        config: &EngineConfig,
        repository: Arc<dyn Repository>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self::new(repository, session)
            .with_scheduler(Arc::new(config.scheduler.clone()))
            .with_registry(ExerciseRegistry::with_defaults(
                config.exercise_seed,
                config.fuzzy_threshold,
            ))
            .with_cache_settings(CacheSettings {
                lesson_ttl: config.lesson_cache_ttl,
                list_ttl: config.lesson_list_cache_ttl,
            })
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn ReviewScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_registry(mut self, registry: ExerciseRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Cap on exercises awaiting an answer; the oldest are dropped first.
    pub fn with_pending_capacity(mut self, capacity: usize) -> Self {
        self.pending = Mutex::new(PendingExercises::with_capacity(capacity));
        self
    }

    pub fn with_cache_settings(mut self, settings: CacheSettings) -> Self {
        self.cache_settings = settings;
        self
    }

    /// Snapshot of operation counters and cache statistics.
    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.cache.stats())
    }

    /// Drop every cache entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Cache cleared");
    }

    fn current_user(&self) -> Result<UserContext> {
        self.session
            .current_user()
            .ok_or(EngineError::UserNotAuthenticated)
    }

    fn pending(&self) -> MutexGuard<'_, PendingExercises> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

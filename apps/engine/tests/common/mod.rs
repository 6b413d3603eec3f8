//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring a service over an in-memory repository
//! - RecordingPublisher capturing lesson events
//! - FlakyStatsRepository whose stats calls fail

#![allow(dead_code)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use lesson_core::exercise::ExerciseRegistry;
use lesson_core::types::{Lesson, LessonFilter, UserProgress, UserStats};
use lesson_engine::cache::{CacheProvider, MemoryCache};
use lesson_engine::events::{EventPublisher, LessonEvent};
use lesson_engine::repository::{self, InMemoryRepository, Repository, RepositoryError};
use lesson_engine::services::LessonService;
use lesson_engine::session::{LocalSession, UserContext};

pub const LEARNER: &str = "learner-1";
pub const SEED: u64 = 7;

/// Captures every published event.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<LessonEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<LessonEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: LessonEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Delegates to an in-memory repository but fails every stats call.
pub struct FlakyStatsRepository {
    pub inner: InMemoryRepository,
}

#[async_trait]
impl Repository for FlakyStatsRepository {
    async fn get_lesson_by_id(&self, lesson_id: &str) -> repository::Result<Option<Lesson>> {
        self.inner.get_lesson_by_id(lesson_id).await
    }

    async fn get_lessons_by_filter(&self, filter: &LessonFilter) -> repository::Result<Vec<Lesson>> {
        self.inner.get_lessons_by_filter(filter).await
    }

    async fn update_lesson_progress(
        &self,
        user_id: &str,
        lesson_id: &str,
        progress: &UserProgress,
    ) -> repository::Result<()> {
        self.inner
            .update_lesson_progress(user_id, lesson_id, progress)
            .await
    }

    async fn get_user_progress(&self, user_id: &str) -> repository::Result<Vec<UserProgress>> {
        self.inner.get_user_progress(user_id).await
    }

    async fn get_next_review_lesson(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> repository::Result<Option<Lesson>> {
        self.inner.get_next_review_lesson(user_id, now).await
    }

    async fn get_user_stats(&self, _user_id: &str) -> repository::Result<Option<UserStats>> {
        Err(RepositoryError::Unavailable("stats store offline".to_string()))
    }

    async fn update_user_stats(&self, _user_id: &str, _stats: &UserStats) -> repository::Result<()> {
        Err(RepositoryError::Unavailable("stats store offline".to_string()))
    }
}

/// Test context wiring a service with a seeded registry and a signed-in learner.
pub struct TestContext {
    pub service: LessonService,
    pub repository: Arc<InMemoryRepository>,
    pub session: Arc<LocalSession>,
    pub events: Arc<RecordingPublisher>,
}

impl TestContext {
    /// Course fixtures, in-memory cache, non-premium learner.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(MemoryCache::new()))
    }

    pub fn with_cache(cache: Arc<dyn CacheProvider>) -> Self {
        let repository = Arc::new(InMemoryRepository::with_lessons(fixtures::course()));
        let session = Arc::new(LocalSession::new(UserContext::new(LEARNER)));
        let events = Arc::new(RecordingPublisher::default());

        let service = build_service(repository.clone(), session.clone(), events.clone())
            .with_cache(cache);

        Self {
            service,
            repository,
            session,
            events,
        }
    }

    pub fn sign_in_premium(&self) {
        self.session.sign_in(UserContext::premium(LEARNER));
    }

    /// Stored progress record for the learner.
    pub async fn progress(&self, lesson_id: &str) -> Option<UserProgress> {
        self.repository
            .get_user_progress(LEARNER)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.lesson_id == lesson_id)
    }

    pub async fn stats(&self) -> Option<UserStats> {
        self.repository.get_user_stats(LEARNER).await.unwrap()
    }
}

/// Service over a repository whose stats calls always fail.
pub fn flaky_stats_service() -> (LessonService, Arc<FlakyStatsRepository>) {
    let repository = Arc::new(FlakyStatsRepository {
        inner: InMemoryRepository::with_lessons(fixtures::course()),
    });
    let session = Arc::new(LocalSession::new(UserContext::new(LEARNER)));
    let service = build_service(
        repository.clone(),
        session,
        Arc::new(RecordingPublisher::default()),
    );
    (service, repository)
}

fn build_service(
    repository: Arc<dyn Repository>,
    session: Arc<LocalSession>,
    events: Arc<RecordingPublisher>,
) -> LessonService {
    LessonService::new(repository, session)
        .with_events(events)
        .with_registry(ExerciseRegistry::with_defaults(Some(SEED), 0.8))
}

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod repository;
pub mod services;
pub mod session;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use lesson_core::types::{Lesson, LessonQuery};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::EngineConfig;
use crate::repository::InMemoryRepository;
use crate::services::LessonService;
use crate::session::LocalSession;

pub use crate::error::{EngineError, Result};

/// Install the global tracing subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Read a JSON array of lessons.
pub fn load_lessons(path: &Path) -> anyhow::Result<Vec<Lesson>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading lessons from {}", path.display()))?;
    let lessons = serde_json::from_str(&raw)
        .with_context(|| format!("parsing lessons in {}", path.display()))?;
    Ok(lessons)
}

/// Wire a service over an in-memory repository seeded from `LESSONS_FILE`.
pub fn bootstrap(config: &EngineConfig) -> anyhow::Result<(LessonService, Arc<InMemoryRepository>)> {
    let lessons = match &config.lessons_file {
        Some(path) => load_lessons(path)?,
        None => Vec::new(),
    };
    let repository = Arc::new(InMemoryRepository::with_lessons(lessons));
    let session = match &config.learner {
        Some(user) => LocalSession::new(user.clone()),
        None => LocalSession::anonymous(),
    };

    let service = LessonService::from_config(config, repository.clone(), Arc::new(session));
    Ok((service, repository))
}

pub async fn run() -> anyhow::Result<()> {
    let config = EngineConfig::from_env()?;
    init_tracing();

    let (service, repository) = bootstrap(&config)?;
    tracing::info!(lessons = repository.lesson_count(), "Lesson engine ready");

    if config.learner.is_none() {
        tracing::warn!("LEARNER_ID not set; nothing to show");
        return Ok(());
    }

    for entry in service.get_lessons(&LessonQuery::default()).await? {
        tracing::info!(
            lesson_id = %entry.id,
            title = %entry.title,
            status = entry.status.as_str(),
            best_score = ?entry.best_score,
            "Lesson"
        );
    }

    match service.get_next_review_lesson().await? {
        Some(lesson) => tracing::info!(lesson_id = %lesson.id, title = %lesson.title, "Next review"),
        None => tracing::info!("No reviews due"),
    }

    Ok(())
}


//! Lesson lifecycle notifications.
//!
//! Publishing is fire-and-forget: publishers never fail the operation that
//! emitted the event.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LessonEvent {
    LessonLoaded {
        lesson_id: String,
    },
    LessonStarted {
        user_id: String,
        lesson_id: String,
        /// Re-entry of a previously completed lesson.
        resumed: bool,
    },
    LessonCompleted {
        user_id: String,
        lesson_id: String,
        score: u32,
        best_score: u32,
        interval_days: u32,
        review_count: u32,
        next_review: DateTime<Utc>,
    },
}

impl LessonEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LessonLoaded { .. } => "lesson/loaded",
            Self::LessonStarted { .. } => "lesson/started",
            Self::LessonCompleted { .. } => "lesson/completed",
        }
    }
}

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: LessonEvent);
}

/// Writes every event to the log.
#[derive(Debug, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: LessonEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_default();
        tracing::info!(event = event.name(), %payload, "lesson event");
    }
}

/// Fans events out to any number of in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<LessonEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LessonEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for BroadcastPublisher {
    fn publish(&self, event: LessonEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }
}

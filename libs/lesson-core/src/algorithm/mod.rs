//! Review scheduling.
//!
//! Scheduling is two-stage: a static baseline schedule per difficulty supplies
//! the previous interval, and the scheduler modulates it by performance and
//! the item's ease factor.

pub mod sm2;

use crate::types::SrsData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse classification of a 0-100 performance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityBand {
    /// Whether the band counts towards the success streak.
    pub fn is_passing(self) -> bool {
        !matches!(self, Self::Poor)
    }
}

/// Result of one scheduler step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub interval_days: u32,
    pub ease_factor: f64,
    pub quality: QualityBand,
}

/// Baseline review intervals in days, indexed by prior review count.
/// Row `d - 1` holds the schedule for difficulty `d`.
const REVIEW_SCHEDULES: [&[u32]; 5] = [
    &[1, 3, 7, 14, 30, 60, 120],
    &[1, 3, 6, 12, 25, 50, 100],
    &[1, 2, 5, 10, 21, 45, 90],
    &[1, 2, 4, 8, 16, 32, 64],
    &[1, 1, 3, 6, 12, 24, 48],
];

/// Fixed baseline schedule for a difficulty. Out-of-range difficulties clamp.
pub fn review_schedule(difficulty: u8) -> &'static [u32] {
    let index = crate::types::clamp_difficulty(difficulty) as usize - 1;
    REVIEW_SCHEDULES[index]
}

/// Baseline interval for an item that has been reviewed `review_count` times.
pub fn baseline_interval(difficulty: u8, review_count: u32) -> u32 {
    let schedule = review_schedule(difficulty);
    let index = (review_count as usize).min(schedule.len() - 1);
    schedule[index]
}

/// Trait for spaced repetition schedulers.
pub trait ReviewScheduler: Send + Sync {
    /// Scheduler identifier.
    fn name(&self) -> &'static str;

    /// Classify a performance score.
    fn quality(&self, performance: f64) -> QualityBand;

    /// Next interval and ease factor after a review.
    fn next_review(&self, previous_interval: u32, ease_factor: f64, performance: f64)
        -> ReviewOutcome;

    /// Initial SRS state for a newly started lesson.
    fn initial_state(&self) -> SrsData;

    /// Apply one completed review to `srs`.
    fn schedule(
        &self,
        srs: &SrsData,
        difficulty: u8,
        performance: f64,
        now: DateTime<Utc>,
    ) -> SrsData {
        let baseline = baseline_interval(difficulty, srs.review_count);
        let outcome = self.next_review(baseline, srs.ease_factor, performance);

        SrsData {
            ease_factor: outcome.ease_factor,
            interval_days: outcome.interval_days,
            next_review: Some(now + chrono::Duration::days(outcome.interval_days as i64)),
            review_count: srs.review_count + 1,
            streak: if outcome.quality.is_passing() {
                srs.streak + 1
            } else {
                0
            },
            last_reviewed: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_difficulty_has_a_schedule() {
        for difficulty in 1..=5 {
            assert!(!review_schedule(difficulty).is_empty());
        }
    }

    #[test]
    fn harder_lessons_review_sooner() {
        let easy = review_schedule(1);
        let hard = review_schedule(5);
        assert!(hard.last() < easy.last());
    }

    #[test]
    fn out_of_range_difficulty_clamps() {
        assert_eq!(review_schedule(0), review_schedule(1));
        assert_eq!(review_schedule(9), review_schedule(5));
    }

    #[test]
    fn baseline_clamps_to_last_entry() {
        let schedule = review_schedule(3);
        let last = *schedule.last().unwrap();
        assert_eq!(baseline_interval(3, schedule.len() as u32 - 1), last);
        assert_eq!(baseline_interval(3, 1_000), last);
        assert_eq!(baseline_interval(3, 0), schedule[0]);
    }
}

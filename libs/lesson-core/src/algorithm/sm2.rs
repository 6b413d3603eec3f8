//! SM-2 review scheduler.
//!
//! Based on SuperMemo 2, driven by a 0-100 performance score instead of a
//! discrete rating.

use super::{QualityBand, ReviewOutcome, ReviewScheduler};
use crate::types::SrsData;

/// Interval multiplier applied to fair reviews.
const FAIR_INTERVAL_FACTOR: f64 = 0.7;

/// SM-2 scheduler with configurable parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sm2 {
    pub passing_threshold: f64,
    pub excellent_threshold: f64,
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub maximum_ease: f64,
    pub ease_step: f64,
    pub interval_modifier: f64,
    pub maximum_interval: u32,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            passing_threshold: 60.0,
            excellent_threshold: 90.0,
            initial_ease: 2.5,
            minimum_ease: 1.3,
            maximum_ease: 3.0,
            ease_step: 0.1,
            interval_modifier: 1.0,
            maximum_interval: 36500,
        }
    }
}

impl ReviewScheduler for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn quality(&self, performance: f64) -> QualityBand {
        let performance = clamp_performance(performance);
        if performance < self.passing_threshold {
            QualityBand::Poor
        } else if performance < self.good_threshold() {
            QualityBand::Fair
        } else if performance < self.excellent_threshold {
            QualityBand::Good
        } else {
            QualityBand::Excellent
        }
    }

    fn next_review(
        &self,
        previous_interval: u32,
        ease_factor: f64,
        performance: f64,
    ) -> ReviewOutcome {
        let quality = self.quality(performance);
        let ease = self.clamp_ease(ease_factor);
        let previous = previous_interval.max(1) as f64;

        let (interval, ease_adj) = match quality {
            QualityBand::Poor => (1.0, -self.ease_step),
            QualityBand::Fair => (previous * FAIR_INTERVAL_FACTOR, -self.ease_step / 2.0),
            QualityBand::Good => (previous * ease * self.interval_modifier, 0.0),
            QualityBand::Excellent => (previous * ease * self.interval_modifier, self.ease_step),
        };

        ReviewOutcome {
            interval_days: self.clamp_interval(interval),
            ease_factor: round_ease(self.clamp_ease(ease + ease_adj)),
            quality,
        }
    }

    fn initial_state(&self) -> SrsData {
        SrsData {
            ease_factor: self.clamp_ease(self.initial_ease),
            ..SrsData::default()
        }
    }
}

impl Sm2 {
    /// Lower bound of the good band: midway between passing and excellent.
    pub fn good_threshold(&self) -> f64 {
        (self.passing_threshold + self.excellent_threshold) / 2.0
    }

    /// NaN bounds are ignored instead of panicking.
    fn clamp_ease(&self, ease: f64) -> f64 {
        let ease = if ease.is_nan() { self.initial_ease } else { ease };
        ease.max(self.minimum_ease).min(self.maximum_ease)
    }

    fn clamp_interval(&self, interval: f64) -> u32 {
        let rounded = interval.round();
        if rounded.is_nan() || rounded < 1.0 {
            1
        } else if rounded >= self.maximum_interval as f64 {
            self.maximum_interval.max(1)
        } else {
            rounded as u32
        }
    }
}

fn clamp_performance(performance: f64) -> f64 {
    if performance.is_nan() {
        0.0
    } else {
        performance.clamp(0.0, 100.0)
    }
}

// Two decimals keeps repeated half steps from drifting.
fn round_ease(ease: f64) -> f64 {
    (ease * 100.0).round() / 100.0
}

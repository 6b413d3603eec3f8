//! Engine configuration from environment variables.
//!
//! Recognised variables (all optional):
//! - SRS_PASSING_THRESHOLD, SRS_EXCELLENT_THRESHOLD: performance band cutoffs
//! - SRS_MIN_EASE, SRS_MAX_EASE: ease factor bounds
//! - SRS_INTERVAL_MODIFIER: multiplier on growing intervals
//! - LESSON_CACHE_TTL_SECS, LESSON_LIST_CACHE_TTL_SECS: cache lifetimes
//! - FUZZY_THRESHOLD: similarity a typed answer must exceed
//! - EXERCISE_SEED: fixed seed for reproducible exercises
//! - LESSONS_FILE: JSON lesson list loaded by the binary
//! - LEARNER_ID, LEARNER_PREMIUM: learner the binary acts for

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lesson_core::algorithm::sm2::Sm2;
use lesson_core::matching::DEFAULT_FUZZY_THRESHOLD;
use thiserror::Error;

use crate::cache::keys::{LESSON_LIST_TTL, LESSON_TTL};
use crate::session::UserContext;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scheduler: Sm2,
    pub lesson_cache_ttl: Duration,
    pub lesson_list_cache_ttl: Duration,
    pub fuzzy_threshold: f64,
    pub exercise_seed: Option<u64>,
    pub lessons_file: Option<PathBuf>,
    pub learner: Option<UserContext>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scheduler: Sm2::default(),
            lesson_cache_ttl: LESSON_TTL,
            lesson_list_cache_ttl: LESSON_LIST_TTL,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            exercise_seed: None,
            lessons_file: None,
            learner: None,
        }
    }
}

impl EngineConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let scheduler = &mut config.scheduler;

        if let Some(v) = parse(&lookup, "SRS_PASSING_THRESHOLD")? {
            scheduler.passing_threshold = v;
        }
        if let Some(v) = parse(&lookup, "SRS_EXCELLENT_THRESHOLD")? {
            scheduler.excellent_threshold = v;
        }
        if let Some(v) = parse(&lookup, "SRS_MIN_EASE")? {
            scheduler.minimum_ease = v;
        }
        if let Some(v) = parse(&lookup, "SRS_MAX_EASE")? {
            scheduler.maximum_ease = v;
        }
        if let Some(v) = parse(&lookup, "SRS_INTERVAL_MODIFIER")? {
            scheduler.interval_modifier = v;
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "LESSON_CACHE_TTL_SECS")? {
            config.lesson_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64, _>(&lookup, "LESSON_LIST_CACHE_TTL_SECS")? {
            config.lesson_list_cache_ttl = Duration::from_secs(secs);
        }
        if let Some(v) = parse(&lookup, "FUZZY_THRESHOLD")? {
            config.fuzzy_threshold = v;
        }
        config.exercise_seed = parse(&lookup, "EXERCISE_SEED")?;
        config.lessons_file = lookup("LESSONS_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Some(id) = lookup("LEARNER_ID").filter(|id| !id.trim().is_empty()) {
            let is_premium = parse_flag(&lookup, "LEARNER_PREMIUM")?;
            config.learner = Some(UserContext { id, is_premium });
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scheduler;
        let numbers = [
            ("SRS_PASSING_THRESHOLD", s.passing_threshold),
            ("SRS_EXCELLENT_THRESHOLD", s.excellent_threshold),
            ("SRS_MIN_EASE", s.minimum_ease),
            ("SRS_MAX_EASE", s.maximum_ease),
            ("SRS_INTERVAL_MODIFIER", s.interval_modifier),
            ("FUZZY_THRESHOLD", self.fuzzy_threshold),
        ];
        if let Some(&(key, value)) = numbers.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid {
                key,
                value: value.to_string(),
            });
        }
        if !(0.0..=100.0).contains(&s.passing_threshold)
            || !(0.0..=100.0).contains(&s.excellent_threshold)
            || s.passing_threshold >= s.excellent_threshold
        {
            return Err(ConfigError::Inconsistent(format!(
                "thresholds must satisfy 0 <= passing ({}) < excellent ({}) <= 100",
                s.passing_threshold, s.excellent_threshold
            )));
        }
        if s.minimum_ease <= 0.0 || s.minimum_ease > s.maximum_ease {
            return Err(ConfigError::Inconsistent(format!(
                "ease bounds must satisfy 0 < min ({}) <= max ({})",
                s.minimum_ease, s.maximum_ease
            )));
        }
        if s.interval_modifier <= 0.0 {
            return Err(ConfigError::Inconsistent(format!(
                "interval modifier must be positive, got {}",
                s.interval_modifier
            )));
        }
        if !(0.0..1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::Inconsistent(format!(
                "fuzzy threshold must be in [0, 1), got {}",
                self.fuzzy_threshold
            )));
        }
        Ok(())
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" => Ok(false),
            "1" | "true" | "yes" => Ok(true),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

//! Exercise generation and validation.
//!
//! Generators own a seedable RNG so a fixed seed reproduces the same
//! exercises, option orders and exercise ids.

pub mod flashcard;
pub mod multiple_choice;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ExerciseError, Result};
use crate::types::{Exercise, ExerciseKind, Lesson};

pub use flashcard::FlashcardGenerator;
pub use multiple_choice::MultipleChoiceGenerator;

/// Outcome of checking an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub is_correct: bool,
    pub score: u32,
}

/// Score with time bonus applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub is_correct: bool,
    pub score: u32,
    /// Bonus earned by the response time, reported even for wrong answers.
    pub time_bonus: f64,
    /// `score`, plus `time_bonus` when correct, clamped to 0-100.
    pub total: u32,
}

/// Trait for exercise strategies.
pub trait ExerciseGenerator: Send + Sync {
    /// Exercise type produced by this generator.
    fn kind(&self) -> ExerciseKind;

    /// Build up to `count` exercises from the lesson content.
    fn generate(&self, lesson: &Lesson, count: usize) -> Result<Vec<Exercise>>;

    /// Check an answer. Malformed answers are incorrect, never an error.
    fn validate(&self, exercise: &Exercise, answer: &str) -> Validation;

    /// Bonus points for answering within `time_spent_ms`.
    fn time_bonus(&self, time_spent_ms: u64) -> f64;

    /// Validate and apply the time bonus. Only correct answers count it.
    fn score(&self, exercise: &Exercise, answer: &str, time_spent_ms: u64) -> ScoreBreakdown {
        let validation = self.validate(exercise, answer);
        let time_bonus = self.time_bonus(time_spent_ms);
        let counted = if validation.is_correct { time_bonus } else { 0.0 };
        let total = (validation.score as f64 + counted).round().clamp(0.0, 100.0) as u32;

        ScoreBreakdown {
            is_correct: validation.is_correct,
            score: validation.score,
            time_bonus,
            total,
        }
    }
}

/// Generators keyed by their exercise type name.
#[derive(Default)]
pub struct ExerciseRegistry {
    generators: HashMap<&'static str, Box<dyn ExerciseGenerator>>,
}

impl ExerciseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the flashcard and multiple-choice generators.
    ///
    /// With a seed, generation is reproducible; without one each generator
    /// seeds itself from OS entropy.
    pub fn with_defaults(seed: Option<u64>, fuzzy_threshold: f64) -> Self {
        let mut registry = Self::new();
        match seed {
            Some(seed) => {
                registry.register(Box::new(
                    FlashcardGenerator::seeded(seed).with_fuzzy_threshold(fuzzy_threshold),
                ));
                registry.register(Box::new(MultipleChoiceGenerator::seeded(
                    seed.wrapping_add(1),
                )));
            }
            None => {
                registry.register(Box::new(
                    FlashcardGenerator::from_entropy().with_fuzzy_threshold(fuzzy_threshold),
                ));
                registry.register(Box::new(MultipleChoiceGenerator::from_entropy()));
            }
        }
        registry
    }

    /// Register a generator, replacing any previous one of the same kind.
    pub fn register(&mut self, generator: Box<dyn ExerciseGenerator>) {
        self.generators.insert(generator.kind().as_str(), generator);
    }

    /// Look up a generator by type name.
    pub fn get(&self, name: &str) -> Result<&dyn ExerciseGenerator> {
        self.generators
            .get(name)
            .map(|g| g.as_ref())
            .ok_or_else(|| ExerciseError::UnknownKind(name.to_string()))
    }

    /// Registered type names, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.generators.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }
}

/// RNG shared by a generator across `&self` calls.
pub(crate) struct SharedRng(Mutex<ChaCha8Rng>);

impl SharedRng {
    pub(crate) fn seeded(seed: u64) -> Self {
        Self(Mutex::new(ChaCha8Rng::seed_from_u64(seed)))
    }

    pub(crate) fn from_entropy() -> Self {
        Self(Mutex::new(ChaCha8Rng::from_entropy()))
    }

    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

/// Up to `count` distinct indices into a collection of `len` items, in random order.
pub(crate) fn sample_indices(rng: &mut ChaCha8Rng, len: usize, count: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);
    indices.truncate(count);
    indices
}

/// Random v4-style id drawn from the generator's RNG.
pub(crate) fn exercise_id(rng: &mut ChaCha8Rng) -> String {
    uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LessonContent, VocabularyItem};

    fn lesson() -> Lesson {
        Lesson {
            id: "greetings".to_string(),
            title: "Greetings".to_string(),
            difficulty: 1,
            xp_reward: 10,
            prerequisites: vec![],
            content: LessonContent {
                vocabulary: vec![
                    VocabularyItem::new("hola", "hello"),
                    VocabularyItem::new("adiós", "goodbye"),
                ],
                grammar: vec![],
            },
            is_locked: false,
        }
    }

    #[test]
    fn defaults_register_both_kinds() {
        let registry = ExerciseRegistry::with_defaults(Some(7), 0.8);
        assert_eq!(registry.kinds(), vec!["flashcard", "multiple_choice"]);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let registry = ExerciseRegistry::with_defaults(Some(7), 0.8);
        let err = registry.get("essay").err().unwrap();
        assert_eq!(err, ExerciseError::UnknownKind("essay".to_string()));
    }

    #[test]
    fn score_clamps_total_and_skips_bonus_when_wrong() {
        let registry = ExerciseRegistry::with_defaults(Some(7), 0.8);
        let generator = registry.get("flashcard").unwrap();
        let exercise = generator.generate(&lesson(), 1).unwrap().remove(0);

        let right = generator.score(&exercise, &exercise.correct_answer, 1_000);
        assert_eq!(right.score, 100);
        assert_eq!(right.time_bonus, 19.0);
        assert_eq!(right.total, 100);

        let wrong = generator.score(&exercise, "zzzzzzzz", 1_000);
        assert!(!wrong.is_correct);
        assert_eq!(wrong.time_bonus, 19.0);
        assert_eq!(wrong.total, 0);
    }

    #[test]
    fn sample_indices_never_repeats() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut indices = sample_indices(&mut rng, 10, 25);
        assert_eq!(indices.len(), 10);
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 10);
    }

    #[test]
    fn exercise_ids_follow_the_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(11);
        let mut b = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(exercise_id(&mut a), exercise_id(&mut b));
        assert_ne!(exercise_id(&mut a), exercise_id(&mut ChaCha8Rng::seed_from_u64(12)));
    }
}

//! Flashcard exercises: show a word, type its translation.

use super::{exercise_id, sample_indices, ExerciseGenerator, SharedRng, Validation};
use crate::error::{ExerciseError, Result};
use crate::matching::{compare_answers, DEFAULT_FUZZY_THRESHOLD};
use crate::types::{
    clamp_difficulty, Exercise, ExerciseKind, ExerciseMetadata, ExerciseSource, Lesson,
};

/// Seconds within which a correct answer still earns a bonus point.
const TIME_BONUS_SECONDS: f64 = 20.0;

pub struct FlashcardGenerator {
    rng: SharedRng,
    fuzzy_threshold: f64,
}

impl FlashcardGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SharedRng::seeded(seed),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SharedRng::from_entropy(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }
}

impl ExerciseGenerator for FlashcardGenerator {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::Flashcard
    }

    fn generate(&self, lesson: &Lesson, count: usize) -> Result<Vec<Exercise>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let vocabulary = &lesson.content.vocabulary;
        if vocabulary.is_empty() {
            return Err(ExerciseError::NoSourceMaterial {
                lesson_id: lesson.id.clone(),
                kind: self.kind().as_str(),
            });
        }

        let exercises = self.rng.with(|rng| {
            let mut exercises = Vec::with_capacity(count.min(vocabulary.len()));
            for index in sample_indices(rng, vocabulary.len(), count) {
                let item = &vocabulary[index];
                exercises.push(Exercise {
                    id: exercise_id(rng),
                    lesson_id: lesson.id.clone(),
                    kind: ExerciseKind::Flashcard,
                    question: item.word.clone(),
                    correct_answer: item.translation.clone(),
                    options: Vec::new(),
                    hint: item
                        .translation
                        .chars()
                        .next()
                        .map(|first| format!("Starts with \"{}\"", first)),
                    metadata: ExerciseMetadata {
                        source: ExerciseSource::Vocabulary {
                            index,
                            word: item.word.clone(),
                        },
                        difficulty: clamp_difficulty(item.difficulty.unwrap_or(lesson.difficulty)),
                    },
                });
            }
            exercises
        });

        Ok(exercises)
    }

    fn validate(&self, exercise: &Exercise, answer: &str) -> Validation {
        let result = compare_answers(answer, &exercise.correct_answer, self.fuzzy_threshold);
        let score = if result.exact {
            100
        } else if result.is_correct {
            (result.similarity * 100.0).round() as u32
        } else {
            0
        };

        Validation {
            is_correct: result.is_correct,
            score,
        }
    }

    fn time_bonus(&self, time_spent_ms: u64) -> f64 {
        (TIME_BONUS_SECONDS - time_spent_ms as f64 / 1000.0).max(0.0)
    }
}

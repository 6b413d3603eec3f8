//! Exercise generation and answer validation.

use std::collections::{HashMap, VecDeque};

use lesson_core::types::{Exercise, ExerciseKind};
use serde::{Deserialize, Serialize};

use super::LessonService;
use crate::error::{EngineError, Result};

/// Outcome of answering a pending exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseResult {
    pub exercise_id: String,
    pub is_correct: bool,
    /// Accuracy score before the time bonus.
    pub score: u32,
    pub time_bonus: f64,
    /// Score plus bonus, capped at 100.
    pub total: u32,
    pub correct_answer: String,
}

/// Exercises held for validation when no capacity is configured.
pub const DEFAULT_PENDING_CAPACITY: usize = 1024;

/// Generated exercises awaiting a correct answer, evicted oldest first.
pub(super) struct PendingExercises {
    exercises: HashMap<String, Exercise>,
    /// Insertion order; may hold ids already removed.
    order: VecDeque<String>,
    capacity: usize,
}

impl PendingExercises {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            exercises: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, exercise: Exercise) {
        let id = exercise.id.clone();
        if self.exercises.insert(id.clone(), exercise).is_none() {
            self.order.push_back(id);
        }

        while self.exercises.len() > self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.exercises.remove(&oldest);
                }
                None => break,
            }
        }

        if self.order.len() > self.capacity * 2 {
            let exercises = &self.exercises;
            self.order.retain(|id| exercises.contains_key(id));
        }
    }

    fn get(&self, exercise_id: &str) -> Option<&Exercise> {
        self.exercises.get(exercise_id)
    }

    fn remove(&mut self, exercise_id: &str) {
        self.exercises.remove(exercise_id);
    }

    fn len(&self) -> usize {
        self.exercises.len()
    }
}

impl LessonService {
    /// Generate up to `count` exercises of `exercise_type` for a lesson.
    ///
    /// Generated exercises stay pending until answered correctly or evicted
    /// by newer ones.
    pub async fn generate_exercises(
        &self,
        lesson_id: &str,
        exercise_type: &str,
        count: usize,
    ) -> Result<Vec<Exercise>> {
        let lesson = self.load_lesson(lesson_id).await?;

        let generation_failed = |reason: String| EngineError::ExerciseGenerationFailed {
            lesson_id: lesson.id.clone(),
            exercise_type: exercise_type.to_string(),
            reason,
        };

        let kind: ExerciseKind = exercise_type
            .parse()
            .map_err(|e: lesson_core::ExerciseError| generation_failed(e.to_string()))?;
        let generator = self
            .registry
            .get(kind.as_str())
            .map_err(|e| generation_failed(e.to_string()))?;
        let exercises = generator
            .generate(&lesson, count)
            .map_err(|e| generation_failed(e.to_string()))?;

        {
            let mut pending = self.pending();
            for exercise in &exercises {
                pending.insert(exercise.clone());
            }
        }

        tracing::debug!(
            lesson_id = %lesson.id,
            exercise_type,
            count = exercises.len(),
            "Exercises generated"
        );
        self.metrics.exercises_generated(exercises.len());
        Ok(exercises)
    }

    /// Score an answer to a pending exercise.
    ///
    /// A wrong answer leaves the exercise pending for another try. A correct
    /// one retires it.
    pub fn validate_exercise(
        &self,
        exercise_id: &str,
        answer: &str,
        time_spent_ms: u64,
    ) -> Result<ExerciseResult> {
        let exercise = self
            .pending()
            .get(exercise_id)
            .cloned()
            .ok_or_else(|| EngineError::ExerciseNotFound {
                exercise_id: exercise_id.to_string(),
            })?;

        let generator = self
            .registry
            .get(exercise.kind.as_str())
            .map_err(|e| EngineError::ExerciseValidationFailed {
                exercise_id: exercise.id.clone(),
                reason: e.to_string(),
            })?;

        let breakdown = generator.score(&exercise, answer, time_spent_ms);

        tracing::debug!(
            exercise_id,
            exercise_type = exercise.kind.as_str(),
            is_correct = breakdown.is_correct,
            total = breakdown.total,
            "Exercise validated"
        );
        self.metrics.answer_validated(breakdown.is_correct);
        if breakdown.is_correct {
            self.pending().remove(&exercise.id);
        }

        Ok(ExerciseResult {
            exercise_id: exercise.id,
            is_correct: breakdown.is_correct,
            score: breakdown.score,
            time_bonus: breakdown.time_bonus,
            total: breakdown.total,
            correct_answer: exercise.correct_answer,
        })
    }

    /// Number of generated exercises awaiting an answer.
    pub fn pending_exercises(&self) -> usize {
        self.pending().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::types::{ExerciseMetadata, ExerciseSource};

    fn exercise(id: &str) -> Exercise {
        Exercise {
            id: id.to_string(),
            lesson_id: "l1".to_string(),
            kind: ExerciseKind::Flashcard,
            question: "hola".to_string(),
            correct_answer: "hello".to_string(),
            options: vec![],
            hint: None,
            metadata: ExerciseMetadata {
                source: ExerciseSource::Vocabulary {
                    index: 0,
                    word: "hola".to_string(),
                },
                difficulty: 1,
            },
        }
    }

    #[test]
    fn oldest_exercise_is_evicted_at_capacity() {
        let mut pending = PendingExercises::with_capacity(2);
        pending.insert(exercise("a"));
        pending.insert(exercise("b"));
        pending.insert(exercise("c"));

        assert_eq!(pending.len(), 2);
        assert!(pending.get("a").is_none());
        assert!(pending.get("c").is_some());
    }

    #[test]
    fn removed_ids_do_not_accumulate() {
        let mut pending = PendingExercises::with_capacity(3);
        for i in 0..100 {
            let id = format!("e{}", i);
            pending.insert(exercise(&id));
            pending.remove(&id);
        }

        assert_eq!(pending.len(), 0);
        assert!(pending.order.len() <= 6);
    }

    #[test]
    fn reinserting_keeps_one_entry() {
        let mut pending = PendingExercises::with_capacity(2);
        pending.insert(exercise("a"));
        pending.insert(exercise("a"));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending.order.len(), 1);
    }
}

//! Multiple-choice exercises over vocabulary and grammar points.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::{exercise_id, sample_indices, ExerciseGenerator, SharedRng, Validation};
use crate::error::{ExerciseError, Result};
use crate::matching::normalize;
use crate::types::{
    clamp_difficulty, Exercise, ExerciseKind, ExerciseMetadata, ExerciseSource, Lesson,
};

/// Distractors shown next to the correct answer.
pub const MAX_DISTRACTORS: usize = 3;

const TIME_BONUS_BASE: f64 = 10.0;
const TIME_BONUS_MS_PER_POINT: f64 = 2000.0;

#[derive(Debug, Clone, Copy)]
enum Source {
    Vocabulary(usize),
    Grammar(usize),
}

pub struct MultipleChoiceGenerator {
    rng: SharedRng,
}

impl MultipleChoiceGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SharedRng::seeded(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: SharedRng::from_entropy(),
        }
    }
}

impl ExerciseGenerator for MultipleChoiceGenerator {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::MultipleChoice
    }

    fn generate(&self, lesson: &Lesson, count: usize) -> Result<Vec<Exercise>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let content = &lesson.content;
        let pool: Vec<Source> = (0..content.vocabulary.len())
            .map(Source::Vocabulary)
            .chain((0..content.grammar.len()).map(Source::Grammar))
            .collect();
        if pool.is_empty() {
            return Err(ExerciseError::NoSourceMaterial {
                lesson_id: lesson.id.clone(),
                kind: self.kind().as_str(),
            });
        }

        let exercises = self.rng.with(|rng| {
            sample_indices(rng, pool.len(), count)
                .into_iter()
                .map(|i| build_exercise(rng, lesson, pool[i]))
                .collect::<Vec<_>>()
        });

        Ok(exercises)
    }

    fn validate(&self, exercise: &Exercise, answer: &str) -> Validation {
        let chosen = answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| exercise.options.get(index));

        match chosen {
            Some(option) if *option == exercise.correct_answer => Validation {
                is_correct: true,
                score: 100,
            },
            _ => Validation {
                is_correct: false,
                score: 0,
            },
        }
    }

    fn time_bonus(&self, time_spent_ms: u64) -> f64 {
        (TIME_BONUS_BASE - time_spent_ms as f64 / TIME_BONUS_MS_PER_POINT).max(0.0)
    }
}

fn build_exercise(rng: &mut ChaCha8Rng, lesson: &Lesson, source: Source) -> Exercise {
    let content = &lesson.content;

    let (question, correct, candidates, hint, source, difficulty) = match source {
        Source::Vocabulary(index) => {
            let item = &content.vocabulary[index];
            let candidates: Vec<&str> = content
                .vocabulary
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, other)| other.translation.as_str())
                .collect();
            (
                format!("What does \"{}\" mean?", item.word),
                item.translation.clone(),
                candidates,
                None,
                ExerciseSource::Vocabulary {
                    index,
                    word: item.word.clone(),
                },
                item.difficulty,
            )
        }
        Source::Grammar(index) => {
            let point = &content.grammar[index];
            (
                point.rule.clone(),
                point.answer.clone(),
                point.distractors.iter().map(String::as_str).collect(),
                point.explanation.clone(),
                ExerciseSource::Grammar {
                    index,
                    rule: point.rule.clone(),
                },
                point.difficulty,
            )
        }
    };

    let mut options = pick_distractors(rng, &correct, candidates);
    options.push(correct.clone());
    options.shuffle(rng);

    Exercise {
        id: exercise_id(rng),
        lesson_id: lesson.id.clone(),
        kind: ExerciseKind::MultipleChoice,
        question,
        correct_answer: correct,
        options,
        hint,
        metadata: ExerciseMetadata {
            source,
            difficulty: clamp_difficulty(difficulty.unwrap_or(lesson.difficulty)),
        },
    }
}

/// Up to `MAX_DISTRACTORS` distinct candidates that differ from `correct`.
fn pick_distractors(rng: &mut ChaCha8Rng, correct: &str, candidates: Vec<&str>) -> Vec<String> {
    let correct = normalize(correct);
    let mut seen = vec![correct];
    let mut distinct = Vec::new();

    for candidate in candidates {
        let key = normalize(candidate);
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        distinct.push(candidate.to_string());
    }

    distinct.shuffle(rng);
    distinct.truncate(MAX_DISTRACTORS);
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GrammarPoint, LessonContent, VocabularyItem};
    use pretty_assertions::assert_eq;

    fn lesson(vocabulary: Vec<VocabularyItem>, grammar: Vec<GrammarPoint>) -> Lesson {
        Lesson {
            id: "colors".to_string(),
            title: "Colors".to_string(),
            difficulty: 3,
            xp_reward: 30,
            prerequisites: vec![],
            content: LessonContent { vocabulary, grammar },
            is_locked: false,
        }
    }

    fn colors() -> Vec<VocabularyItem> {
        vec![
            VocabularyItem::new("rojo", "red"),
            VocabularyItem::new("azul", "blue"),
            VocabularyItem::new("verde", "green"),
            VocabularyItem::new("amarillo", "yellow"),
            VocabularyItem::new("negro", "black"),
        ]
    }

    fn ser_estar() -> GrammarPoint {
        GrammarPoint {
            rule: "Yo ___ cansado.".to_string(),
            answer: "estoy".to_string(),
            distractors: vec!["soy".to_string(), "es".to_string(), "Estoy".to_string()],
            explanation: Some("Temporary states use estar.".to_string()),
            difficulty: Some(4),
        }
    }

    fn correct_index(exercise: &Exercise) -> usize {
        exercise
            .options
            .iter()
            .position(|o| *o == exercise.correct_answer)
            .unwrap()
    }

    #[test]
    fn options_hold_correct_answer_once() {
        let generator = MultipleChoiceGenerator::seeded(21);
        let exercises = generator.generate(&lesson(colors(), vec![]), 5).unwrap();
        assert_eq!(exercises.len(), 5);

        for exercise in &exercises {
            assert_eq!(exercise.options.len(), MAX_DISTRACTORS + 1);
            let hits = exercise
                .options
                .iter()
                .filter(|o| **o == exercise.correct_answer)
                .count();
            assert_eq!(hits, 1);
        }
    }

    #[test]
    fn small_pool_yields_fewer_distractors() {
        let generator = MultipleChoiceGenerator::seeded(21);
        let vocabulary = vec![
            VocabularyItem::new("sí", "yes"),
            VocabularyItem::new("no", "no"),
        ];
        let exercises = generator.generate(&lesson(vocabulary, vec![]), 2).unwrap();
        for exercise in exercises {
            assert_eq!(exercise.options.len(), 2);
        }
    }

    #[test]
    fn single_item_has_only_the_answer() {
        let generator = MultipleChoiceGenerator::seeded(21);
        let vocabulary = vec![VocabularyItem::new("gato", "cat")];
        let exercise = generator
            .generate(&lesson(vocabulary, vec![]), 1)
            .unwrap()
            .remove(0);
        assert_eq!(exercise.options, vec!["cat".to_string()]);
    }

    #[test]
    fn duplicate_translations_are_not_distractors() {
        let generator = MultipleChoiceGenerator::seeded(4);
        let vocabulary = vec![
            VocabularyItem::new("coche", "car"),
            VocabularyItem::new("carro", "Car"),
            VocabularyItem::new("auto", "car"),
        ];
        let exercises = generator.generate(&lesson(vocabulary, vec![]), 3).unwrap();
        for exercise in exercises {
            assert_eq!(exercise.options.len(), 1);
        }
    }

    #[test]
    fn grammar_points_use_their_own_distractors() {
        let generator = MultipleChoiceGenerator::seeded(8);
        let exercise = generator
            .generate(&lesson(vec![], vec![ser_estar()]), 3)
            .unwrap()
            .remove(0);

        assert_eq!(exercise.correct_answer, "estoy");
        // "Estoy" normalizes to the correct answer and is dropped.
        assert_eq!(exercise.options.len(), 3);
        assert!(exercise.options.contains(&"soy".to_string()));
        assert!(exercise.options.contains(&"es".to_string()));
        assert_eq!(exercise.hint.as_deref(), Some("Temporary states use estar."));
        assert_eq!(exercise.metadata.difficulty, 4);
    }

    #[test]
    fn pool_mixes_vocabulary_and_grammar() {
        let generator = MultipleChoiceGenerator::seeded(8);
        let exercises = generator
            .generate(&lesson(colors(), vec![ser_estar()]), 10)
            .unwrap();
        assert_eq!(exercises.len(), 6);
        assert!(exercises
            .iter()
            .any(|e| matches!(e.metadata.source, ExerciseSource::Grammar { .. })));
    }

    #[test]
    fn same_seed_same_options() {
        let a = MultipleChoiceGenerator::seeded(99)
            .generate(&lesson(colors(), vec![]), 3)
            .unwrap();
        let b = MultipleChoiceGenerator::seeded(99)
            .generate(&lesson(colors(), vec![]), 3)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_lesson_fails() {
        let generator = MultipleChoiceGenerator::seeded(1);
        assert!(generator.generate(&lesson(vec![], vec![]), 2).is_err());
    }

    #[test]
    fn validates_by_option_index() {
        let generator = MultipleChoiceGenerator::seeded(13);
        let exercise = generator
            .generate(&lesson(colors(), vec![]), 1)
            .unwrap()
            .remove(0);
        let correct = correct_index(&exercise);
        let wrong = (correct + 1) % exercise.options.len();

        assert_eq!(
            generator.validate(&exercise, &correct.to_string()),
            Validation {
                is_correct: true,
                score: 100
            }
        );
        assert_eq!(
            generator.validate(&exercise, &format!(" {} ", correct)),
            Validation {
                is_correct: true,
                score: 100
            }
        );
        assert!(!generator.validate(&exercise, &wrong.to_string()).is_correct);
    }

    #[test]
    fn malformed_answers_are_incorrect() {
        let generator = MultipleChoiceGenerator::seeded(13);
        let exercise = generator
            .generate(&lesson(colors(), vec![]), 1)
            .unwrap()
            .remove(0);

        for answer in ["", "abc", "-1", "1.5", "4", "99", exercise.correct_answer.as_str()] {
            let validation = generator.validate(&exercise, answer);
            assert_eq!(
                validation,
                Validation {
                    is_correct: false,
                    score: 0
                },
                "answer {:?}",
                answer
            );
        }
    }

    #[test]
    fn time_bonus_is_smaller_than_flashcards() {
        let generator = MultipleChoiceGenerator::seeded(1);
        assert_eq!(generator.time_bonus(0), 10.0);
        assert_eq!(generator.time_bonus(4_000), 8.0);
        assert_eq!(generator.time_bonus(30_000), 0.0);
    }
}

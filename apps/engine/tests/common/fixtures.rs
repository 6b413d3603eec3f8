//! Test fixtures and factory functions for creating test data.

use chrono::Utc;

use lesson_core::types::{Answer, GrammarPoint, Lesson, LessonContent, VocabularyItem};

/// Lesson with vocabulary only.
pub fn lesson(id: &str, difficulty: u8, prerequisites: &[&str], words: &[(&str, &str)]) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: format!("Lesson {}", id),
        difficulty,
        xp_reward: 10 * difficulty as u32,
        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
        content: LessonContent {
            vocabulary: words
                .iter()
                .map(|(word, translation)| VocabularyItem::new(*word, *translation))
                .collect(),
            grammar: vec![],
        },
        is_locked: !prerequisites.is_empty(),
    }
}

/// Course of three lessons: `basics` -> `travel` -> `review`.
///
/// `review` has no content, so exercises cannot be generated for it.
pub fn course() -> Vec<Lesson> {
    let mut basics = lesson(
        "basics",
        1,
        &[],
        &[
            ("hola", "hello"),
            ("gracias", "thank you"),
            ("adiós", "goodbye"),
            ("por favor", "please"),
        ],
    );
    basics.content.grammar.push(GrammarPoint {
        rule: "Ella ___ de Chile.".to_string(),
        answer: "es".to_string(),
        distractors: vec!["está".to_string(), "son".to_string()],
        explanation: Some("Origin uses ser.".to_string()),
        difficulty: Some(2),
    });

    vec![
        basics,
        lesson(
            "travel",
            2,
            &["basics"],
            &[("tren", "train"), ("billete", "ticket"), ("estación", "station")],
        ),
        lesson("review", 3, &["basics", "travel"], &[]),
    ]
}

/// Answer record for `complete_lesson`.
pub fn answer(exercise_id: &str, response: &str, is_correct: bool, score: u32) -> Answer {
    Answer {
        exercise_id: exercise_id.to_string(),
        response: response.to_string(),
        is_correct,
        score,
        time_spent_ms: 2500,
        answered_at: Utc::now(),
    }
}

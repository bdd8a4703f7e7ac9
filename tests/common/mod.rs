#![allow(dead_code)]

use qbank_dedup::{Question, QuestionOption};

pub fn question(id: &str, stem: &str, options: &[&str], correct: usize) -> Question {
    Question {
        id: id.into(),
        question: stem.into(),
        options: options.iter().copied().map(QuestionOption::new).collect(),
        correct,
        category_id: "kinesiology".into(),
        difficulty: "medium".into(),
        image: None,
        language: "en".into(),
    }
}

/// The stored elbow-flexion question most scenarios check against.
pub fn elbow_flexion(id: &str) -> Question {
    question(
        id,
        "Which muscle is the prime mover for elbow flexion?",
        &["Biceps brachii", "Triceps brachii", "Deltoid", "Pectoralis major"],
        0,
    )
}

/// Same concept, reworded stem, shuffled options.
pub fn elbow_paraphrase(id: &str) -> Question {
    question(
        id,
        "What muscle acts as the main mover when the elbow flexes?",
        &["Deltoid", "Biceps brachii", "Pectoralis major", "Triceps brachii"],
        1,
    )
}

pub fn hand_washing(id: &str) -> Question {
    Question {
        category_id: "hygiene".into(),
        difficulty: "easy".into(),
        ..question(
            id,
            "What is the recommended frequency of hand washing between clients?",
            &[
                "Before and after every session",
                "Once per day",
                "Only when visibly soiled",
            ],
            2,
        )
    }
}

pub fn spanish_femur(id: &str) -> Question {
    Question {
        category_id: "anatomia".into(),
        language: "es".into(),
        ..question(
            id,
            "¿Cuál es el hueso más largo del cuerpo humano?",
            &["Fémur", "Tibia", "Húmero", "Peroné"],
            0,
        )
    }
}

//! Concept-overlap scorer.
//!
//! A cheap offline stand-in for semantic similarity: the stem is scanned for
//! terms from a fixed English/Spanish anatomy and therapy vocabulary, and two
//! stems are compared by the Jaccard index of the concepts they mention.

use std::collections::{BTreeSet, HashSet};

use canonical::{normalize_text, tokenize};

use crate::config::FingerprintError;
use crate::sets::jaccard;
use crate::SimilarityScorer;

/// Separator between concepts in a semantic hash.
pub const CONCEPT_SEPARATOR: char = '|';

// Stored normalized: lowercase, no accents.
const BASE_CONCEPTS: &[&str] = &[
    // English anatomy
    "muscle", "bone", "joint", "tendon", "ligament", "fascia", "nerve", "artery",
    "vein", "blood", "heart", "lung", "skin", "spine", "vertebra", "femur", "tibia",
    "fibula", "humerus", "radius", "ulna", "scapula", "clavicle", "pelvis", "skull",
    "sacrum", "cervical", "thoracic", "lumbar", "sciatic", "biceps", "triceps",
    "deltoid", "trapezius", "hamstring", "quadriceps", "gluteus", "diaphragm",
    "origin", "insertion", "body", "elbow", "shoulder", "knee", "hip", "wrist", "ankle",
    // English movement and therapy
    "flexion", "extension", "abduction", "adduction", "rotation", "massage",
    "effleurage", "petrissage", "friction", "tapotement", "vibration", "pressure",
    "circulation", "lymph", "lymphatic", "edema", "inflammation",
    "contraindication", "therapy", "therapist", "posture", "stretch", "trigger",
    // Spanish anatomy
    "musculo", "hueso", "articulacion", "ligamento", "nervio", "arteria", "vena",
    "sangre", "corazon", "pulmon", "piel", "columna", "humero", "cubito",
    "escapula", "clavicula", "craneo", "sacro", "ciatico", "deltoides", "trapecio",
    "isquiotibiales", "cuadriceps", "gluteo", "diafragma", "origen", "insercion",
    "cuerpo", "codo", "hombro", "rodilla", "cadera", "muneca", "tobillo",
    // Spanish movement and therapy
    "flexion", "extension", "abduccion", "aduccion", "rotacion", "masaje",
    "friccion", "vibracion", "presion", "circulacion", "linfa", "linfatico",
    "inflamacion", "contraindicacion", "terapia", "terapeuta", "postura",
    "estiramiento",
];

/// Scores stems by shared domain concepts.
#[derive(Debug, Clone)]
pub struct ConceptScorer {
    words: HashSet<String>,
    phrases: Vec<String>,
}

impl Default for ConceptScorer {
    fn default() -> Self {
        Self::with_extra_concepts(std::iter::empty::<&str>())
    }
}

impl ConceptScorer {
    /// Built-in vocabulary plus `extra` terms. Multi-word terms match as
    /// phrases on token boundaries.
    pub fn with_extra_concepts<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: HashSet<String> = BASE_CONCEPTS.iter().map(|w| w.to_string()).collect();
        let mut phrases = Vec::new();
        for term in extra {
            let term = normalize_text(term.as_ref());
            if term.is_empty() {
                continue;
            }
            if term.contains(' ') {
                phrases.push(term);
            } else {
                words.insert(term);
            }
        }
        phrases.sort();
        phrases.dedup();
        Self { words, phrases }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.words.len() + self.phrases.len()
    }

    /// Concepts found in `text`, sorted and de-duplicated.
    pub fn concepts(&self, text: &str) -> BTreeSet<String> {
        let normalized = normalize_text(text);
        let mut found = BTreeSet::new();
        for token in tokenize(&normalized) {
            if let Some(concept) = self.lookup(token) {
                found.insert(concept);
            }
        }
        if !self.phrases.is_empty() {
            let padded = format!(" {normalized} ");
            for phrase in &self.phrases {
                if padded.contains(&format!(" {phrase} ")) {
                    found.insert(phrase.clone());
                }
            }
        }
        found
    }

    // Exact term first, then `-es` and `-s` plural folding.
    fn lookup(&self, token: &str) -> Option<String> {
        if self.words.contains(token) {
            return Some(token.to_string());
        }
        [token.strip_suffix("es"), token.strip_suffix('s')]
            .into_iter()
            .flatten()
            .find(|stem| self.words.contains(*stem))
            .map(str::to_string)
    }
}

impl SimilarityScorer for ConceptScorer {
    type Input = str;

    fn generate_hash(&self, text: &str) -> Result<String, FingerprintError> {
        let concepts: Vec<String> = self.concepts(text).into_iter().collect();
        Ok(concepts.join(&CONCEPT_SEPARATOR.to_string()))
    }

    fn compare(&self, a: &str, b: &str) -> f64 {
        jaccard(&split_concepts(a), &split_concepts(b))
    }
}

fn split_concepts(hash: &str) -> HashSet<&str> {
    hash.split(CONCEPT_SEPARATOR).filter(|c| !c.is_empty()).collect()
}

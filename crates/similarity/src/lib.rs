//! # Question similarity
//!
//! Turns a validated [`ingest::Question`] into a [`QuestionFingerprint`] and
//! scores pairs of fingerprints.
//!
//! ## Contract
//!
//! - Consumes only canonical questions from the ingest crate.
//! - Fingerprinting is a pure function of `(question, config)` apart from
//!   the `created_at` timestamp.
//! - Comparison is a pure function of `(fingerprint, fingerprint, config)`.
//!   Every component score and the overall score lie in [0, 1].
//!
//! ## Scorers
//!
//! 1. **Text** ([`TextScorer`]): Levenshtein distance on the normalized stem.
//! 2. **Semantic** ([`ConceptScorer`]): Jaccard index of domain concepts.
//! 3. **Structural** ([`StructuralComparator`]): weighted match of stem
//!    length, option count, image flag, difficulty, category and language.
//!
//! Options, keywords and answer pattern are scored from the fingerprint
//! fields directly, and the six components combine through
//! [`ScoreWeights`].
//!
//! ## Example
//!
//! ```
//! use ingest::{Question, QuestionOption};
//! use similarity::{SimilarityConfig, SimilarityEngine};
//!
//! let q = Question {
//!     id: "q1".into(),
//!     question: "¿Cuál es el hueso más largo del cuerpo?".into(),
//!     options: ["Fémur", "Tibia", "Húmero", "Radio"]
//!         .into_iter()
//!         .map(QuestionOption::new)
//!         .collect(),
//!     correct: 0,
//!     category_id: "anatomia".into(),
//!     difficulty: "easy".into(),
//!     image: None,
//!     language: "es".into(),
//! };
//! let mut copy = q.clone();
//! copy.id = "q2".into();
//!
//! let engine = SimilarityEngine::new(SimilarityConfig::default()).unwrap();
//! let a = engine.fingerprint(&q).unwrap();
//! let b = engine.fingerprint(&copy).unwrap();
//! assert!(engine.compare(&a, &b).overall_score > 0.999);
//! ```

use chrono::Utc;
use ingest::Question;

pub mod config;
pub mod fingerprint;

mod answer;
mod score;
mod semantic;
mod sets;
mod structural;
mod text;

pub use crate::answer::compare_answer_patterns;
pub use crate::config::{
    FingerprintError, ScoreWeights, SimilarityConfig, StructuralWeights, WEIGHT_SUM_TOLERANCE,
};
pub use crate::fingerprint::{AnswerPattern, QuestionFingerprint};
pub use crate::score::SimilarityResult;
pub use crate::semantic::{ConceptScorer, CONCEPT_SEPARATOR};
pub use crate::structural::{StructuralComparator, StructuralSignature};
pub use crate::text::TextScorer;

use crate::sets::jaccard_strs;

/// Shared shape of the three scorers: derive a comparable signature from an
/// input, then compare two signatures to a score in [0, 1].
pub trait SimilarityScorer {
    type Input: ?Sized;

    fn generate_hash(&self, input: &Self::Input) -> Result<String, FingerprintError>;

    fn compare(&self, a: &str, b: &str) -> f64;
}

/// Fingerprints questions and scores fingerprint pairs.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    cfg: SimilarityConfig,
    text: TextScorer,
    semantic: ConceptScorer,
    structural: StructuralComparator,
}

impl SimilarityEngine {
    pub fn new(cfg: SimilarityConfig) -> Result<Self, FingerprintError> {
        cfg.validate()?;
        Ok(Self {
            text: TextScorer,
            semantic: ConceptScorer::with_extra_concepts(&cfg.extra_concepts),
            structural: StructuralComparator::new(cfg.structural_weights),
            cfg,
        })
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.cfg
    }

    pub fn text_scorer(&self) -> &TextScorer {
        &self.text
    }

    pub fn concept_scorer(&self) -> &ConceptScorer {
        &self.semantic
    }

    pub fn structural_comparator(&self) -> &StructuralComparator {
        &self.structural
    }

    /// Builds the fingerprint of `question`.
    pub fn fingerprint(&self, question: &Question) -> Result<QuestionFingerprint, FingerprintError> {
        let id = question.id.trim();
        if id.is_empty() {
            return Err(FingerprintError::MissingId);
        }
        if question.options.is_empty() {
            return Err(FingerprintError::NoOptions { id: id.to_string() });
        }
        if question.correct >= question.options.len() {
            return Err(FingerprintError::CorrectOutOfRange {
                id: id.to_string(),
                correct: question.correct,
                options: question.options.len(),
            });
        }

        let normalized_text = self.text.generate_hash(&question.question)?;
        if normalized_text.is_empty() {
            return Err(FingerprintError::EmptyText { id: id.to_string() });
        }

        let mut option_texts: Vec<String> = question
            .option_texts()
            .map(canonical::normalize_text)
            .collect();
        option_texts.sort();

        Ok(QuestionFingerprint {
            id: id.to_string(),
            text_hash: self.text.digest(&question.question),
            semantic_hash: self.semantic.generate_hash(&question.question)?,
            structural_hash: self.structural.generate_hash(question)?,
            options_hash: canonical::hash_set_digest(&option_texts),
            option_texts,
            answer_pattern: AnswerPattern::of(question),
            keywords: canonical::extract_keywords(&question.question, self.cfg.max_keywords),
            normalized_text,
            normalization_version: canonical::NORMALIZATION_VERSION,
            created_at: Utc::now(),
        })
    }

    /// Scores `a` against `b`. Symmetric in its arguments.
    pub fn compare(&self, a: &QuestionFingerprint, b: &QuestionFingerprint) -> SimilarityResult {
        let options = if a.options_hash == b.options_hash {
            1.0
        } else {
            jaccard_strs(&a.option_texts, &b.option_texts)
        };
        SimilarityResult::from_components(
            self.text.compare(&a.normalized_text, &b.normalized_text),
            self.semantic.compare(&a.semantic_hash, &b.semantic_hash),
            self.structural.compare(&a.structural_hash, &b.structural_hash),
            options,
            jaccard_strs(&a.keywords, &b.keywords),
            compare_answer_patterns(&a.answer_pattern, &b.answer_pattern),
            &self.cfg.weights,
        )
    }
}

/// One-shot fingerprinting with a throwaway engine.
pub fn fingerprint_question(
    question: &Question,
    cfg: &SimilarityConfig,
) -> Result<QuestionFingerprint, FingerprintError> {
    SimilarityEngine::new(cfg.clone())?.fingerprint(question)
}

/// One-shot comparison with a throwaway engine.
pub fn compare_fingerprints(
    a: &QuestionFingerprint,
    b: &QuestionFingerprint,
    cfg: &SimilarityConfig,
) -> Result<SimilarityResult, FingerprintError> {
    Ok(SimilarityEngine::new(cfg.clone())?.compare(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest::QuestionOption;

    fn question(id: &str, stem: &str, options: &[&str], correct: usize) -> Question {
        Question {
            id: id.into(),
            question: stem.into(),
            options: options.iter().copied().map(QuestionOption::new).collect(),
            correct,
            category_id: "anatomy".into(),
            difficulty: "medium".into(),
            image: None,
            language: "en".into(),
        }
    }

    fn engine() -> SimilarityEngine {
        SimilarityEngine::new(SimilarityConfig::default()).unwrap()
    }

    #[test]
    fn fingerprint_fields() {
        let q = question(
            "q1",
            "Which muscle flexes the elbow joint?",
            &["Triceps", "Biceps brachii", "Deltoid", "Soleus"],
            1,
        );
        let fp = engine().fingerprint(&q).unwrap();
        assert_eq!(fp.id, "q1");
        assert_eq!(fp.text_hash.len(), 8);
        assert_eq!(fp.normalized_text, "which muscle flexes the elbow joint");
        assert_eq!(fp.semantic_hash, "elbow|joint|muscle");
        assert_eq!(fp.option_texts, vec!["biceps brachii", "deltoid", "soleus", "triceps"]);
        assert_eq!(fp.keywords, vec!["muscle", "flexes", "elbow", "joint"]);
        assert_eq!(fp.answer_pattern.correct_index, 1);
        assert_eq!(fp.answer_pattern.option_lengths, vec![7, 14, 7, 6]);
        assert!(!fp.answer_pattern.has_digits);
        assert_eq!(fp.normalization_version, canonical::NORMALIZATION_VERSION);
    }

    #[test]
    fn fingerprinting_is_idempotent() {
        let q = question("q1", "Origin of the deltoid?", &["Clavicle", "Sternum"], 0);
        let e = engine();
        let a = e.fingerprint(&q).unwrap();
        let b = e.fingerprint(&q).unwrap();
        assert!(a.same_content(&b));
    }

    #[test]
    fn option_order_does_not_change_options_hash() {
        let e = engine();
        let a = e
            .fingerprint(&question("a", "Longest bone?", &["Femur", "Tibia"], 0))
            .unwrap();
        let b = e
            .fingerprint(&question("b", "Longest bone?", &["Tibia", "Femur"], 1))
            .unwrap();
        assert_eq!(a.options_hash, b.options_hash);
        assert_eq!(e.compare(&a, &b).options_similarity, 1.0);
    }

    #[test]
    fn invalid_questions_rejected() {
        let e = engine();
        let err = e.fingerprint(&question(" ", "Stem", &["a", "b"], 0)).unwrap_err();
        assert_eq!(err, FingerprintError::MissingId);

        let err = e.fingerprint(&question("q", "?!", &["a", "b"], 0)).unwrap_err();
        assert_eq!(err, FingerprintError::EmptyText { id: "q".into() });

        let err = e.fingerprint(&question("q", "Stem", &[], 0)).unwrap_err();
        assert_eq!(err, FingerprintError::NoOptions { id: "q".into() });

        let err = e.fingerprint(&question("q", "Stem", &["a", "b"], 2)).unwrap_err();
        assert!(matches!(err, FingerprintError::CorrectOutOfRange { correct: 2, .. }));
    }

    #[test]
    fn compare_is_reflexive_symmetric_and_bounded() {
        let e = engine();
        let a = e
            .fingerprint(&question(
                "a",
                "Which muscle flexes the elbow joint?",
                &["Triceps", "Biceps brachii", "Deltoid", "Soleus"],
                1,
            ))
            .unwrap();
        let b = e
            .fingerprint(&question(
                "b",
                "What is the insertion of the 2nd rib muscle?",
                &["Sternum (body)", "Rib 3"],
                0,
            ))
            .unwrap();

        let self_score = e.compare(&a, &a);
        assert_eq!(self_score.text_similarity, 1.0);
        assert!((self_score.overall_score - 1.0).abs() < 1e-9);

        let ab = e.compare(&a, &b);
        let ba = e.compare(&b, &a);
        assert_eq!(ab, ba);
        for score in [
            ab.text_similarity,
            ab.semantic_similarity,
            ab.structural_similarity,
            ab.options_similarity,
            ab.keyword_similarity,
            ab.answer_pattern_similarity,
            ab.overall_score,
        ] {
            assert!((0.0..=1.0).contains(&score));
        }
        assert!(ab.overall_score < 0.45);
    }

    #[test]
    fn extra_concepts_flow_into_fingerprints() {
        let cfg = SimilarityConfig::default().with_extra_concepts(["shiatsu"]);
        let fp = fingerprint_question(
            &question("q", "Shiatsu originated in which country?", &["Japan", "Peru"], 0),
            &cfg,
        )
        .unwrap();
        assert_eq!(fp.semantic_hash, "shiatsu");
        let result = compare_fingerprints(&fp, &fp, &cfg).unwrap();
        assert_eq!(result.semantic_similarity, 1.0);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = SimilarityConfig::default().with_max_keywords(0);
        assert!(matches!(
            SimilarityEngine::new(cfg),
            Err(FingerprintError::InvalidConfig(_))
        ));
    }
}

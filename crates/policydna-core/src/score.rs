//! Scoring weights and thresholds, centrally defined.
//!
//! All of these are empirically chosen tunables, not derived quantities.
//! They live here (and in [`MatchConfig`]) so they can be adjusted and
//! tested independently of the algorithms that consume them.

/// Weight of character-sequence similarity in the equivalence composite.
pub const SEQUENCE_WEIGHT: f64 = 0.6;
/// Weight of key-term overlap in the equivalence composite.
pub const TERM_OVERLAP_WEIGHT: f64 = 0.4;
/// Minimum composite score for a standard clause to count as equivalent.
pub const EQUIVALENCE_THRESHOLD: f64 = 0.6;

/// Above this uniqueness score an element is flagged unique outright.
pub const UNIQUENESS_THRESHOLD: f64 = 0.5;
/// A sentence matching a comparison sentence above this is not unique.
pub const PHRASE_SIMILARITY_THRESHOLD: f64 = 0.8;
/// Sentences shorter than this many words are ignored as trivial fragments.
pub const MIN_PHRASE_WORDS: usize = 4;

/// Below this best confidence an element maps to [`UNCLASSIFIED_CODE`].
pub const MIN_MAPPING_CONFIDENCE: f64 = 0.3;
/// Sentinel taxonomy code for elements no rule could classify.
pub const UNCLASSIFIED_CODE: &str = "UNCLASSIFIED";

/// Confidence tier boundaries for batch statistics.
pub const HIGH_CONFIDENCE: f64 = 0.8;
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Clause-library search: score floor applied when the query appears in a
/// clause name, and the blend weights over (name, term overlap, sequence).
pub const SEARCH_NAME_FLOOR: f64 = 0.7;
pub const SEARCH_NAME_WEIGHT: f64 = 0.4;
pub const SEARCH_TERM_WEIGHT: f64 = 0.4;
pub const SEARCH_SEQUENCE_WEIGHT: f64 = 0.2;
/// Results below this relevance are dropped from search output.
pub const SEARCH_MIN_RELEVANCE: f64 = 0.2;

/// Tunable matching parameters.
///
/// `Default` reproduces the shipped constants; batch callers can loosen or
/// tighten thresholds without touching algorithm code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    pub sequence_weight: f64,
    pub term_overlap_weight: f64,
    pub equivalence_threshold: f64,
    pub uniqueness_threshold: f64,
    pub phrase_similarity_threshold: f64,
    pub min_phrase_words: usize,
    pub min_mapping_confidence: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            sequence_weight: SEQUENCE_WEIGHT,
            term_overlap_weight: TERM_OVERLAP_WEIGHT,
            equivalence_threshold: EQUIVALENCE_THRESHOLD,
            uniqueness_threshold: UNIQUENESS_THRESHOLD,
            phrase_similarity_threshold: PHRASE_SIMILARITY_THRESHOLD,
            min_phrase_words: MIN_PHRASE_WORDS,
            min_mapping_confidence: MIN_MAPPING_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_weights_sum_to_one() {
        assert!((SEQUENCE_WEIGHT + TERM_OVERLAP_WEIGHT - 1.0).abs() < 1e-9);
        assert!(
            (SEARCH_NAME_WEIGHT + SEARCH_TERM_WEIGHT + SEARCH_SEQUENCE_WEIGHT - 1.0).abs() < 1e-9
        );
    }

    #[test]
    fn default_config_matches_constants() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.equivalence_threshold, EQUIVALENCE_THRESHOLD);
        assert_eq!(cfg.min_phrase_words, MIN_PHRASE_WORDS);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(MEDIUM_CONFIDENCE < HIGH_CONFIDENCE);
        assert!(MIN_MAPPING_CONFIDENCE < MEDIUM_CONFIDENCE);
    }
}

//! Unique provision detection.
//!
//! A provision is unique when no standard clause comes close to it overall.
//! Sentence-level analysis then pins down which phrases carry the unique
//! content: a sentence counts as covered if some clause sentence either
//! resembles it (sequence similarity) or contains its vocabulary (term
//! containment). Containment matters for short element sentences restating
//! part of a longer clause sentence.

use std::collections::BTreeSet;

use tracing::debug;

use policydna_core::score::MatchConfig;
use policydna_core::text;
use policydna_core::{PolicyElement, UniquenessAnalysis};
use policydna_library::{ClauseLibrary, StandardClause};

use crate::equivalence::EquivalenceDetector;

/// Flags elements with no close standard counterpart.
pub struct UniqueProvisionDetector<'a> {
    detector: EquivalenceDetector<'a>,
}

impl<'a> UniqueProvisionDetector<'a> {
    pub fn new(library: &'a ClauseLibrary) -> Self {
        Self::with_config(library, MatchConfig::default())
    }

    pub fn with_config(library: &'a ClauseLibrary, config: MatchConfig) -> Self {
        Self {
            detector: EquivalenceDetector::with_config(library, config),
        }
    }

    /// Analyze one element against the library.
    ///
    /// Uniqueness is the complement of the equivalence score when a clause
    /// cleared the equivalence threshold, and 1.0 otherwise. An element is
    /// unique on either global dissimilarity or at least one unique phrase.
    pub fn analyze(&self, element: &PolicyElement) -> UniquenessAnalysis {
        let config = *self.detector.config();
        let clauses = self.detector.comparison_clauses(element.element_type);

        let (similarity_score, closest) = match self.detector.find_equivalent(element) {
            Some(eq) => (eq.score, Some(eq.clause.id.clone())),
            None => (0.0, None),
        };

        let uniqueness_score = 1.0 - similarity_score;
        let unique_phrases = self.unique_phrases(&element.text, &clauses, &config);
        let is_unique =
            uniqueness_score > config.uniqueness_threshold || !unique_phrases.is_empty();

        if is_unique {
            debug!(
                element = %element.id,
                uniqueness = uniqueness_score,
                phrases = unique_phrases.len(),
                "unique provision"
            );
        }

        UniquenessAnalysis {
            is_unique,
            uniqueness_score,
            closest_standard_clause: closest,
            similarity_score,
            unique_phrases,
        }
    }

    /// Sentences of the element with no close counterpart in any clause.
    fn unique_phrases(
        &self,
        element_text: &str,
        clauses: &[&StandardClause],
        config: &MatchConfig,
    ) -> Vec<String> {
        let clause_sentences: Vec<(String, BTreeSet<String>)> = clauses
            .iter()
            .flat_map(|c| text::split_sentences(&c.text))
            .map(|s| {
                let normalized = text::normalize(s);
                let terms = text::terms_of_normalized(&normalized);
                (normalized, terms)
            })
            .collect();

        text::split_sentences(element_text)
            .into_iter()
            .filter(|sentence| {
                sentence.split_whitespace().count() >= config.min_phrase_words
            })
            .filter(|sentence| {
                let normalized = text::normalize(sentence);
                let terms = text::terms_of_normalized(&normalized);
                !clause_sentences.iter().any(|(clause_norm, clause_terms)| {
                    let sim = text::sequence_ratio(&normalized, clause_norm)
                        .max(text::containment(&terms, clause_terms));
                    sim >= config.phrase_similarity_threshold
                })
            })
            .map(str::to_string)
            .collect()
    }
}

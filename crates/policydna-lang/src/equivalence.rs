//! Semantic equivalence between policy elements and standard clauses.
//!
//! The composite score blends normalized character-sequence similarity with
//! key-term coverage (how much of the clause's vocabulary the element
//! carries). Sequence similarity rewards shared phrasing; term coverage
//! rewards shared vocabulary even when word order diverges. Both operate on
//! normalized text, so an element restating a clause through known wording
//! variants scores exactly 1.0 against it.

use tracing::debug;

use policydna_core::score::MatchConfig;
use policydna_core::text;
use policydna_core::{ElementType, PolicyElement};
use policydna_library::{ClauseLibrary, ClauseType, StandardClause};

/// Clause type an element type is compared against.
pub fn comparison_clause_type(element_type: ElementType) -> ClauseType {
    match element_type {
        ElementType::CoverageGrant => ClauseType::CoverageGrant,
        ElementType::Exclusion => ClauseType::Exclusion,
        ElementType::Condition
        | ElementType::NoticeRequirement
        | ElementType::Territory
        | ElementType::TimeElement
        | ElementType::Trigger => ClauseType::Condition,
        ElementType::Extension => ClauseType::CoverageExtension,
        ElementType::Definition => ClauseType::Definition,
        ElementType::SubLimit
        | ElementType::Retention
        | ElementType::Limit
        | ElementType::Premium
        | ElementType::Endorsement
        | ElementType::Other => ClauseType::Other,
    }
}

/// A standard clause an element was judged equivalent to.
#[derive(Debug, Clone, Copy)]
pub struct Equivalence<'a> {
    pub clause: &'a StandardClause,
    /// Composite score in [0, 1].
    pub score: f64,
}

/// Finds the standard clause an element restates, if any.
pub struct EquivalenceDetector<'a> {
    library: &'a ClauseLibrary,
    config: MatchConfig,
}

impl<'a> EquivalenceDetector<'a> {
    pub fn new(library: &'a ClauseLibrary) -> Self {
        Self::with_config(library, MatchConfig::default())
    }

    pub fn with_config(library: &'a ClauseLibrary, config: MatchConfig) -> Self {
        Self { library, config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Clauses an element is compared against: those of the matching clause
    /// type, or the whole library when that type has no clauses.
    pub fn comparison_clauses(&self, element_type: ElementType) -> Vec<&'a StandardClause> {
        let typed = self
            .library
            .clauses_by_type(comparison_clause_type(element_type));
        if typed.is_empty() {
            self.library.clauses().collect()
        } else {
            typed
        }
    }

    /// Composite score of already-normalized element text against a clause.
    pub fn composite_score(
        &self,
        normalized: &str,
        terms: &std::collections::BTreeSet<String>,
        clause: &StandardClause,
    ) -> f64 {
        let sequence = text::sequence_ratio(normalized, &clause.normalized_text);
        let coverage = text::containment(&clause.key_terms, terms);
        self.config.sequence_weight * sequence + self.config.term_overlap_weight * coverage
    }

    /// Best equivalent standard clause for an element, when one clears the
    /// equivalence threshold. Ties break on clause id for determinism.
    pub fn find_equivalent(&self, element: &PolicyElement) -> Option<Equivalence<'a>> {
        let normalized = text::normalize(&element.text);
        let terms = text::terms_of_normalized(&normalized);

        let mut best: Option<Equivalence<'a>> = None;
        for clause in self.comparison_clauses(element.element_type) {
            let score = self.composite_score(&normalized, &terms, clause);
            let better = match &best {
                None => true,
                Some(current) => {
                    score > current.score
                        || (score == current.score && clause.id < current.clause.id)
                }
            };
            if better {
                best = Some(Equivalence { clause, score });
            }
        }

        let best = best?;
        if best.score >= self.config.equivalence_threshold {
            debug!(
                element = %element.id,
                clause = %best.clause.id,
                score = best.score,
                "equivalent standard clause"
            );
            Some(best)
        } else {
            None
        }
    }
}

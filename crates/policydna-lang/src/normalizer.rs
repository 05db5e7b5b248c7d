//! Language normalization: rewrite elements that restate standard clauses
//! to the canonical wording, and annotate the rest.
//!
//! Normalization never touches `element.text`; the canonical wording lands
//! in `normalized_text` with its provenance recorded, so the pass is
//! idempotent and the original language stays auditable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use policydna_core::score::MatchConfig;
use policydna_core::{NormalizationSource, PolicyElement};
use policydna_library::ClauseLibrary;

use crate::equivalence::EquivalenceDetector;
use crate::uniqueness::UniqueProvisionDetector;

/// Batch statistics from a normalization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub total_elements: usize,
    /// Elements rewritten to standard clause wording.
    pub standardized_count: usize,
    pub standardized_ratio: f64,
    /// Elements flagged unique by the uniqueness analysis.
    pub unique_count: usize,
    pub unique_ratio: f64,
    /// Mean similarity score across all elements (0.0 for an empty batch).
    pub average_similarity: f64,
    /// How often each standard clause was used, by clause id.
    pub clause_usage: BTreeMap<String, usize>,
}

/// Runs equivalence and uniqueness analysis over elements and applies the
/// results in place.
pub struct LanguageNormalizer<'a> {
    equivalence: EquivalenceDetector<'a>,
    uniqueness: UniqueProvisionDetector<'a>,
}

impl<'a> LanguageNormalizer<'a> {
    pub fn new(library: &'a ClauseLibrary) -> Self {
        Self::with_config(library, MatchConfig::default())
    }

    pub fn with_config(library: &'a ClauseLibrary, config: MatchConfig) -> Self {
        Self {
            equivalence: EquivalenceDetector::with_config(library, config),
            uniqueness: UniqueProvisionDetector::with_config(library, config),
        }
    }

    /// Normalize one element in place.
    ///
    /// An element equivalent to a standard clause and not flagged unique
    /// gets the clause's wording and id; everything else keeps its original
    /// text as the normalized form. All elements get a uniqueness analysis
    /// and a similarity score.
    pub fn normalize_element(&self, element: &mut PolicyElement) {
        let analysis = self.uniqueness.analyze(element);
        element.similarity_score = Some(analysis.similarity_score);

        match self.equivalence.find_equivalent(element) {
            Some(eq) if !analysis.is_unique => {
                element.normalized_text = Some(eq.clause.text.clone());
                element.normalization_source = Some(NormalizationSource::StandardClause);
                element.standard_clause_id = Some(eq.clause.id.clone());
            }
            _ => {
                element.normalized_text = Some(element.text.clone());
                element.normalization_source = Some(NormalizationSource::Original);
                element.standard_clause_id = None;
            }
        }

        element.uniqueness_analysis = Some(analysis);
    }

    /// Normalize a batch of elements and report on the outcome.
    pub fn normalize_elements(&self, elements: &mut [PolicyElement]) -> NormalizationReport {
        let mut standardized_count = 0usize;
        let mut unique_count = 0usize;
        let mut similarity_sum = 0.0f64;
        let mut clause_usage: BTreeMap<String, usize> = BTreeMap::new();

        for element in elements.iter_mut() {
            self.normalize_element(element);

            similarity_sum += element.similarity_score.unwrap_or(0.0);
            if let Some(id) = &element.standard_clause_id {
                standardized_count += 1;
                *clause_usage.entry(id.clone()).or_insert(0) += 1;
            }
            if element
                .uniqueness_analysis
                .as_ref()
                .is_some_and(|a| a.is_unique)
            {
                unique_count += 1;
            }
        }

        let total = elements.len();
        let ratio = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 };
        let report = NormalizationReport {
            total_elements: total,
            standardized_count,
            standardized_ratio: ratio(standardized_count),
            unique_count,
            unique_ratio: ratio(unique_count),
            average_similarity: if total == 0 {
                0.0
            } else {
                similarity_sum / total as f64
            },
            clause_usage,
        };

        info!(
            total = report.total_elements,
            standardized = report.standardized_count,
            unique = report.unique_count,
            "normalized elements"
        );
        report
    }
}

//! Taxonomy mapping result types.

use serde::{Deserialize, Serialize};

/// One candidate taxonomy assignment for an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyMapping {
    pub code: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Terms from the element that matched the node's vocabulary, when the
    /// mapping came from keyword evidence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_terms: Vec<String>,
}

/// How a mapping was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    /// Rule evidence only (keywords, type bias, section context, titles).
    Keyword,
    /// Standard-clause equivalence evidence only.
    Semantic,
    /// Both kinds of evidence contributed.
    Hybrid,
}

/// Result of mapping one element against the taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingResult {
    pub element_id: String,
    /// Ranked candidates, sorted by confidence descending.
    pub mappings: Vec<TaxonomyMapping>,
    pub best_match_code: Option<String>,
    pub mapping_method: MappingMethod,
    /// Per-rule candidate lists, for auditing how a mapping was derived.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_contributions: Vec<RuleContribution>,
}

/// Candidates contributed by a single mapping rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleContribution {
    pub rule: String,
    pub candidates: Vec<TaxonomyMapping>,
}

impl MappingResult {
    /// Highest-confidence mapping, if any.
    pub fn best(&self) -> Option<&TaxonomyMapping> {
        self.mappings.first()
    }
}

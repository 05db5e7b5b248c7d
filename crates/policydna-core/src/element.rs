//! Policy element model.
//!
//! Elements arrive from the upstream extraction pipeline already segmented,
//! typed, and keyworded. The core augments them in place with taxonomy
//! mappings, normalized language, and uniqueness analysis.

use serde::{Deserialize, Serialize};

use crate::mapping::TaxonomyMapping;

/// Classification of one extracted policy element.
///
/// Closed set: unknown upstream tags deserialize as `Other` via the explicit
/// variant rather than being silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    CoverageGrant,
    Exclusion,
    Condition,
    Definition,
    SubLimit,
    Retention,
    Extension,
    Territory,
    TimeElement,
    Endorsement,
    Trigger,
    NoticeRequirement,
    Limit,
    Premium,
    Other,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoverageGrant => "coverage_grant",
            Self::Exclusion => "exclusion",
            Self::Condition => "condition",
            Self::Definition => "definition",
            Self::SubLimit => "sub_limit",
            Self::Retention => "retention",
            Self::Extension => "extension",
            Self::Territory => "territory",
            Self::TimeElement => "time_element",
            Self::Endorsement => "endorsement",
            Self::Trigger => "trigger",
            Self::NoticeRequirement => "notice_requirement",
            Self::Limit => "limit",
            Self::Premium => "premium",
            Self::Other => "other",
        }
    }
}

/// Where an element's normalized text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationSource {
    /// Replaced with canonical standard-clause wording.
    StandardClause,
    /// Kept verbatim; no safe canonical replacement.
    Original,
}

/// Uniqueness analysis attached to an element by the unique provision detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessAnalysis {
    pub is_unique: bool,
    pub uniqueness_score: f64,
    /// Id of the closest standard clause, when one cleared the threshold.
    pub closest_standard_clause: Option<String>,
    pub similarity_score: f64,
    /// Sentences with no close counterpart in any comparison clause.
    pub unique_phrases: Vec<String>,
}

/// One extracted policy provision, plus the augmentation fields the core
/// fills in during mapping and normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyElement {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Free-form upstream metadata (monetary values, references, conditions).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,

    // ── Augmentation (filled by the core) ──
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxonomy_mappings: Vec<TaxonomyMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization_source: Option<NormalizationSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_clause_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uniqueness_analysis: Option<UniquenessAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl PolicyElement {
    /// Minimal element for tests and programmatic construction.
    pub fn new(id: impl Into<String>, element_type: ElementType, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            title: None,
            element_type,
            section_id: None,
            section_type: None,
            parent_id: None,
            child_ids: Vec::new(),
            confidence: 0.0,
            keywords: Vec::new(),
            metadata: serde_json::Value::Null,
            taxonomy_mappings: Vec::new(),
            normalized_text: None,
            normalization_source: None,
            standard_clause_id: None,
            uniqueness_analysis: None,
            similarity_score: None,
        }
    }
}

/// A detected relationship between two policy elements, supplied by the
/// upstream relationship analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

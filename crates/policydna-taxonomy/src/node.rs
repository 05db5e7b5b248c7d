//! Taxonomy node and hierarchy levels.

use serde::{Deserialize, Serialize};

/// Hierarchy level of a taxonomy node, ordered root-to-leaf.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxonomyLevel {
    /// Top level (Property, Liability, Cyber, ...).
    LineOfBusiness,
    /// Category within a line (Building Coverage, Business Interruption).
    CoverageCategory,
    /// Specific coverage type (Main Building Structure).
    CoverageType,
    /// Detailed coverage (Debris Removal, Ordinance or Law).
    CoverageDetail,
    /// Attributes (Valuation Method, Geographic Scope).
    CoverageAttribute,
}

impl TaxonomyLevel {
    /// Numeric depth, 1 at the root level.
    pub fn depth(&self) -> u8 {
        match self {
            Self::LineOfBusiness => 1,
            Self::CoverageCategory => 2,
            Self::CoverageType => 3,
            Self::CoverageDetail => 4,
            Self::CoverageAttribute => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LineOfBusiness => "LINE_OF_BUSINESS",
            Self::CoverageCategory => "COVERAGE_CATEGORY",
            Self::CoverageType => "COVERAGE_TYPE",
            Self::CoverageDetail => "COVERAGE_DETAIL",
            Self::CoverageAttribute => "COVERAGE_ATTRIBUTE",
        }
    }
}

/// One category in the taxonomy forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    /// Globally unique dotted code, e.g. `PROP.BLDG.DEBRISREM`.
    pub code: String,
    pub name: String,
    pub level: TaxonomyLevel,
    #[serde(default)]
    pub description: String,
    /// Standard-setting body this category derives from (ISO, NAIC, ACORD,
    /// Custom).
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
    /// Child codes in insertion order, maintained by the registry.
    #[serde(default)]
    pub children: Vec<String>,
    /// Alternative terms and phrases used by the mapper's keyword rule.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Example policy text snippets for this category.
    #[serde(default)]
    pub examples: Vec<String>,
    /// Related nodes in other branches.
    #[serde(default)]
    pub related_codes: Vec<String>,
}

impl TaxonomyNode {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        level: TaxonomyLevel,
        description: impl Into<String>,
        source: impl Into<String>,
        parent_code: Option<&str>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            level,
            description: description.into(),
            source: source.into(),
            parent_code: parent_code.map(str::to_string),
            children: Vec::new(),
            synonyms: Vec::new(),
            examples: Vec::new(),
            related_codes: Vec::new(),
        }
    }

    /// Builder-style synonym attachment for registry seeding.
    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Builder-style example attachment for registry seeding.
    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        self.examples = examples.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_code.is_none()
    }
}

//! Standard clause model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use policydna_core::text;

/// Functional role of a standard clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseType {
    CoverageGrant,
    Exclusion,
    Condition,
    CoverageExtension,
    Definition,
    Other,
}

impl ClauseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoverageGrant => "coverage_grant",
            Self::Exclusion => "exclusion",
            Self::Condition => "condition",
            Self::CoverageExtension => "coverage_extension",
            Self::Definition => "definition",
            Self::Other => "other",
        }
    }
}

/// One canonical clause with its comparison artifacts.
///
/// `normalized_text` and `key_terms` are derived from `text`; they are
/// persisted for inspection but recomputed whenever a library is loaded,
/// so stale or missing values in a file never reach the matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardClause {
    /// Stable id, e.g. `STD-PROP-BLDG-001`.
    pub id: String,
    pub name: String,
    pub clause_type: ClauseType,
    /// Taxonomy code this clause belongs under.
    pub taxonomy_code: String,
    /// Canonical wording.
    pub text: String,
    /// Issuing standard or origin (ISO, NAIC, proprietary, ...).
    #[serde(default)]
    pub source: String,
    /// Form or edition identifier, e.g. `CP 00 10`.
    #[serde(default)]
    pub version: String,
    /// Free-form labels for filtering and reporting.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Normalized canonical wording (see `policydna_core::text::normalize`).
    #[serde(default)]
    pub normalized_text: String,
    /// Key terms of the normalized wording.
    #[serde(default)]
    pub key_terms: BTreeSet<String>,
}

impl StandardClause {
    /// Build a clause, deriving normalized text and key terms from `text`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        clause_type: ClauseType,
        taxonomy_code: impl Into<String>,
        text: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let mut clause = Self {
            id: id.into(),
            name: name.into(),
            clause_type,
            taxonomy_code: taxonomy_code.into(),
            text: text.into(),
            source: source.into(),
            version: String::new(),
            tags: Vec::new(),
            normalized_text: String::new(),
            key_terms: BTreeSet::new(),
        };
        clause.rederive();
        clause
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Recompute the derived comparison artifacts from `text`.
    pub fn rederive(&mut self) {
        self.normalized_text = text::normalize(&self.text);
        self.key_terms = text::terms_of_normalized(&self.normalized_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_normalized_text_and_terms() {
        let clause = StandardClause::new(
            "STD-TEST-001",
            "Test Grant",
            ClauseType::CoverageGrant,
            "PROP.BLDG",
            "We shall reimburse you for loss to the Building.",
            "ISO",
        );
        // "shall reimburse" canonicalizes to "will pay", "building" to "premises".
        assert!(clause.normalized_text.contains("will pay"));
        assert!(clause.key_terms.contains("premises"));
        assert!(clause.key_terms.contains("loss"));
        assert!(!clause.key_terms.contains("the"));
    }

    #[test]
    fn clause_type_snake_case() {
        assert_eq!(
            serde_json::to_string(&ClauseType::CoverageExtension).unwrap(),
            "\"coverage_extension\""
        );
    }

    #[test]
    fn serde_roundtrip_keeps_version_and_tags() {
        let clause = StandardClause::new(
            "STD-TEST-002",
            "Water Exclusion",
            ClauseType::Exclusion,
            "PROP.BLDG",
            "We will not pay for loss caused by flood.",
            "ISO",
        )
        .with_version("CP 10 30")
        .with_tags(&["property", "water"]);
        let json = serde_json::to_string(&clause).unwrap();
        let back: StandardClause = serde_json::from_str(&json).unwrap();
        assert_eq!(back, clause);
        assert_eq!(back.version, "CP 10 30");
        assert_eq!(back.tags, vec!["property", "water"]);
    }

    #[test]
    fn deserializes_without_derived_fields() {
        let json = serde_json::json!({
            "id": "STD-TEST-003",
            "name": "Minimal",
            "clause_type": "condition",
            "taxonomy_code": "PROP.ATTR",
            "text": "You must notify us promptly of any loss."
        });
        let mut clause: StandardClause = serde_json::from_value(json).unwrap();
        assert!(clause.normalized_text.is_empty());
        clause.rederive();
        assert!(clause.key_terms.contains("loss"));
    }
}

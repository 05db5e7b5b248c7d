//! The assembled policy structure and its summaries.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use policydna_core::{PolicyElement, Relationship};

use crate::error::StructureError;

/// One node of the taxonomy-keyed element tree.
///
/// Mirrors the registry hierarchy, pruned to branches that actually hold
/// elements; `element_ids` lists elements whose best mapping is this code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyTreeNode {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub element_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaxonomyTreeNode>,
}

impl TaxonomyTreeNode {
    /// Elements in this node and all descendants.
    pub fn subtree_element_count(&self) -> usize {
        self.element_ids.len()
            + self
                .children
                .iter()
                .map(TaxonomyTreeNode::subtree_element_count)
                .sum::<usize>()
    }
}

/// Document-level counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureSummary {
    pub total_elements: usize,
    pub element_types: BTreeMap<String, usize>,
    /// Best-match code counts, sentinel included.
    pub taxonomy_codes: BTreeMap<String, usize>,
    pub normalization_sources: BTreeMap<String, usize>,
    pub relationship_types: BTreeMap<String, usize>,
    pub unique_elements: usize,
    pub standardized_elements: usize,
}

/// One coverage grant with its attached provisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub element_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub taxonomy_code: String,
    /// Sub-limit elements pointing at this grant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_limit_ids: Vec<String>,
    /// Exclusion elements pointing at this grant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusion_ids: Vec<String>,
    pub is_unique: bool,
}

/// Coverage-centric view of the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub total_grants: usize,
    pub grants: Vec<CoverageEntry>,
    /// Grants per line-of-business branch.
    pub branch_counts: BTreeMap<String, usize>,
    /// Fraction of grants flagged unique.
    pub unique_ratio: f64,
    /// Distinct taxonomy codes across grants.
    pub code_diversity: usize,
}

/// Fully assembled policy structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStructure {
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
    pub elements: Vec<PolicyElement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    pub taxonomy_tree: Vec<TaxonomyTreeNode>,
    pub summary: StructureSummary,
    pub coverage: CoverageSummary,
}

impl PolicyStructure {
    pub fn element(&self, id: &str) -> Option<&PolicyElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Write the structure to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), StructureError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| StructureError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

//! Assembles elements, relationships, and metadata into a [`PolicyStructure`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use tracing::{info, warn};

use policydna_core::score::UNCLASSIFIED_CODE;
use policydna_core::{ElementType, PolicyElement, Relationship};
use policydna_taxonomy::TaxonomyRegistry;

use crate::structure::{
    CoverageEntry, CoverageSummary, PolicyStructure, StructureSummary, TaxonomyTreeNode,
};

/// Relationship types the coverage summary pivots on.
const REL_SUB_LIMIT: &str = "sub_limit";
const REL_EXCLUSION: &str = "exclusion";

pub struct PolicyStructureBuilder<'a> {
    registry: &'a TaxonomyRegistry,
    metadata: serde_json::Value,
    elements: Vec<PolicyElement>,
    relationships: Vec<Relationship>,
}

impl<'a> PolicyStructureBuilder<'a> {
    pub fn new(registry: &'a TaxonomyRegistry) -> Self {
        Self {
            registry,
            metadata: serde_json::Value::Null,
            elements: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn elements(mut self, elements: impl IntoIterator<Item = PolicyElement>) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn relationships(
        mut self,
        relationships: impl IntoIterator<Item = Relationship>,
    ) -> Self {
        self.relationships.extend(relationships);
        self
    }

    /// Assemble the structure.
    ///
    /// Relationships with unknown endpoints, and edges that would close a
    /// cycle, are skipped with a warning; one bad relationship must not
    /// abort the build.
    pub fn build(self) -> PolicyStructure {
        let ids: BTreeSet<&str> = self.elements.iter().map(|e| e.id.as_str()).collect();
        let relationships = accept_relationships(&self.relationships, &ids);

        let best_codes: BTreeMap<&str, String> = self
            .elements
            .iter()
            .map(|e| (e.id.as_str(), best_code(e, self.registry)))
            .collect();

        let taxonomy_tree = self.build_tree(&best_codes);
        let summary = self.summarize(&best_codes, &relationships);
        let coverage = self.coverage_summary(&best_codes, &relationships);

        info!(
            elements = self.elements.len(),
            relationships = relationships.len(),
            grants = coverage.total_grants,
            "built policy structure"
        );

        PolicyStructure {
            created_at: Utc::now(),
            metadata: self.metadata,
            elements: self.elements,
            relationships,
            taxonomy_tree,
            summary,
            coverage,
        }
    }

    fn build_tree(&self, best_codes: &BTreeMap<&str, String>) -> Vec<TaxonomyTreeNode> {
        // code -> element ids, in element order.
        let mut by_code: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for element in &self.elements {
            let code = &best_codes[element.id.as_str()];
            by_code.entry(code.as_str()).or_default().push(element.id.clone());
        }

        self.registry
            .root_codes()
            .iter()
            .filter_map(|root| self.tree_node(root, &by_code))
            .collect()
    }

    fn tree_node(
        &self,
        code: &str,
        by_code: &BTreeMap<&str, Vec<String>>,
    ) -> Option<TaxonomyTreeNode> {
        let node = self.registry.get_node(code)?;
        let children: Vec<TaxonomyTreeNode> = node
            .children
            .iter()
            .filter_map(|child| self.tree_node(child, by_code))
            .collect();
        let element_ids = by_code.get(code).cloned().unwrap_or_default();

        // Prune branches that hold nothing.
        if element_ids.is_empty() && children.is_empty() {
            return None;
        }
        Some(TaxonomyTreeNode {
            code: node.code.clone(),
            name: node.name.clone(),
            element_ids,
            children,
        })
    }

    fn summarize(
        &self,
        best_codes: &BTreeMap<&str, String>,
        relationships: &[Relationship],
    ) -> StructureSummary {
        let mut summary = StructureSummary {
            total_elements: self.elements.len(),
            ..StructureSummary::default()
        };

        for element in &self.elements {
            *summary
                .element_types
                .entry(element.element_type.as_str().to_string())
                .or_insert(0) += 1;
            *summary
                .taxonomy_codes
                .entry(best_codes[element.id.as_str()].clone())
                .or_insert(0) += 1;
            if let Some(source) = element.normalization_source {
                let key = match source {
                    policydna_core::NormalizationSource::StandardClause => "standard_clause",
                    policydna_core::NormalizationSource::Original => "original",
                };
                *summary
                    .normalization_sources
                    .entry(key.to_string())
                    .or_insert(0) += 1;
            }
            if element.standard_clause_id.is_some() {
                summary.standardized_elements += 1;
            }
            if element
                .uniqueness_analysis
                .as_ref()
                .is_some_and(|a| a.is_unique)
            {
                summary.unique_elements += 1;
            }
        }

        for relationship in relationships {
            *summary
                .relationship_types
                .entry(relationship.rel_type.clone())
                .or_insert(0) += 1;
        }
        summary
    }

    fn coverage_summary(
        &self,
        best_codes: &BTreeMap<&str, String>,
        relationships: &[Relationship],
    ) -> CoverageSummary {
        let grants: Vec<&PolicyElement> = self
            .elements
            .iter()
            .filter(|e| e.element_type == ElementType::CoverageGrant)
            .collect();

        let mut entries = Vec::with_capacity(grants.len());
        let mut branch_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut codes = BTreeSet::new();
        let mut unique = 0usize;

        for grant in &grants {
            let code = best_codes[grant.id.as_str()].clone();
            codes.insert(code.clone());

            let branch = self
                .registry
                .path_to_root(&code)
                .last()
                .map(|n| n.code.clone())
                .unwrap_or_else(|| code.clone());
            *branch_counts.entry(branch).or_insert(0) += 1;

            let attached = |rel_type: &str| -> Vec<String> {
                relationships
                    .iter()
                    .filter(|r| r.rel_type == rel_type && r.target_id == grant.id)
                    .map(|r| r.source_id.clone())
                    .collect()
            };

            let is_unique = grant
                .uniqueness_analysis
                .as_ref()
                .is_some_and(|a| a.is_unique);
            if is_unique {
                unique += 1;
            }

            entries.push(CoverageEntry {
                element_id: grant.id.clone(),
                title: grant.title.clone(),
                taxonomy_code: code,
                sub_limit_ids: attached(REL_SUB_LIMIT),
                exclusion_ids: attached(REL_EXCLUSION),
                is_unique,
            });
        }

        CoverageSummary {
            total_grants: grants.len(),
            unique_ratio: if grants.is_empty() {
                0.0
            } else {
                unique as f64 / grants.len() as f64
            },
            code_diversity: codes.len(),
            branch_counts,
            grants: entries,
        }
    }
}

/// Best-match code of an element, falling back to the sentinel.
fn best_code(element: &PolicyElement, registry: &TaxonomyRegistry) -> String {
    let code = element
        .taxonomy_mappings
        .first()
        .map(|m| m.code.as_str())
        .unwrap_or(UNCLASSIFIED_CODE);
    if registry.get_node(code).is_some() {
        code.to_string()
    } else {
        warn!(element = %element.id, code, "mapped code missing from registry");
        UNCLASSIFIED_CODE.to_string()
    }
}

/// Keep relationships with known endpoints whose edge does not close a cycle.
fn accept_relationships(
    relationships: &[Relationship],
    ids: &BTreeSet<&str>,
) -> Vec<Relationship> {
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut kept = Vec::new();

    for rel in relationships {
        if !ids.contains(rel.source_id.as_str()) || !ids.contains(rel.target_id.as_str()) {
            warn!(
                source = %rel.source_id,
                target = %rel.target_id,
                "relationship references unknown element; skipping"
            );
            continue;
        }
        if reaches(&adjacency, &rel.target_id, &rel.source_id) {
            warn!(
                source = %rel.source_id,
                target = %rel.target_id,
                "relationship would close a cycle; skipping"
            );
            continue;
        }
        adjacency
            .entry(rel.source_id.as_str())
            .or_default()
            .push(rel.target_id.as_str());
        kept.push(rel.clone());
    }
    kept
}

/// Depth-first reachability over the accepted edges.
fn reaches(adjacency: &BTreeMap<&str, Vec<&str>>, from: &str, to: &str) -> bool {
    if from == to {
        return true;
    }
    let mut stack = vec![from];
    let mut seen = BTreeSet::new();
    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(next) = adjacency.get(current) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use policydna_core::mapping::TaxonomyMapping;
    use policydna_taxonomy::builtin_registry;

    fn mapped(id: &str, element_type: ElementType, code: &str) -> PolicyElement {
        let mut el = PolicyElement::new(id, element_type, format!("Text of {id}."));
        el.taxonomy_mappings = vec![TaxonomyMapping {
            code: code.to_string(),
            confidence: 0.8,
            matched_terms: Vec::new(),
        }];
        el
    }

    fn rel(source: &str, target: &str, rel_type: &str) -> Relationship {
        Relationship {
            source_id: source.to_string(),
            target_id: target.to_string(),
            rel_type: rel_type.to_string(),
            subtype: String::new(),
            description: String::new(),
            weight: 1.0,
        }
    }

    fn sample_structure() -> PolicyStructure {
        let registry = builtin_registry().unwrap();
        let grant = mapped("grant-1", ElementType::CoverageGrant, "PROP.BLDG");
        let exclusion = mapped("excl-1", ElementType::Exclusion, "PROP.BLDG");
        let sub_limit = mapped("lim-1", ElementType::SubLimit, "PROP.BLDG.DEBRISREM");
        let stray = PolicyElement::new("other-1", ElementType::Other, "Miscellaneous text.");

        PolicyStructureBuilder::new(&registry)
            .metadata(serde_json::json!({"policy_number": "CP-0001"}))
            .elements([grant, exclusion, sub_limit, stray])
            .relationships([
                rel("excl-1", "grant-1", "exclusion"),
                rel("lim-1", "grant-1", "sub_limit"),
                rel("ghost", "grant-1", "exclusion"),
                // Closes a cycle with the first edge.
                rel("grant-1", "excl-1", "reference"),
            ])
            .build()
    }

    #[test]
    fn bad_relationships_are_skipped_not_fatal() {
        let structure = sample_structure();
        // Dangling endpoint and cycle-closing edge both dropped.
        assert_eq!(structure.relationships.len(), 2);
        assert_eq!(structure.summary.relationship_types.get("exclusion"), Some(&1));
        assert_eq!(structure.summary.relationship_types.get("sub_limit"), Some(&1));
    }

    #[test]
    fn taxonomy_tree_groups_elements_under_codes() {
        let structure = sample_structure();
        let prop = structure
            .taxonomy_tree
            .iter()
            .find(|n| n.code == "PROP")
            .unwrap();
        assert_eq!(prop.subtree_element_count(), 3);

        let bldg = prop.children.iter().find(|n| n.code == "PROP.BLDG").unwrap();
        assert_eq!(bldg.element_ids, vec!["grant-1", "excl-1"]);
        let debris = bldg
            .children
            .iter()
            .find(|n| n.code == "PROP.BLDG.DEBRISREM")
            .unwrap();
        assert_eq!(debris.element_ids, vec!["lim-1"]);

        // Empty branches pruned.
        assert!(structure.taxonomy_tree.iter().all(|n| n.code != "MARINE"));
    }

    #[test]
    fn unmapped_element_lands_under_sentinel() {
        let structure = sample_structure();
        let sentinel = structure
            .taxonomy_tree
            .iter()
            .find(|n| n.code == UNCLASSIFIED_CODE)
            .unwrap();
        assert_eq!(sentinel.element_ids, vec!["other-1"]);
    }

    #[test]
    fn elements_under_orphan_code_stay_in_tree() {
        use policydna_taxonomy::{TaxonomyLevel, TaxonomyNode};

        let mut registry = builtin_registry().unwrap();
        // Parent FLOOD never gets registered; the node is a de facto root.
        registry
            .add_node(TaxonomyNode::new(
                "FLOOD.ZONE",
                "Flood Zone Coverage",
                TaxonomyLevel::CoverageCategory,
                "",
                "NFIP",
                Some("FLOOD"),
            ))
            .unwrap();

        let structure = PolicyStructureBuilder::new(&registry)
            .elements([mapped("grant-z", ElementType::CoverageGrant, "FLOOD.ZONE")])
            .build();

        let orphan = structure
            .taxonomy_tree
            .iter()
            .find(|n| n.code == "FLOOD.ZONE")
            .unwrap();
        assert_eq!(orphan.element_ids, vec!["grant-z"]);
    }

    #[test]
    fn summary_counts_types_and_codes() {
        let structure = sample_structure();
        let summary = &structure.summary;
        assert_eq!(summary.total_elements, 4);
        assert_eq!(summary.element_types.get("coverage_grant"), Some(&1));
        assert_eq!(summary.element_types.get("exclusion"), Some(&1));
        assert_eq!(summary.taxonomy_codes.get("PROP.BLDG"), Some(&2));
        assert_eq!(summary.taxonomy_codes.get(UNCLASSIFIED_CODE), Some(&1));
    }

    #[test]
    fn coverage_summary_attaches_provisions_to_grant() {
        let structure = sample_structure();
        let coverage = &structure.coverage;
        assert_eq!(coverage.total_grants, 1);
        assert_eq!(coverage.branch_counts.get("PROP"), Some(&1));
        assert_eq!(coverage.code_diversity, 1);

        let entry = &coverage.grants[0];
        assert_eq!(entry.element_id, "grant-1");
        assert_eq!(entry.exclusion_ids, vec!["excl-1"]);
        assert_eq!(entry.sub_limit_ids, vec!["lim-1"]);
        assert!(!entry.is_unique);
    }

    #[test]
    fn structure_roundtrips_through_json_file() {
        let structure = sample_structure();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("structure.json");
        structure.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let back: PolicyStructure = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.created_at, structure.created_at);
        assert_eq!(back.elements.len(), structure.elements.len());
        assert_eq!(back.summary.total_elements, structure.summary.total_elements);
        assert!(back.element("grant-1").is_some());
    }

    #[test]
    fn empty_build_is_well_formed() {
        let registry = builtin_registry().unwrap();
        let structure = PolicyStructureBuilder::new(&registry).build();
        assert_eq!(structure.summary.total_elements, 0);
        assert!(structure.taxonomy_tree.is_empty());
        assert_eq!(structure.coverage.unique_ratio, 0.0);
    }
}

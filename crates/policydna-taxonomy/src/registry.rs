//! The taxonomy registry: a forest of category nodes with lookup,
//! traversal, and JSON persistence.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TaxonomyError;
use crate::node::{TaxonomyLevel, TaxonomyNode};

/// Persisted registry shape: node map keyed by code plus the root list.
#[derive(Serialize, Deserialize)]
struct RegistryFile {
    nodes: BTreeMap<String, TaxonomyNode>,
    root_nodes: Vec<String>,
}

/// In-memory taxonomy forest.
///
/// Mutation happens during setup (seeding, extension loading); matching only
/// reads, so a shared reference is safe across worker threads.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyRegistry {
    nodes: BTreeMap<String, TaxonomyNode>,
    root_codes: Vec<String>,
}

impl TaxonomyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node.
    ///
    /// Rejects duplicate codes and level-order violations (a child must sit
    /// strictly deeper than its parent). A parent code that does not resolve
    /// is tolerated: the node is kept and registered as a de facto root, so
    /// every node stays reachable from `root_codes`. If the parent arrives
    /// later, the node is relinked under it and loses root status.
    pub fn add_node(&mut self, mut node: TaxonomyNode) -> Result<(), TaxonomyError> {
        if self.nodes.contains_key(&node.code) {
            return Err(TaxonomyError::DuplicateCode(node.code));
        }

        match &node.parent_code {
            Some(parent_code) => {
                if let Some(parent) = self.nodes.get_mut(parent_code) {
                    if node.level <= parent.level {
                        return Err(TaxonomyError::LevelOrder {
                            code: node.code,
                            level: node.level.as_str(),
                            parent: parent.code.clone(),
                            parent_level: parent.level.as_str(),
                        });
                    }
                    if !parent.children.contains(&node.code) {
                        parent.children.push(node.code.clone());
                    }
                } else {
                    warn!(code = %node.code, parent = %parent_code, "dangling parent reference; treating node as root");
                    if !self.root_codes.contains(&node.code) {
                        self.root_codes.push(node.code.clone());
                    }
                }
            }
            None => {
                if !self.root_codes.contains(&node.code) {
                    self.root_codes.push(node.code.clone());
                }
            }
        }

        node.children.clear();
        // Adopt earlier arrivals that named this node as their parent; they
        // were registered as de facto roots while the parent was missing.
        let orphans: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.parent_code.as_deref() == Some(node.code.as_str()))
            .map(|n| n.code.clone())
            .collect();
        for code in orphans {
            if self.nodes[&code].level > node.level {
                self.root_codes.retain(|c| c != &code);
                node.children.push(code);
            } else {
                warn!(code = %code, parent = %node.code, "child not deeper than late-arriving parent; left as root");
            }
        }
        // Children recorded on previously inserted nodes survive; links are
        // owned by the parent side and rebuilt from parent_code on insert.
        self.nodes.insert(node.code.clone(), node);
        Ok(())
    }

    pub fn get_node(&self, code: &str) -> Option<&TaxonomyNode> {
        self.nodes.get(code)
    }

    /// Resolved children of a node; unknown codes yield an empty list.
    pub fn get_children(&self, code: &str) -> Vec<&TaxonomyNode> {
        let Some(node) = self.nodes.get(code) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .collect()
    }

    /// Path from a node up to its root, starting at the node itself.
    ///
    /// A dangling parent link ends the path early (partial path, no error).
    pub fn path_to_root(&self, code: &str) -> Vec<&TaxonomyNode> {
        let mut path = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = self.nodes.get(code);

        while let Some(node) = current {
            if !seen.insert(node.code.as_str()) {
                // Defective data could cycle; stop rather than loop.
                warn!(code = %node.code, "cycle encountered in parent chain");
                break;
            }
            path.push(node);
            current = node
                .parent_code
                .as_deref()
                .and_then(|p| self.nodes.get(p));
        }
        path
    }

    /// Case-insensitive name search; substring match unless `exact`.
    pub fn find_nodes_by_name(&self, name: &str, exact: bool) -> Vec<&TaxonomyNode> {
        let needle = name.to_lowercase();
        self.nodes
            .values()
            .filter(|n| {
                let hay = n.name.to_lowercase();
                if exact { hay == needle } else { hay.contains(&needle) }
            })
            .collect()
    }

    pub fn nodes_at_level(&self, level: TaxonomyLevel) -> Vec<&TaxonomyNode> {
        self.nodes.values().filter(|n| n.level == level).collect()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TaxonomyNode> {
        self.nodes.values()
    }

    pub fn root_codes(&self) -> &[String] {
        &self.root_codes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Write the registry to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), TaxonomyError> {
        let file = RegistryFile {
            nodes: self.nodes.clone(),
            root_nodes: self.root_codes.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| {
            TaxonomyError::Malformed { path: path.to_path_buf(), source }
        })?;
        fs::write(path, json).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a registry from a JSON file, replacing current contents.
    ///
    /// Malformed data fails fast; a node keyed under a different code than
    /// it declares is treated as malformed rather than silently re-keyed.
    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: RegistryFile = serde_json::from_str(&raw).map_err(|source| {
            TaxonomyError::Malformed { path: path.to_path_buf(), source }
        })?;

        for (key, node) in &file.nodes {
            if key != &node.code {
                return Err(TaxonomyError::KeyCodeMismatch {
                    key: key.clone(),
                    code: node.code.clone(),
                });
            }
        }

        debug!(nodes = file.nodes.len(), path = %path.display(), "loaded taxonomy");
        Ok(Self {
            nodes: file.nodes,
            root_codes: file.root_nodes,
        })
    }

    /// Merge nodes from a file into this registry.
    ///
    /// Codes already present are kept as-is, never overwritten.
    pub fn extend_from_file(&mut self, path: &Path) -> Result<(), TaxonomyError> {
        let incoming = Self::load(path)?;
        let mut added = 0usize;
        for (code, node) in incoming.nodes {
            if self.nodes.contains_key(&code) {
                continue;
            }
            let mut node = node;
            node.children.clear();
            // Relink through add_node so parent children lists stay correct.
            if self.add_node(node).is_ok() {
                added += 1;
            }
        }
        debug!(added, path = %path.display(), "extended taxonomy");
        Ok(())
    }

    /// Indented text rendering of the hierarchy, for CLI display.
    pub fn format_hierarchy(&self, start_code: Option<&str>) -> String {
        let mut out = String::new();
        let starts: Vec<String> = match start_code {
            Some(code) => vec![code.to_string()],
            None => self.root_codes.clone(),
        };
        for code in starts {
            self.format_subtree(&code, 0, &mut out);
        }
        out
    }

    fn format_subtree(&self, code: &str, indent: usize, out: &mut String) {
        let Some(node) = self.nodes.get(code) else {
            return;
        };
        out.push_str(&"  ".repeat(indent));
        out.push_str(&format!("{}: {} ({})\n", node.code, node.name, node.level.as_str()));
        for child in &node.children {
            self.format_subtree(child, indent + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(code: &str, name: &str) -> TaxonomyNode {
        TaxonomyNode::new(code, name, TaxonomyLevel::LineOfBusiness, "", "ISO", None)
    }

    fn category(code: &str, name: &str, parent: &str) -> TaxonomyNode {
        TaxonomyNode::new(code, name, TaxonomyLevel::CoverageCategory, "", "ISO", Some(parent))
    }

    fn sample_registry() -> TaxonomyRegistry {
        let mut reg = TaxonomyRegistry::new();
        reg.add_node(root("PROP", "Property Insurance")).unwrap();
        reg.add_node(category("PROP.BLDG", "Building Coverage", "PROP")).unwrap();
        reg.add_node(category("PROP.BPP", "Business Personal Property", "PROP")).unwrap();
        reg.add_node(TaxonomyNode::new(
            "PROP.BLDG.DEBRISREM",
            "Debris Removal",
            TaxonomyLevel::CoverageDetail,
            "",
            "ISO",
            Some("PROP.BLDG"),
        ))
        .unwrap();
        reg
    }

    #[test]
    fn add_node_links_children_in_order() {
        let reg = sample_registry();
        let children = reg.get_children("PROP");
        let codes: Vec<&str> = children.iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["PROP.BLDG", "PROP.BPP"]);
    }

    #[test]
    fn add_node_rejects_duplicate_code() {
        let mut reg = sample_registry();
        let err = reg.add_node(root("PROP", "Property Again")).unwrap_err();
        assert!(matches!(err, TaxonomyError::DuplicateCode(code) if code == "PROP"));
    }

    #[test]
    fn add_node_rejects_level_order_violation() {
        let mut reg = sample_registry();
        // A line-of-business node cannot hang under a coverage category.
        let bad = TaxonomyNode::new(
            "X",
            "Bad",
            TaxonomyLevel::LineOfBusiness,
            "",
            "ISO",
            Some("PROP.BLDG"),
        );
        assert!(matches!(reg.add_node(bad), Err(TaxonomyError::LevelOrder { .. })));
    }

    #[test]
    fn level_invariant_holds_for_every_linked_node() {
        let reg = sample_registry();
        for node in reg.nodes() {
            if let Some(parent) = node.parent_code.as_deref().and_then(|p| reg.get_node(p)) {
                assert!(node.level > parent.level, "{} not deeper than {}", node.code, parent.code);
            }
        }
    }

    #[test]
    fn dangling_parent_becomes_de_facto_root() {
        let mut reg = TaxonomyRegistry::new();
        reg.add_node(category("ORPHAN.CHILD", "Orphan", "MISSING")).unwrap();
        assert!(reg.get_node("ORPHAN.CHILD").is_some());
        // Partial path: just the node itself.
        assert_eq!(reg.path_to_root("ORPHAN.CHILD").len(), 1);
        // Still reachable from the roots.
        assert_eq!(reg.root_codes(), &["ORPHAN.CHILD".to_string()]);
        assert!(reg.format_hierarchy(None).starts_with("ORPHAN.CHILD: Orphan"));
    }

    #[test]
    fn late_arriving_parent_adopts_orphan() {
        let mut reg = TaxonomyRegistry::new();
        reg.add_node(category("MISSING.CHILD", "Child", "MISSING")).unwrap();
        assert!(reg.root_codes().contains(&"MISSING.CHILD".to_string()));

        reg.add_node(root("MISSING", "Late Parent")).unwrap();
        // Root status moves to the parent; the child is linked under it.
        assert_eq!(reg.root_codes(), &["MISSING".to_string()]);
        let children: Vec<&str> = reg
            .get_children("MISSING")
            .iter()
            .map(|n| n.code.as_str())
            .collect();
        assert_eq!(children, vec!["MISSING.CHILD"]);
        assert_eq!(reg.path_to_root("MISSING.CHILD").len(), 2);
    }

    #[test]
    fn extend_relinks_orphans_when_parent_arrives() {
        let mut reg = TaxonomyRegistry::new();
        reg.add_node(category("LATE.CAT", "Category", "LATE")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ext.json");
        let mut ext = TaxonomyRegistry::new();
        ext.add_node(root("LATE", "Late Line")).unwrap();
        ext.save(&path).unwrap();

        reg.extend_from_file(&path).unwrap();
        assert_eq!(reg.root_codes(), &["LATE".to_string()]);
        assert!(reg.format_hierarchy(None).contains("\n  LATE.CAT: Category"));
    }

    #[test]
    fn path_to_root_ordered_leaf_first() {
        let reg = sample_registry();
        let path: Vec<&str> = reg
            .path_to_root("PROP.BLDG.DEBRISREM")
            .iter()
            .map(|n| n.code.as_str())
            .collect();
        assert_eq!(path, vec!["PROP.BLDG.DEBRISREM", "PROP.BLDG", "PROP"]);
    }

    #[test]
    fn find_by_name_partial_and_exact() {
        let reg = sample_registry();
        assert_eq!(reg.find_nodes_by_name("building", false).len(), 1);
        assert_eq!(reg.find_nodes_by_name("BUILDING COVERAGE", true).len(), 1);
        assert!(reg.find_nodes_by_name("building", true).is_empty());
    }

    #[test]
    fn nodes_at_level_filters() {
        let reg = sample_registry();
        assert_eq!(reg.nodes_at_level(TaxonomyLevel::CoverageCategory).len(), 2);
        assert_eq!(reg.nodes_at_level(TaxonomyLevel::CoverageAttribute).len(), 0);
    }

    #[test]
    fn lookup_miss_returns_none_or_empty() {
        let reg = sample_registry();
        assert!(reg.get_node("NOPE").is_none());
        assert!(reg.get_children("NOPE").is_empty());
        assert!(reg.path_to_root("NOPE").is_empty());
    }

    #[test]
    fn save_load_roundtrip_field_for_field() {
        let reg = sample_registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy.json");
        reg.save(&path).unwrap();

        let loaded = TaxonomyRegistry::load(&path).unwrap();
        assert_eq!(loaded.len(), reg.len());
        assert_eq!(loaded.root_codes(), reg.root_codes());
        for node in reg.nodes() {
            assert_eq!(loaded.get_node(&node.code), Some(node));
        }
    }

    #[test]
    fn load_fails_fast_on_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"nodes\": 12}").unwrap();
        assert!(matches!(
            TaxonomyRegistry::load(&path),
            Err(TaxonomyError::Malformed { .. })
        ));
    }

    #[test]
    fn load_rejects_key_code_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mismatch.json");
        std::fs::write(
            &path,
            r#"{"nodes": {"WRONG": {"code": "PROP", "name": "Property", "level": "LINE_OF_BUSINESS"}}, "root_nodes": ["PROP"]}"#,
        )
        .unwrap();
        assert!(matches!(
            TaxonomyRegistry::load(&path),
            Err(TaxonomyError::KeyCodeMismatch { .. })
        ));
    }

    #[test]
    fn extend_does_not_overwrite_existing_codes() {
        let reg = sample_registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ext.json");

        let mut ext = TaxonomyRegistry::new();
        ext.add_node(root("MARINE", "Marine Insurance")).unwrap();
        let mut renamed = root("PROP", "Renamed Property");
        renamed.description = "should not replace".into();
        ext.add_node(renamed).unwrap();
        ext.save(&path).unwrap();

        let mut reg = reg;
        reg.extend_from_file(&path).unwrap();
        assert!(reg.get_node("MARINE").is_some());
        assert_eq!(reg.get_node("PROP").unwrap().name, "Property Insurance");
    }

    #[test]
    fn format_hierarchy_indents_children() {
        let reg = sample_registry();
        let text = reg.format_hierarchy(Some("PROP"));
        assert!(text.starts_with("PROP: Property Insurance"));
        assert!(text.contains("\n  PROP.BLDG: Building Coverage"));
        assert!(text.contains("\n    PROP.BLDG.DEBRISREM: Debris Removal"));
    }
}

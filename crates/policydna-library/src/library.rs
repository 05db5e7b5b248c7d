//! Clause library: id-keyed store with lookups, relevance search, and JSON
//! persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use policydna_core::score::{
    SEARCH_MIN_RELEVANCE, SEARCH_NAME_FLOOR, SEARCH_NAME_WEIGHT, SEARCH_SEQUENCE_WEIGHT,
    SEARCH_TERM_WEIGHT,
};
use policydna_core::text;

use crate::clause::{ClauseType, StandardClause};
use crate::error::LibraryError;

/// Persisted library shape.
#[derive(Serialize, Deserialize)]
struct LibraryFile {
    clauses: Vec<StandardClause>,
}

/// In-memory standard clause library.
///
/// Like the taxonomy registry, mutation happens at setup; matching reads
/// through shared references.
#[derive(Debug, Clone, Default)]
pub struct ClauseLibrary {
    clauses: BTreeMap<String, StandardClause>,
}

impl ClauseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a clause; duplicate ids are rejected.
    pub fn add_clause(&mut self, clause: StandardClause) -> Result<(), LibraryError> {
        if self.clauses.contains_key(&clause.id) {
            return Err(LibraryError::DuplicateId(clause.id));
        }
        self.clauses.insert(clause.id.clone(), clause);
        Ok(())
    }

    pub fn get_clause(&self, id: &str) -> Option<&StandardClause> {
        self.clauses.get(id)
    }

    /// Clauses filed under exactly this taxonomy code.
    pub fn clauses_by_taxonomy(&self, code: &str) -> Vec<&StandardClause> {
        self.clauses
            .values()
            .filter(|c| c.taxonomy_code == code)
            .collect()
    }

    pub fn clauses_by_type(&self, clause_type: ClauseType) -> Vec<&StandardClause> {
        self.clauses
            .values()
            .filter(|c| c.clause_type == clause_type)
            .collect()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &StandardClause> {
        self.clauses.values()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Relevance-ranked free-text search over clause names and wording.
    ///
    /// Relevance blends three signals: a floor when the query appears in the
    /// clause name, key-term containment of the query in the clause, and raw
    /// sequence similarity. Results below the minimum relevance are dropped;
    /// ties break on clause id so output order is stable.
    pub fn search(&self, query: &str) -> Vec<(&StandardClause, f64)> {
        let normalized_query = text::normalize(query);
        if normalized_query.is_empty() {
            return Vec::new();
        }
        let query_terms = text::terms_of_normalized(&normalized_query);

        let mut hits: Vec<(&StandardClause, f64)> = self
            .clauses
            .values()
            .filter_map(|clause| {
                let name_score = if text::normalize(&clause.name).contains(&normalized_query) {
                    SEARCH_NAME_FLOOR
                } else {
                    0.0
                };
                let term_score = text::containment(&query_terms, &clause.key_terms);
                let seq_score = text::sequence_ratio(&normalized_query, &clause.normalized_text);

                let relevance = SEARCH_NAME_WEIGHT * name_score
                    + SEARCH_TERM_WEIGHT * term_score
                    + SEARCH_SEQUENCE_WEIGHT * seq_score;
                (relevance >= SEARCH_MIN_RELEVANCE).then_some((clause, relevance))
            })
            .collect();

        hits.sort_by(|(a, ra), (b, rb)| {
            rb.partial_cmp(ra)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits
    }

    /// Write the library to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), LibraryError> {
        let file = LibraryFile {
            clauses: self.clauses.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| {
            LibraryError::Malformed { path: path.to_path_buf(), source }
        })?;
        fs::write(path, json).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a library from a JSON file.
    ///
    /// Normalized text and key terms are recomputed from each clause's
    /// wording, so files may omit them and stale values never survive a
    /// load; duplicates in the file fail the load.
    pub fn load(path: &Path) -> Result<Self, LibraryError> {
        let raw = fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: LibraryFile = serde_json::from_str(&raw).map_err(|source| {
            LibraryError::Malformed { path: path.to_path_buf(), source }
        })?;

        let mut library = Self::new();
        for mut clause in file.clauses {
            clause.rederive();
            library.add_clause(clause)?;
        }
        debug!(clauses = library.len(), path = %path.display(), "loaded clause library");
        Ok(library)
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("taxonomy file not found or unreadable: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed taxonomy data in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("node entry keyed '{key}' declares code '{code}'")]
    KeyCodeMismatch { key: String, code: String },

    #[error("duplicate taxonomy code: {0}")]
    DuplicateCode(String),

    #[error("node {code} at level {level} is not deeper than parent {parent} at level {parent_level}")]
    LevelOrder {
        code: String,
        level: &'static str,
        parent: String,
        parent_level: &'static str,
    },
}

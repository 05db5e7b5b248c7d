use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("cannot write policy structure to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize policy structure: {0}")]
    Serialize(#[from] serde_json::Error),
}

//! Policy structure assembly.
//!
//! The builder takes the augmented elements (mapped and normalized), the
//! relationships between them, and document metadata, and produces one
//! serializable [`PolicyStructure`]: a taxonomy-keyed tree of elements,
//! a document summary, and a coverage summary.

mod builder;
mod error;
mod structure;

pub use builder::PolicyStructureBuilder;
pub use error::StructureError;
pub use structure::{
    CoverageEntry, CoverageSummary, PolicyStructure, StructureSummary, TaxonomyTreeNode,
};

//! Hierarchical taxonomy of standardized insurance coverage categories.
//!
//! The registry holds a forest of [`TaxonomyNode`]s keyed by dotted codes
//! (`PROP.BLDG.DEBRISREM`), loaded from the built-in ISO/NAIC/ACORD-derived
//! set or from persisted JSON, and read-only during matching.

mod builtin;
mod error;
mod node;
mod registry;

pub use builtin::builtin_registry;
pub use error::TaxonomyError;
pub use node::{TaxonomyLevel, TaxonomyNode};
pub use registry::TaxonomyRegistry;

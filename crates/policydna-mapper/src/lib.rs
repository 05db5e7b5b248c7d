//! Taxonomy mapping: assigns coverage-taxonomy codes to policy elements.
//!
//! Several independent rules each propose candidate codes with confidences;
//! the mapper combines them per code by maximum, folds in standard-clause
//! evidence when an element was normalized to one, and falls back to the
//! unclassified sentinel when nothing clears the confidence floor.

mod error;
mod mapper;
mod rules;

pub use error::MapperError;
pub use mapper::{ConfidenceStats, TaxonomyMapper};
pub use rules::MappingRule;

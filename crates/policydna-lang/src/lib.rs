//! Language analysis over extracted policy elements.
//!
//! Three passes, usually run in this order by the normalizer:
//! equivalence detection (does an element restate a standard clause),
//! uniqueness detection (which provisions have no standard counterpart),
//! and normalization (rewrite equivalent elements to canonical wording).

mod equivalence;
mod normalizer;
mod uniqueness;

pub use equivalence::{comparison_clause_type, Equivalence, EquivalenceDetector};
pub use normalizer::{LanguageNormalizer, NormalizationReport};
pub use uniqueness::UniqueProvisionDetector;

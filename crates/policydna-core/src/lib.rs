//! Shared types and text primitives for the PolicyDNA workspace.
//!
//! Everything downstream builds on these: the element and mapping models,
//! the normalization/similarity functions, and the scoring constants.

pub mod element;
pub mod mapping;
pub mod score;
pub mod text;

pub use element::{
    ElementType, NormalizationSource, PolicyElement, Relationship, UniquenessAnalysis,
};
pub use mapping::{MappingMethod, MappingResult, TaxonomyMapping};
pub use score::MatchConfig;

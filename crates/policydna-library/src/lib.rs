//! Library of standard insurance clauses.
//!
//! Each [`StandardClause`] carries canonical wording plus precomputed
//! normalized text and key terms, so equivalence detection never has to
//! re-derive them per comparison. The [`ClauseLibrary`] indexes clauses by
//! id and serves taxonomy/type lookups and relevance-ranked text search.

mod builtin;
mod clause;
mod error;
mod library;

pub use builtin::builtin_library;
pub use clause::{ClauseType, StandardClause};
pub use error::LibraryError;
pub use library::ClauseLibrary;

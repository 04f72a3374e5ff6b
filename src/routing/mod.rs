//! Suffix-based routing of files to analysis back-ends.
//!
//! - [`rules`]: the static routing tables: unambiguous suffixes per back-end,
//!   ambiguous suffixes with their ordered alternatives, and the fallback.
//! - [`classifier`]: pure functions over those tables: detection with hint
//!   override, confidence scoring, ambiguity lookup and the reverse index.

pub mod classifier;
pub mod rules;

pub use classifier::{classify, confidence, detect, extensions_for, is_ambiguous};
pub use rules::FALLBACK_BACKEND;

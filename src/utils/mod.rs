//! Shared utilities.
//!
//! - [`encoding`] - Variable-length integer and delta encoding for postings
//! - [`tokenizer`] - Normalization pipeline and word splitting

pub mod encoding;
pub mod tokenizer;

pub use encoding::*;
pub use tokenizer::*;

//! Query evaluation and ranking.

pub mod engine;
pub mod scorer;

pub use engine::QueryEngine;
pub use scorer::{RankedHit, compare, rank, score};

//! # Sift - Embedded Persistent Substring Search
//!
//! Sift is an in-process full-text search library: it indexes the text of
//! arbitrary typed records into a persistent directory and answers
//! multi-token, case/accent-insensitive **substring** queries with
//! relevance ranking, caller-supplied boosting, and categorical filtering.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - The persistent [`Index`] handle, suffix trie, filter
//!   index, document store, and snapshot reader/writer
//! - [`query`] - Query evaluation and scoring
//! - [`utils`] - Tokenization and postings encoding
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use sift::Index;
//!
//! #[derive(Clone, Serialize, Deserialize)]
//! struct Movie {
//!     id: u64,
//!     title: String,
//! }
//!
//! # fn main() -> sift::Result<()> {
//! let index: Index<Movie> = Index::open("/tmp/movies-index")?;
//!
//! let movies = vec![Movie { id: 1, title: "Vesmírná odysea".into() }];
//! index.add_documents(&movies, |m| m.id, |m| m.title.clone())?;
//!
//! // Substring match, accent-insensitive: finds "odysea" via "dys"
//! for movie in index.search("dys", None)? {
//!     println!("{}", movie.title);
//! }
//!
//! index.dispose()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Performance
//!
//! Every suffix of every indexed word lives in a shared prefix trie, so a
//! query token resolves in time proportional to its length plus the number
//! of matches, independent of corpus size. Document sets are Roaring
//! bitmaps, making multi-token intersection and filter restriction cheap.
//! Searches take a shared read lock and run concurrently without blocking
//! each other; mutation is single-writer.

pub mod error;
pub mod index;
pub mod query;
pub mod utils;

pub use error::{Error, Result};
pub use index::types::DocId;
pub use index::{AddOptions, Index};
pub use utils::tokenizer::Tokenizer;

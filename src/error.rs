//! Error taxonomy for index operations.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The index path is invalid or unusable at construction time.
    #[error("invalid index path {path:?}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    /// An operation was attempted on a disposed handle.
    #[error("index has been disposed")]
    Disposed,

    /// The on-disk snapshot is corrupt or unreadable.
    #[error("corrupt snapshot ({file}): {reason}")]
    Consistency { file: String, reason: String },

    /// A caller-supplied selector produced an unusable value for one
    /// document. Documents accepted earlier in the batch stay indexed.
    #[error("selector produced an unusable value for document {doc_id}: {reason}")]
    Selector { doc_id: u64, reason: String },

    /// JSON (de)serialization failed outside snapshot loading.
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn consistency(file: &str, reason: impl Into<String>) -> Self {
        Error::Consistency {
            file: file.to_string(),
            reason: reason.into(),
        }
    }
}

use serde::{Deserialize, Serialize};

/// Externally supplied stable document identity
pub type DocId = u64;

/// Snapshot format version; bumped on any layout change
pub const FORMAT_VERSION: u32 = 1;

/// Magic prefix of `docs.bin`
pub const DOCS_MAGIC: u32 = u32::from_le_bytes(*b"sdoc");

/// Magic prefix of `terms.dict`
pub const DICT_MAGIC: u32 = u32::from_le_bytes(*b"sdic");

pub const META_FILE: &str = "meta.json";
pub const DOCS_FILE: &str = "docs.bin";
pub const DICT_FILE: &str = "terms.dict";
pub const POSTINGS_FILE: &str = "terms.postings";

/// One logical document as held by the document store.
///
/// The payload and ranking metadata are fixed by the first insert under a
/// given id; later inserts only contribute more searchable text and may
/// lower `text_len`.
#[derive(Debug, Clone)]
pub struct StoredDocument<P> {
    pub payload: P,
    pub boost: f32,
    pub filter_tag: Option<String>,
    /// Char length of the shortest text indexed under this id
    pub text_len: u32,
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub doc_count: u64,
    pub term_count: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Default for IndexMeta {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            doc_count: 0,
            term_count: 0,
            created_at: 0,
            updated_at: 0,
        }
    }
}

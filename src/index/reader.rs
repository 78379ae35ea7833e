//! Snapshot loader: rebuilds the in-memory structures from the index
//! directory written by [`crate::index::writer`].
//!
//! Loading fails loudly with a [`crate::Error::Consistency`] naming the
//! offending file rather than degrading to a partial index: a snapshot is
//! either reconstructed exactly or rejected.

use crate::error::{Error, Result};
use crate::index::filter::FilterIndex;
use crate::index::store::DocumentStore;
use crate::index::trie::SuffixTrie;
use crate::index::types::*;
use crate::utils::encoding::{delta_decode, read_f32_le, read_u32_le, read_u64_le};
use memmap2::Mmap;
use roaring::RoaringTreemap;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Fully reconstructed index state
pub struct Snapshot<P> {
    pub meta: IndexMeta,
    pub store: DocumentStore<P>,
    pub filters: FilterIndex,
    pub trie: SuffixTrie,
    pub lexicon: BTreeMap<String, RoaringTreemap>,
}

/// True if `dir` contains a prior snapshot.
///
/// A directory holding any binary snapshot file without the manifest is a
/// damaged snapshot, not an empty one; opening it as empty would let the
/// next flush overwrite the surviving data.
pub fn snapshot_exists(dir: &Path) -> Result<bool> {
    if dir.join(META_FILE).exists() {
        return Ok(true);
    }
    for name in [DOCS_FILE, DICT_FILE, POSTINGS_FILE] {
        if dir.join(name).exists() {
            return Err(Error::consistency(
                META_FILE,
                format!("manifest missing while {name} exists"),
            ));
        }
    }
    Ok(false)
}

/// Load and verify a snapshot from `dir`
pub fn load_snapshot<P: DeserializeOwned>(dir: &Path) -> Result<Snapshot<P>> {
    let meta = read_meta(dir)?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::consistency(
            META_FILE,
            format!(
                "unsupported format version {} (expected {})",
                meta.version, FORMAT_VERSION
            ),
        ));
    }

    let (store, filters) = read_documents::<P>(dir)?;
    let (lexicon, trie) = read_term_index(dir)?;

    if store.len() as u64 != meta.doc_count {
        return Err(Error::consistency(
            DOCS_FILE,
            format!(
                "document count mismatch: meta says {}, file has {}",
                meta.doc_count,
                store.len()
            ),
        ));
    }
    if lexicon.len() as u64 != meta.term_count {
        return Err(Error::consistency(
            DICT_FILE,
            format!(
                "term count mismatch: meta says {}, file has {}",
                meta.term_count,
                lexicon.len()
            ),
        ));
    }

    tracing::debug!(
        docs = store.len(),
        terms = lexicon.len(),
        trie_nodes = trie.node_count(),
        "snapshot loaded"
    );

    Ok(Snapshot {
        meta,
        store,
        filters,
        trie,
        lexicon,
    })
}

/// Map an io failure while parsing `file` to a consistency error
fn ioc<T>(file: &str, result: std::io::Result<T>) -> Result<T> {
    result.map_err(|e| Error::consistency(file, e.to_string()))
}

fn read_meta(dir: &Path) -> Result<IndexMeta> {
    let file = File::open(dir.join(META_FILE))
        .map_err(|e| Error::consistency(META_FILE, e.to_string()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::consistency(META_FILE, e.to_string()))
}

/// Read the document table, rebuilding the store and the filter index
fn read_documents<P: DeserializeOwned>(dir: &Path) -> Result<(DocumentStore<P>, FilterIndex)> {
    let file = File::open(dir.join(DOCS_FILE))
        .map_err(|e| Error::consistency(DOCS_FILE, e.to_string()))?;
    let mut reader = BufReader::new(file);

    let magic = ioc(DOCS_FILE, read_u32_le(&mut reader))?;
    if magic != DOCS_MAGIC {
        return Err(Error::consistency(DOCS_FILE, "bad magic"));
    }
    let version = ioc(DOCS_FILE, read_u32_le(&mut reader))?;
    if version != FORMAT_VERSION {
        return Err(Error::consistency(
            DOCS_FILE,
            format!("unsupported format version {version}"),
        ));
    }

    let count = ioc(DOCS_FILE, read_u64_le(&mut reader))?;
    let mut store = DocumentStore::new();
    let mut filters = FilterIndex::new();

    for _ in 0..count {
        let id = ioc(DOCS_FILE, read_u64_le(&mut reader))?;
        let boost = ioc(DOCS_FILE, read_f32_le(&mut reader))?;
        if !boost.is_finite() || boost <= 0.0 {
            return Err(Error::consistency(
                DOCS_FILE,
                format!("document {id} has invalid boost {boost}"),
            ));
        }
        let text_len = ioc(DOCS_FILE, read_u32_le(&mut reader))?;

        let mut flag = [0u8; 1];
        ioc(DOCS_FILE, reader.read_exact(&mut flag))?;
        let filter_tag = match flag[0] {
            0 => None,
            1 => {
                let len = ioc(DOCS_FILE, read_u32_le(&mut reader))? as usize;
                let mut bytes = vec![0u8; len];
                ioc(DOCS_FILE, reader.read_exact(&mut bytes))?;
                let tag = String::from_utf8(bytes)
                    .map_err(|e| Error::consistency(DOCS_FILE, e.to_string()))?;
                Some(tag)
            }
            other => {
                return Err(Error::consistency(
                    DOCS_FILE,
                    format!("document {id} has invalid tag flag {other}"),
                ));
            }
        };

        let payload_len = ioc(DOCS_FILE, read_u32_le(&mut reader))? as usize;
        let mut payload_bytes = vec![0u8; payload_len];
        ioc(DOCS_FILE, reader.read_exact(&mut payload_bytes))?;
        let payload: P = serde_json::from_slice(&payload_bytes).map_err(|e| {
            Error::consistency(DOCS_FILE, format!("document {id} payload: {e}"))
        })?;

        if let Some(tag) = &filter_tag {
            filters.insert(tag, id);
        }
        store.upsert(
            id,
            StoredDocument {
                payload,
                boost,
                filter_tag,
                text_len,
            },
        );
    }

    Ok((store, filters))
}

/// Read the term dictionary, decode postings from the memory-mapped
/// postings file, and rebuild the suffix trie
fn read_term_index(dir: &Path) -> Result<(BTreeMap<String, RoaringTreemap>, SuffixTrie)> {
    let file = File::open(dir.join(DICT_FILE))
        .map_err(|e| Error::consistency(DICT_FILE, e.to_string()))?;
    let mut reader = BufReader::new(file);

    let magic = ioc(DICT_FILE, read_u32_le(&mut reader))?;
    if magic != DICT_MAGIC {
        return Err(Error::consistency(DICT_FILE, "bad magic"));
    }
    let version = ioc(DICT_FILE, read_u32_le(&mut reader))?;
    if version != FORMAT_VERSION {
        return Err(Error::consistency(
            DICT_FILE,
            format!("unsupported format version {version}"),
        ));
    }

    let postings_file = File::open(dir.join(POSTINGS_FILE))
        .map_err(|e| Error::consistency(POSTINGS_FILE, e.to_string()))?;
    let postings_len = ioc(POSTINGS_FILE, postings_file.metadata().map(|m| m.len()))?;
    // mmap of a zero-length file fails on some platforms
    let mmap = if postings_len > 0 {
        Some(unsafe {
            Mmap::map(&postings_file).map_err(|e| Error::consistency(POSTINGS_FILE, e.to_string()))?
        })
    } else {
        None
    };
    let postings: &[u8] = mmap.as_deref().unwrap_or(&[]);

    let count = ioc(DICT_FILE, read_u64_le(&mut reader))?;
    let mut lexicon = BTreeMap::new();
    let mut trie = SuffixTrie::new();

    for _ in 0..count {
        let term_len = ioc(DICT_FILE, read_u32_le(&mut reader))? as usize;
        let mut term_bytes = vec![0u8; term_len];
        ioc(DICT_FILE, reader.read_exact(&mut term_bytes))?;
        let term = String::from_utf8(term_bytes)
            .map_err(|e| Error::consistency(DICT_FILE, e.to_string()))?;

        let offset = ioc(DICT_FILE, read_u64_le(&mut reader))? as usize;
        let enc_len = ioc(DICT_FILE, read_u32_le(&mut reader))? as usize;
        let doc_freq = ioc(DICT_FILE, read_u32_le(&mut reader))? as u64;

        let end = offset
            .checked_add(enc_len)
            .filter(|&end| end <= postings.len())
            .ok_or_else(|| {
                Error::consistency(
                    POSTINGS_FILE,
                    format!("term {term:?} postings range out of bounds"),
                )
            })?;
        let ids = delta_decode(&postings[offset..end]).ok_or_else(|| {
            Error::consistency(
                POSTINGS_FILE,
                format!("term {term:?} postings are truncated"),
            )
        })?;
        if ids.len() as u64 != doc_freq {
            return Err(Error::consistency(
                DICT_FILE,
                format!(
                    "term {term:?} doc_freq mismatch: dict says {doc_freq}, postings have {}",
                    ids.len()
                ),
            ));
        }

        let bitmap: RoaringTreemap = ids.into_iter().collect();
        trie.insert_postings(&term, &bitmap);
        lexicon.insert(term, bitmap);
    }

    Ok((lexicon, trie))
}

//! Snapshot writer: serializes the index structures to the index directory.
//!
//! Layout, all little-endian, each binary file prefixed with a magic and a
//! format version:
//!
//! - `meta.json` — counts and timestamps
//! - `docs.bin` — per document: id, boost, text length, optional tag,
//!   JSON-encoded payload
//! - `terms.dict` — per distinct normalized word: the word, its postings
//!   offset/length, and its document frequency
//! - `terms.postings` — concatenated delta-varint-encoded sorted id lists
//!
//! The filter index is not written separately; it is rebuilt from the tags
//! in `docs.bin` at load time.

use crate::error::{Error, Result};
use crate::index::store::DocumentStore;
use crate::index::types::*;
use crate::utils::encoding::{delta_encode, write_f32_le, write_u32_le, write_u64_le};
use roaring::RoaringTreemap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Narrow a length to its u32 on-disk field, failing loudly instead of
/// silently truncating the snapshot
fn len_as_u32(len: usize, file: &str, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        Error::consistency(file, format!("{what} of {len} overflows its u32 field"))
    })
}

/// Seconds since the unix epoch, for meta timestamps
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Write a full snapshot of the index structures into `dir`
pub fn write_snapshot<P: Serialize>(
    dir: &Path,
    meta: &IndexMeta,
    store: &DocumentStore<P>,
    lexicon: &BTreeMap<String, RoaringTreemap>,
) -> Result<()> {
    write_documents(dir, store)?;
    write_term_index(dir, lexicon)?;
    write_meta(dir, meta)?;
    tracing::debug!(
        docs = store.len(),
        terms = lexicon.len(),
        "snapshot written"
    );
    Ok(())
}

fn write_meta(dir: &Path, meta: &IndexMeta) -> Result<()> {
    let file = File::create(dir.join(META_FILE))?;
    serde_json::to_writer_pretty(BufWriter::new(file), meta)?;
    Ok(())
}

/// Write the document table
fn write_documents<P: Serialize>(dir: &Path, store: &DocumentStore<P>) -> Result<()> {
    let mut file = BufWriter::new(File::create(dir.join(DOCS_FILE))?);

    write_u32_le(&mut file, DOCS_MAGIC)?;
    write_u32_le(&mut file, FORMAT_VERSION)?;
    write_u64_le(&mut file, store.len() as u64)?;

    for (id, doc) in store.iter_sorted() {
        write_u64_le(&mut file, id)?;
        write_f32_le(&mut file, doc.boost)?;
        write_u32_le(&mut file, doc.text_len)?;

        match &doc.filter_tag {
            Some(tag) => {
                file.write_all(&[1u8])?;
                let bytes = tag.as_bytes();
                write_u32_le(&mut file, len_as_u32(bytes.len(), DOCS_FILE, "filter tag")?)?;
                file.write_all(bytes)?;
            }
            None => file.write_all(&[0u8])?,
        }

        let payload = serde_json::to_vec(&doc.payload)?;
        write_u32_le(&mut file, len_as_u32(payload.len(), DOCS_FILE, "payload")?)?;
        file.write_all(&payload)?;
    }

    file.flush()?;
    Ok(())
}

/// Write the term dictionary and postings files
fn write_term_index(dir: &Path, lexicon: &BTreeMap<String, RoaringTreemap>) -> Result<()> {
    let mut dict_file = BufWriter::new(File::create(dir.join(DICT_FILE))?);
    let mut postings_file = BufWriter::new(File::create(dir.join(POSTINGS_FILE))?);

    write_u32_le(&mut dict_file, DICT_MAGIC)?;
    write_u32_le(&mut dict_file, FORMAT_VERSION)?;
    write_u64_le(&mut dict_file, lexicon.len() as u64)?;

    let mut postings_offset: u64 = 0;

    // BTreeMap iteration keeps the dictionary sorted on disk
    for (term, ids) in lexicon {
        let sorted_ids: Vec<DocId> = ids.iter().collect();

        let mut encoded = Vec::new();
        delta_encode(&sorted_ids, &mut encoded);

        let term_bytes = term.as_bytes();
        write_u32_le(&mut dict_file, len_as_u32(term_bytes.len(), DICT_FILE, "term")?)?;
        dict_file.write_all(term_bytes)?;
        write_u64_le(&mut dict_file, postings_offset)?;
        write_u32_le(&mut dict_file, len_as_u32(encoded.len(), DICT_FILE, "postings block")?)?;
        write_u32_le(&mut dict_file, len_as_u32(sorted_ids.len(), DICT_FILE, "doc frequency")?)?;

        postings_file.write_all(&encoded)?;
        postings_offset += encoded.len() as u64;
    }

    dict_file.flush()?;
    postings_file.flush()?;
    Ok(())
}

/// Remove the snapshot files, leaving the directory itself in place
pub fn remove_snapshot(dir: &Path) -> Result<()> {
    for name in [META_FILE, DOCS_FILE, DICT_FILE, POSTINGS_FILE] {
        let path = dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

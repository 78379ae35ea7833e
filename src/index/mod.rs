//! The persistent index handle and its lifecycle.
//!
//! [`Index`] owns three structures: the suffix trie (substring matching),
//! the filter index (categorical narrowing), and the document store
//! (payloads and ranking metadata). All three live behind one
//! reader-writer lock: searches take the shared side and never block each
//! other, mutation takes the exclusive side. The contract is
//! single-writer; the lock turns accidental concurrent misuse into
//! serialization instead of corruption.
//!
//! Lifecycle is `Open -> Disposed`, terminal. Disposal flushes and releases
//! the in-memory structures; a disposed handle fails every operation and a
//! fresh [`Index::open`] against the same path is required to continue.

pub mod filter;
pub mod reader;
pub mod store;
pub mod trie;
pub mod types;
pub mod writer;

use crate::error::{Error, Result};
use crate::query::QueryEngine;
use crate::utils::tokenizer::Tokenizer;
use filter::FilterIndex;
use parking_lot::RwLock;
use roaring::RoaringTreemap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use store::DocumentStore;
use trie::SuffixTrie;
use types::{DocId, IndexMeta, StoredDocument};

/// Optional per-document selectors for [`Index::add_documents_with`].
///
/// Absent selectors fall back to a constant boost of 1.0 and no filter tag.
pub struct AddOptions<'a, P> {
    pub boost: Option<&'a dyn Fn(&P) -> f32>,
    pub filter: Option<&'a dyn Fn(&P) -> Option<String>>,
}

impl<P> Default for AddOptions<'_, P> {
    fn default() -> Self {
        Self {
            boost: None,
            filter: None,
        }
    }
}

/// In-memory index state while the handle is open
struct Inner<P> {
    trie: SuffixTrie,
    filters: FilterIndex,
    store: DocumentStore<P>,
    /// Normalized word -> ids; the durable source the trie is rebuilt from
    lexicon: BTreeMap<String, RoaringTreemap>,
    meta: IndexMeta,
    /// In-memory state diverges from the snapshot on disk
    dirty: bool,
}

impl<P> Inner<P> {
    fn empty() -> Self {
        Self {
            trie: SuffixTrie::new(),
            filters: FilterIndex::new(),
            store: DocumentStore::new(),
            lexicon: BTreeMap::new(),
            meta: IndexMeta::default(),
            dirty: false,
        }
    }
}

/// Persistent, queryable full-text index over payloads of type `P`.
///
/// The payload is stored verbatim at first insert under an id and returned
/// verbatim from [`Index::search`].
pub struct Index<P: Serialize> {
    path: PathBuf,
    tokenizer: Tokenizer,
    /// `None` once disposed
    state: RwLock<Option<Inner<P>>>,
}

impl<P: Serialize + DeserializeOwned> Index<P> {
    /// Open or create a persistent index rooted at `path`.
    ///
    /// An existing snapshot is loaded in full; otherwise the directory is
    /// created and the index starts empty. The snapshot under a path is
    /// exclusively owned by one open instance.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_tokenizer(path, Tokenizer::default())
    }

    /// Open with a custom tokenizer. The tokenizer must match the one the
    /// snapshot was built with, since all persisted words are its output.
    pub fn open_with_tokenizer(path: impl AsRef<Path>, tokenizer: Tokenizer) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.exists() && !path.is_dir() {
            return Err(Error::Configuration {
                path,
                reason: "not a directory".to_string(),
            });
        }
        fs::create_dir_all(&path).map_err(|e| Error::Configuration {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let inner = if reader::snapshot_exists(&path)? {
            let snapshot = reader::load_snapshot::<P>(&path)?;
            Inner {
                trie: snapshot.trie,
                filters: snapshot.filters,
                store: snapshot.store,
                lexicon: snapshot.lexicon,
                meta: snapshot.meta,
                dirty: false,
            }
        } else {
            Inner::empty()
        };

        tracing::info!(path = %path.display(), docs = inner.store.len(), "index opened");

        Ok(Self {
            path,
            tokenizer,
            state: RwLock::new(Some(inner)),
        })
    }
}

impl<P: Serialize> Index<P> {
    /// Index `documents` with the default boost (1.0) and no filter tags.
    ///
    /// `id` supplies each document's stable identity; `text` selects the
    /// searchable text. The first call establishing an id fixes its stored
    /// payload; later calls under the same id only add searchable text.
    pub fn add_documents<FI, FT>(&self, documents: &[P], id: FI, text: FT) -> Result<()>
    where
        P: Clone,
        FI: Fn(&P) -> DocId,
        FT: Fn(&P) -> String,
    {
        self.add_documents_with(documents, id, text, AddOptions::default())
    }

    /// Index `documents` with optional boost and filter selectors.
    ///
    /// A selector producing an unusable value fails that document with
    /// [`Error::Selector`]; documents accepted earlier in the batch remain
    /// indexed (there is no batch rollback).
    pub fn add_documents_with<FI, FT>(
        &self,
        documents: &[P],
        id: FI,
        text: FT,
        options: AddOptions<'_, P>,
    ) -> Result<()>
    where
        P: Clone,
        FI: Fn(&P) -> DocId,
        FT: Fn(&P) -> String,
    {
        let mut guard = self.state.write();
        let inner = guard.as_mut().ok_or(Error::Disposed)?;

        for document in documents {
            let doc_id = id(document);

            let boost = match options.boost {
                Some(select) => select(document),
                None => 1.0,
            };
            if !boost.is_finite() || boost <= 0.0 {
                return Err(Error::Selector {
                    doc_id,
                    reason: format!("boost must be finite and positive, got {boost}"),
                });
            }

            let filter_tag = match options.filter {
                Some(select) => self.normalize_tag(doc_id, select(document))?,
                None => None,
            };

            let text = text(document);
            let text_len = text.chars().count() as u32;

            let is_new = inner.store.get(doc_id).is_none();
            inner.store.upsert(
                doc_id,
                StoredDocument {
                    payload: document.clone(),
                    boost,
                    filter_tag: filter_tag.clone(),
                    text_len,
                },
            );
            // First write fixed the tag; a merge must not re-tag the id
            if is_new && let Some(tag) = &filter_tag {
                inner.filters.insert(tag, doc_id);
            }

            for token in self.tokenizer.tokenize(&text) {
                inner
                    .lexicon
                    .entry(token.clone())
                    .or_default()
                    .insert(doc_id);
                inner.trie.insert(&token, doc_id);
            }
            inner.dirty = true;
        }

        Ok(())
    }

    /// Validate and normalize a selector-supplied filter tag.
    ///
    /// Empty (after trimming) means "no tag". A tag containing a split
    /// character could never equal any filter alternative, so it is
    /// rejected rather than silently stored unmatchable.
    fn normalize_tag(&self, doc_id: DocId, tag: Option<String>) -> Result<Option<String>> {
        let Some(tag) = tag else { return Ok(None) };
        let normalized = self.tokenizer.normalize(tag.trim());
        if normalized.is_empty() {
            return Ok(None);
        }
        if normalized.chars().any(|c| self.tokenizer.is_split_char(c)) {
            return Err(Error::Selector {
                doc_id,
                reason: format!("filter tag {tag:?} contains a split character"),
            });
        }
        Ok(Some(normalized))
    }

    /// Search for documents whose indexed text contains every query token
    /// as a substring of some word, optionally restricted to documents
    /// tagged with any of the whitespace-separated filter alternatives.
    ///
    /// Returns payloads best first. "No matches" is an empty vector, never
    /// an error; an empty query or filter string means "none supplied".
    pub fn search(&self, query: &str, filter: Option<&str>) -> Result<Vec<P>>
    where
        P: Clone,
    {
        let guard = self.state.read();
        let inner = guard.as_ref().ok_or(Error::Disposed)?;
        let engine = QueryEngine::new(&inner.trie, &inner.filters, &inner.store, &self.tokenizer);
        Ok(engine.execute(query, filter))
    }

    /// Empty the index: all documents, terms, and tags are discarded and
    /// the on-disk snapshot is removed. The handle stays open and usable.
    pub fn delete_documents(&self) -> Result<()> {
        let mut guard = self.state.write();
        let inner = guard.as_mut().ok_or(Error::Disposed)?;

        inner.trie.clear();
        inner.filters.clear();
        inner.store.clear();
        inner.lexicon.clear();
        inner.meta = IndexMeta::default();
        writer::remove_snapshot(&self.path)?;
        // Disk and memory now agree on "empty"
        inner.dirty = false;

        tracing::info!(path = %self.path.display(), "index emptied");
        Ok(())
    }

    /// Write all pending mutations to the snapshot. No-op when clean.
    pub fn flush(&self) -> Result<()> {
        let mut guard = self.state.write();
        let inner = guard.as_mut().ok_or(Error::Disposed)?;
        flush_inner(&self.path, inner)
    }

    /// Flush and release the index. Idempotent; once disposal succeeds,
    /// every later operation on this handle fails with [`Error::Disposed`].
    /// A failed flush leaves the handle open so dispose can be retried
    /// without losing the unflushed mutations.
    pub fn dispose(&self) -> Result<()> {
        let mut guard = self.state.write();
        if let Some(inner) = guard.as_mut() {
            flush_inner(&self.path, inner)?;
            *guard = None;
            tracing::info!(path = %self.path.display(), "index disposed");
        }
        Ok(())
    }

    /// Number of distinct documents currently indexed
    pub fn doc_count(&self) -> Result<usize> {
        let guard = self.state.read();
        let inner = guard.as_ref().ok_or(Error::Disposed)?;
        Ok(inner.store.len())
    }

    /// Directory this index persists into
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn flush_inner<P: Serialize>(path: &Path, inner: &mut Inner<P>) -> Result<()> {
    if !inner.dirty {
        return Ok(());
    }
    let now = writer::unix_now();
    if inner.meta.created_at == 0 {
        inner.meta.created_at = now;
    }
    inner.meta.updated_at = now;
    inner.meta.doc_count = inner.store.len() as u64;
    inner.meta.term_count = inner.lexicon.len() as u64;

    writer::write_snapshot(path, &inner.meta, &inner.store, &inner.lexicon)?;
    inner.dirty = false;
    Ok(())
}

impl<P: Serialize> Drop for Index<P> {
    /// Best-effort flush so durability holds on all exit paths. Errors are
    /// logged, not propagated; call [`Index::dispose`] to observe them.
    fn drop(&mut self) {
        if let Some(inner) = self.state.get_mut()
            && inner.dirty
            && let Err(e) = flush_inner(&self.path, inner)
        {
            tracing::warn!(path = %self.path.display(), error = %e, "flush on drop failed");
        }
    }
}

//! Document store: id-keyed arena of stored payloads and ranking metadata.
//!
//! Postings in the substring index carry document ids only; everything
//! needed to score or return a hit is dereferenced here, so any number of
//! suffix entries share a single stored document.

use crate::index::types::{DocId, StoredDocument};
use rustc_hash::FxHashMap;

pub struct DocumentStore<P> {
    docs: FxHashMap<DocId, StoredDocument<P>>,
}

impl<P> Default for DocumentStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> DocumentStore<P> {
    pub fn new() -> Self {
        Self {
            docs: FxHashMap::default(),
        }
    }

    /// First write under an id fixes payload, boost, and filter tag; later
    /// writes only lower the recorded text length (never raise it).
    pub fn upsert(&mut self, id: DocId, doc: StoredDocument<P>) {
        match self.docs.get_mut(&id) {
            Some(existing) => {
                existing.text_len = existing.text_len.min(doc.text_len);
            }
            None => {
                self.docs.insert(id, doc);
            }
        }
    }

    pub fn get(&self, id: DocId) -> Option<&StoredDocument<P>> {
        self.docs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn clear(&mut self) {
        self.docs.clear();
    }

    /// Documents in ascending id order, for deterministic serialization
    pub fn iter_sorted(&self) -> impl Iterator<Item = (DocId, &StoredDocument<P>)> {
        let mut ids: Vec<DocId> = self.docs.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| (id, &self.docs[&id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text_len: u32, boost: f32) -> StoredDocument<&'static str> {
        StoredDocument {
            payload: "payload",
            boost,
            filter_tag: None,
            text_len,
        }
    }

    #[test]
    fn test_first_write_wins_for_metadata() {
        let mut store = DocumentStore::new();
        store.upsert(
            1,
            StoredDocument {
                payload: "original",
                boost: 2.0,
                filter_tag: Some("kruh".to_string()),
                text_len: 10,
            },
        );
        store.upsert(
            1,
            StoredDocument {
                payload: "replacement",
                boost: 9.0,
                filter_tag: Some("ctverec".to_string()),
                text_len: 20,
            },
        );

        let stored = store.get(1).unwrap();
        assert_eq!(stored.payload, "original");
        assert_eq!(stored.boost, 2.0);
        assert_eq!(stored.filter_tag.as_deref(), Some("kruh"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_text_len_only_shrinks() {
        let mut store = DocumentStore::new();
        store.upsert(1, doc(10, 1.0));
        store.upsert(1, doc(4, 1.0));
        assert_eq!(store.get(1).unwrap().text_len, 4);

        store.upsert(1, doc(30, 1.0));
        assert_eq!(store.get(1).unwrap().text_len, 4);
    }

    #[test]
    fn test_iter_sorted_order() {
        let mut store = DocumentStore::new();
        store.upsert(3, doc(1, 1.0));
        store.upsert(1, doc(1, 1.0));
        store.upsert(2, doc(1, 1.0));

        let ids: Vec<DocId> = store.iter_sorted().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}

//! Query evaluation: tokenize, intersect, filter, rank.
//!
//! The engine reads the substring index, filter index, and document store;
//! it never mutates them, which is what makes unbounded concurrent
//! searches safe under a shared read lock.

use crate::index::filter::FilterIndex;
use crate::index::store::DocumentStore;
use crate::index::trie::SuffixTrie;
use crate::index::types::StoredDocument;
use crate::query::scorer::{RankedHit, compare, score};
use crate::utils::tokenizer::Tokenizer;
use roaring::RoaringTreemap;

/// Borrowing view over the index structures for one search
pub struct QueryEngine<'a, P> {
    trie: &'a SuffixTrie,
    filters: &'a FilterIndex,
    store: &'a DocumentStore<P>,
    tokenizer: &'a Tokenizer,
}

impl<'a, P: Clone> QueryEngine<'a, P> {
    pub fn new(
        trie: &'a SuffixTrie,
        filters: &'a FilterIndex,
        store: &'a DocumentStore<P>,
        tokenizer: &'a Tokenizer,
    ) -> Self {
        Self {
            trie,
            filters,
            store,
            tokenizer,
        }
    }

    /// Evaluate `query` with an optional categorical filter and return the
    /// matching payloads, best first.
    ///
    /// Every distinct query token must match somewhere in a document's
    /// indexed text (implicit conjunction); filter alternatives are OR-ed
    /// with each other and AND-ed with the text query. An empty or
    /// whitespace-only query yields an empty result, never an error.
    pub fn execute(&self, query: &str, filter: Option<&str>) -> Vec<P> {
        let mut tokens = self.tokenizer.tokenize(query);
        tokens.sort_unstable();
        tokens.dedup();
        if tokens.is_empty() {
            return Vec::new();
        }

        // Intersect postings across tokens, short-circuiting the moment
        // the running intersection goes empty
        let mut candidates: Option<RoaringTreemap> = None;
        for token in &tokens {
            let postings = self.trie.query(token);
            if postings.is_empty() {
                return Vec::new();
            }
            let merged = match candidates {
                Some(existing) => existing & postings,
                None => postings,
            };
            if merged.is_empty() {
                return Vec::new();
            }
            candidates = Some(merged);
        }
        let mut candidates = candidates.unwrap_or_default();

        // A whitespace-only filter string means "no filter"
        if let Some(filter) = filter {
            let alternatives = self.tokenizer.tokenize(filter);
            if !alternatives.is_empty() {
                candidates &= self.filters.resolve(&alternatives);
            }
        }

        // Resolve each stored document once and carry it through ranking
        let mut hits: Vec<(RankedHit, &StoredDocument<P>)> =
            Vec::with_capacity(candidates.len() as usize);
        for id in &candidates {
            if let Some(doc) = self.store.get(id) {
                let hit = RankedHit {
                    id,
                    score: score(doc.boost, doc.text_len),
                };
                hits.push((hit, doc));
            }
        }
        hits.sort_by(|a, b| compare(&a.0, &b.0));

        hits.into_iter().map(|(_, doc)| doc.payload.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::StoredDocument;

    struct Fixture {
        trie: SuffixTrie,
        filters: FilterIndex,
        store: DocumentStore<u64>,
        tokenizer: Tokenizer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                trie: SuffixTrie::new(),
                filters: FilterIndex::new(),
                store: DocumentStore::new(),
                tokenizer: Tokenizer::default(),
            }
        }

        fn add(&mut self, id: u64, text: &str, boost: f32, tag: Option<&str>) {
            let normalized_tag = tag.map(|t| self.tokenizer.normalize(t));
            self.store.upsert(
                id,
                StoredDocument {
                    payload: id,
                    boost,
                    filter_tag: normalized_tag.clone(),
                    text_len: text.chars().count() as u32,
                },
            );
            for token in self.tokenizer.tokenize(text) {
                self.trie.insert(&token, id);
            }
            if let Some(tag) = normalized_tag {
                self.filters.insert(&tag, id);
            }
        }

        fn search(&self, query: &str, filter: Option<&str>) -> Vec<u64> {
            QueryEngine::new(&self.trie, &self.filters, &self.store, &self.tokenizer)
                .execute(query, filter)
        }
    }

    #[test]
    fn test_multi_token_conjunction() {
        let mut fx = Fixture::new();
        fx.add(1, "prvni kousek", 1.0, None);
        fx.add(2, "prvni druhy", 1.0, None);

        assert_eq!(fx.search("pr", None), vec![1, 2]);
        assert_eq!(fx.search("pr ko", None), vec![1]);
        assert_eq!(fx.search("pr dr", None), vec![2]);
        assert_eq!(fx.search("ko dr", None), Vec::<u64>::new());
    }

    #[test]
    fn test_empty_query_yields_empty() {
        let mut fx = Fixture::new();
        fx.add(1, "slovo", 1.0, None);

        assert_eq!(fx.search("", None), Vec::<u64>::new());
        assert_eq!(fx.search("   ,. ", None), Vec::<u64>::new());
    }

    #[test]
    fn test_unknown_token_short_circuits() {
        let mut fx = Fixture::new();
        fx.add(1, "slovo", 1.0, None);

        assert_eq!(fx.search("slovo zzz", None), Vec::<u64>::new());
    }

    #[test]
    fn test_repeated_query_token_counted_once() {
        let mut fx = Fixture::new();
        fx.add(1, "slovo", 1.0, None);

        assert_eq!(fx.search("slo slo", None), vec![1]);
    }

    #[test]
    fn test_filter_restricts_and_alternatives_union() {
        let mut fx = Fixture::new();
        fx.add(1, "stan velky", 1.0, Some("krabice"));
        fx.add(2, "stan maly", 1.0, Some("kruh"));
        fx.add(3, "stan stredni", 1.0, Some("trojuhelník"));

        assert_eq!(fx.search("s", Some("kruh trojuhelnik")), vec![2, 3]);
        assert_eq!(fx.search("s", Some("krabice")), vec![1]);
        assert_eq!(fx.search("s", Some("elipsa")), Vec::<u64>::new());
    }

    #[test]
    fn test_no_filter_ignores_tags() {
        let mut fx = Fixture::new();
        fx.add(1, "stan", 1.0, Some("krabice"));
        fx.add(2, "stanice", 1.0, None);

        assert_eq!(fx.search("stan", None), vec![1, 2]);
        assert_eq!(fx.search("stan", Some("  ")), vec![1, 2]);
    }

    #[test]
    fn test_filter_is_accent_insensitive() {
        let mut fx = Fixture::new();
        fx.add(3, "stan", 1.0, Some("trojuhelník"));

        assert_eq!(fx.search("s", Some("TROJUHELNIK")), vec![3]);
    }
}

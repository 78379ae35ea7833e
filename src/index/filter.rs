//! Filter index: normalized categorical tag -> document id bitmap.
//!
//! Untagged documents never appear here; a search without a filter bypasses
//! this structure entirely, so tagged and untagged documents stay equally
//! eligible.

use crate::index::types::DocId;
use roaring::RoaringTreemap;
use rustc_hash::FxHashMap;

#[derive(Default)]
pub struct FilterIndex {
    tags: FxHashMap<String, RoaringTreemap>,
}

impl FilterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` under an already-normalized tag
    pub fn insert(&mut self, tag: &str, id: DocId) {
        self.tags.entry(tag.to_string()).or_default().insert(id);
    }

    /// Union of the id sets of all `alternatives` (already normalized).
    /// A candidate passes the filter iff its tag equals any alternative.
    pub fn resolve(&self, alternatives: &[String]) -> RoaringTreemap {
        let mut result = RoaringTreemap::new();
        for alt in alternatives {
            if let Some(ids) = self.tags.get(alt) {
                result |= ids;
            }
        }
        result
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_single_tag() {
        let mut filters = FilterIndex::new();
        filters.insert("kruh", 1);
        filters.insert("kruh", 2);
        filters.insert("ctverec", 3);

        let ids: Vec<DocId> = filters.resolve(&alts(&["kruh"])).iter().collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_resolve_is_union_of_alternatives() {
        let mut filters = FilterIndex::new();
        filters.insert("kruh", 2);
        filters.insert("trojuhelnik", 3);
        filters.insert("krabice", 1);

        let ids: Vec<DocId> = filters
            .resolve(&alts(&["kruh", "trojuhelnik"]))
            .iter()
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_unknown_alternative_is_empty() {
        let mut filters = FilterIndex::new();
        filters.insert("kruh", 1);
        assert!(filters.resolve(&alts(&["elipsa"])).is_empty());
        assert!(filters.resolve(&[]).is_empty());
    }
}

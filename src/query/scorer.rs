//! Relevance scoring and result ordering.
//!
//! The score of a surviving document is `boost / max(text_len, 1)`:
//! monotonically higher for higher boost and for shorter indexed text.
//! With the default uniform boost (1.0) this ranks shorter-text documents
//! first; a caller-supplied boost whose relative spread dominates the
//! relative spread of text lengths reorders results to descending boost.

use crate::index::types::DocId;
use std::cmp::Ordering;

/// A scored candidate prior to payload materialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    pub id: DocId,
    pub score: f32,
}

/// Score one document from its stored ranking metadata
pub fn score(boost: f32, text_len: u32) -> f32 {
    boost / text_len.max(1) as f32
}

/// Result ordering: descending by score, ties broken by ascending id so
/// repeated searches return identical ordered output.
pub fn compare(a: &RankedHit, b: &RankedHit) -> Ordering {
    match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    }
}

/// Sort hits into result order
pub fn rank(hits: &mut [RankedHit]) {
    hits.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: DocId, boost: f32, text_len: u32) -> RankedHit {
        RankedHit {
            id,
            score: score(boost, text_len),
        }
    }

    #[test]
    fn test_uniform_boost_prefers_shorter_text() {
        let mut hits = vec![hit(1, 1.0, 29), hit(2, 1.0, 21), hit(3, 1.0, 11)];
        rank(&mut hits);
        let order: Vec<DocId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn test_divergent_boost_overrides_length() {
        // Boost spread (3x) dominates the length spread (under 3x)
        let mut hits = vec![hit(1, 3.0, 29), hit(2, 2.0, 21), hit(3, 1.0, 11)];
        rank(&mut hits);
        let order: Vec<DocId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let mut hits = vec![hit(9, 1.0, 10), hit(2, 1.0, 10), hit(5, 1.0, 10)];
        rank(&mut hits);
        let order: Vec<DocId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(order, vec![2, 5, 9]);
    }

    #[test]
    fn test_zero_length_guard() {
        assert_eq!(score(1.0, 0), 1.0);
    }
}

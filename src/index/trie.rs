//! Suffix trie: the substring index.
//!
//! Every suffix of every indexed word is inserted into a shared prefix
//! trie, each suffix path terminating in a postings bitmap. A query token
//! `q` is a substring of a word `w` iff `q` is a prefix of some suffix of
//! `w`, so resolving `q` is one descent to the node for `q` followed by a
//! union of all postings reachable below it. The descent is `O(|q|)` and
//! never scans the corpus.
//!
//! Memory trades against query speed: inserting a word of length `n` costs
//! `O(n²)` node visits, and postings are deduplicated per node by the
//! bitmap, so re-indexing the same (word, id) pair never grows the trie.

use crate::index::types::DocId;
use roaring::RoaringTreemap;
use rustc_hash::FxHashMap;

/// Arena-allocated prefix trie over normalized word suffixes.
pub struct SuffixTrie {
    /// Node 0 is the root
    nodes: Vec<TrieNode>,
}

#[derive(Default)]
struct TrieNode {
    children: FxHashMap<char, u32>,
    /// Documents for which some indexed word has this exact suffix
    postings: RoaringTreemap,
}

impl Default for SuffixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Insert every suffix of `token` and record `id` at each suffix's
    /// terminal node. Re-inserting an existing (token, id) pair is a no-op.
    pub fn insert(&mut self, token: &str, id: DocId) {
        let chars: Vec<char> = token.chars().collect();
        for start in 0..chars.len() {
            let mut node = 0u32;
            for &c in &chars[start..] {
                node = self.child_or_create(node, c);
            }
            self.nodes[node as usize].postings.insert(id);
        }
    }

    /// Insert every suffix of `token` with a whole postings bitmap at once.
    /// Used when rebuilding the trie from a snapshot, where all ids for a
    /// word are already collected.
    pub fn insert_postings(&mut self, token: &str, ids: &RoaringTreemap) {
        let chars: Vec<char> = token.chars().collect();
        for start in 0..chars.len() {
            let mut node = 0u32;
            for &c in &chars[start..] {
                node = self.child_or_create(node, c);
            }
            self.nodes[node as usize].postings |= ids;
        }
    }

    fn child_or_create(&mut self, node: u32, c: char) -> u32 {
        if let Some(&next) = self.nodes[node as usize].children.get(&c) {
            return next;
        }
        let next = self.nodes.len() as u32;
        self.nodes.push(TrieNode::default());
        self.nodes[node as usize].children.insert(c, next);
        next
    }

    /// All documents containing `token` as a substring of some indexed word.
    ///
    /// The empty token matches nothing.
    pub fn query(&self, token: &str) -> RoaringTreemap {
        let mut result = RoaringTreemap::new();
        if token.is_empty() {
            return result;
        }

        let mut node = 0u32;
        for c in token.chars() {
            match self.nodes[node as usize].children.get(&c) {
                Some(&next) => node = next,
                None => return result,
            }
        }

        // Union the postings of the whole subtree under the located node
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let entry = &self.nodes[n as usize];
            result |= &entry.postings;
            stack.extend(entry.children.values().copied());
        }
        result
    }

    /// Drop all nodes, keeping only an empty root
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(TrieNode::default());
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

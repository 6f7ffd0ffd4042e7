// Copyright 2019 Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Byte-indexed trie
//!
//! A generalization of [`crate::vocab::sentence_piece_vocab`]'s char-keyed, hashmap-children
//! trie to the byte-indexed, arena-backed shape this engine needs: vocabulary tokens are
//! arbitrary byte strings (not necessarily valid UTF-8 boundaries once subword prefixes are
//! spliced in), so children are indexed directly by byte value rather than by `char`, and all
//! nodes live in one `Vec` rather than being individually heap-allocated.
//!
//! Node references are indices into the arena rather than pointers, so the arena can grow
//! (the `Vec` can reallocate) without invalidating any previously handed-out reference; this is
//! the portable choice recommended when a language cannot guarantee stable-address growth.

const NO_CHILD: u32 = u32::MAX;
const ROOT: u32 = 0;

struct TrieNode {
    is_terminal: bool,
    id: i64,
    children: [u32; 256],
}

impl TrieNode {
    fn empty() -> Self {
        TrieNode {
            is_terminal: false,
            id: -1,
            children: [NO_CHILD; 256],
        }
    }
}

/// Arena-backed byte trie. Every vocabulary token is inserted as a path of bytes ending at a
/// terminal node carrying that token's id.
pub struct ByteTrie {
    nodes: Vec<TrieNode>,
}

impl ByteTrie {
    /// Creates an empty trie with capacity for roughly `expected_tokens` vocabulary entries.
    ///
    /// `original_source`'s `NemoTokenizer::loadTokenizer` sizes its node pool at
    /// `vocab_size * 3` and doubles on exhaustion; this mirrors that heuristic (`Vec::push`
    /// already doubles on growth, so only the initial reservation needs to be pinned).
    pub fn with_capacity(expected_tokens: usize) -> Self {
        let mut nodes = Vec::with_capacity(expected_tokens.saturating_mul(3).max(64));
        nodes.push(TrieNode::empty());
        ByteTrie { nodes }
    }

    fn allocate(&mut self) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(TrieNode::empty());
        index
    }

    /// Inserts `bytes` into the trie, marking its terminal node with `id`. Re-inserting the
    /// same byte string overwrites the previous id.
    pub fn insert(&mut self, bytes: &[u8], id: i64) {
        let mut current = ROOT;
        for &byte in bytes {
            let child = self.nodes[current as usize].children[byte as usize];
            current = if child == NO_CHILD {
                let new_node = self.allocate();
                self.nodes[current as usize].children[byte as usize] = new_node;
                new_node
            } else {
                child
            };
        }
        let node = &mut self.nodes[current as usize];
        node.is_terminal = true;
        node.id = id;
    }

    /// Returns `true` if `bytes` is a path in the trie (used by the segmenter to validate the
    /// continuation-prefix pre-walk optimization before relying on it).
    pub fn contains_path(&self, bytes: &[u8]) -> bool {
        self.walk_from(ROOT, bytes).is_some()
    }

    /// Walks `bytes` starting from the root, returning the node index reached, or `None` if the
    /// path does not exist.
    fn walk_from(&self, start: u32, bytes: &[u8]) -> Option<u32> {
        let mut current = start;
        for &byte in bytes {
            let child = self.nodes[current as usize].children[byte as usize];
            if child == NO_CHILD {
                return None;
            }
            current = child;
        }
        Some(current)
    }

    /// Longest-prefix match of `bytes[start..]` beginning the trie walk at `cursor` (the root,
    /// or a node already advanced through a continuation-prefix pre-walk). Returns
    /// `(matched_id, matched_len)`, the id and byte-length of the longest prefix ending at a
    /// terminal node, or `(-1, 0)` if no non-empty prefix matches.
    pub fn match_longest_from(&self, cursor: u32, bytes: &[u8]) -> (i64, usize) {
        let mut current = cursor;
        let mut best_id: i64 = -1;
        let mut best_len: usize = 0;
        for (consumed, &byte) in bytes.iter().enumerate() {
            let child = self.nodes[current as usize].children[byte as usize];
            if child == NO_CHILD {
                break;
            }
            current = child;
            let node = &self.nodes[current as usize];
            if node.is_terminal {
                best_id = node.id;
                best_len = consumed + 1;
            }
        }
        (best_id, best_len)
    }

    /// Longest-prefix match of `bytes[start..]` from the root. Convenience wrapper around
    /// [`ByteTrie::match_longest_from`] for callers that do not need a continuation pre-walk.
    pub fn match_longest(&self, bytes: &[u8], start: usize) -> (i64, usize) {
        self.match_longest_from(ROOT, &bytes[start..])
    }

    /// Advances the trie cursor through `prefix` starting at the root, returning the resulting
    /// node index. Used by the segmenter to pre-walk the continuation prefix (`##`) before
    /// matching the remainder of a WordPiece continuation piece. Returns `None` if `prefix` is
    /// not itself a path in the trie (should not happen for a well-formed WordPiece vocabulary,
    /// per the invariant documented on [`crate::vocab::Vocabulary`]).
    pub fn advance_root(&self, prefix: &[u8]) -> Option<u32> {
        self.walk_from(ROOT, prefix)
    }

    /// The root cursor, for callers that want to start a fresh walk.
    pub fn root() -> u32 {
        ROOT
    }
}

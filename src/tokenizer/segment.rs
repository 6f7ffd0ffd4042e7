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

//! # Segmenter
//!
//! Turns one pre-split fragment (`spec.md` §4.3) into a run of vocabulary ids by repeated
//! longest-prefix trie lookup (`spec.md` §4.4). Grounded on `original_source`'s
//! `searchLastMatchedToken`/`tokenize`/`encode` (the continuation-prefix pre-walk and the
//! UTF-8-safe UNK advance) and the teacher's `tokenization_utils::tokenize_wordpiece` (the
//! greedy longest-match-first loop shape, generalized here from `char`/`HashMap` to raw bytes
//! against a [`crate::trie::ByteTrie`]).

use crate::vocab::{Mode, Vocabulary};

/// Number of bytes the UTF-8 lead byte at `bytes[0]` claims for its codepoint. Used only as a
/// fallback span for UNK when no vocabulary entry matches, so a malformed lead byte still
/// advances by at least one byte rather than looping forever.
fn utf8_lead_len(byte: u8) -> usize {
    if byte & 0x80 == 0 {
        1
    } else if byte & 0xE0 == 0xC0 {
        2
    } else if byte & 0xF0 == 0xE0 {
        3
    } else if byte & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// Segments one fragment (a maximal run of non-separator bytes from the pre-splitter, or a
/// single punctuation byte in WordPiece mode) into vocabulary ids.
///
/// - Metaspace: the fragment's first piece is matched with `subword_prefix` spliced onto the
///   front (so `"hello"` is looked up as `"▁hello"`); once any bytes of the fragment have been
///   consumed, subsequent pieces are matched with no prefix, exactly like the original word-piece
///   bytes that follow.
/// - WordPiece: the fragment's first piece is matched as-is; every subsequent piece is matched
///   with `subword_prefix` (`"##"`) pre-walked onto the trie cursor, so the buffer itself never
///   needs to be reallocated with the prefix spliced in.
pub fn segment(vocab: &Vocabulary, fragment: &[u8]) -> Vec<i64> {
    if fragment.is_empty() {
        return Vec::new();
    }

    match vocab.mode {
        Mode::Metaspace => segment_metaspace(vocab, fragment),
        Mode::WordPiece => segment_wordpiece(vocab, fragment),
    }
}

fn segment_metaspace(vocab: &Vocabulary, fragment: &[u8]) -> Vec<i64> {
    let mut ids = Vec::new();
    let mut prefixed = Vec::with_capacity(vocab.subword_prefix().len() + fragment.len());
    prefixed.extend_from_slice(vocab.subword_prefix());
    prefixed.extend_from_slice(fragment);

    // Walked directly in `prefixed`-space throughout, never translated back to a
    // fragment-relative offset: the longest match starting at 0 is not guaranteed to consume
    // the whole prefix (e.g. the prefix itself is a terminal node of some unrelated shorter
    // token), so subtracting `prefix.len()` from it is not safe.
    let mut position = 0;
    while position < prefixed.len() {
        let (id, matched_len) = vocab.trie.match_longest(&prefixed, position);
        if matched_len > 0 {
            ids.push(id);
            position += matched_len;
        } else {
            let fallback = utf8_lead_len(prefixed[position]).min(prefixed.len() - position);
            ids.push(vocab.unk_id());
            position += fallback;
        }
    }

    ids
}

fn segment_wordpiece(vocab: &Vocabulary, fragment: &[u8]) -> Vec<i64> {
    let mut ids = Vec::new();

    let (id, matched_len) = vocab.trie.match_longest(fragment, 0);
    let mut offset = if matched_len > 0 {
        ids.push(id);
        matched_len
    } else {
        let fallback = utf8_lead_len(fragment[0]).min(fragment.len());
        ids.push(vocab.unk_id());
        fallback
    };

    // The continuation prefix ("##") is pre-walked once up front rather than per iteration:
    // `contains_path` confirms it is actually a trie path before trusting `advance_root`'s
    // cursor, falling back to buffer synthesis for a vocabulary where it is not.
    let prefix = vocab.subword_prefix();
    let continuation_cursor = vocab
        .trie
        .contains_path(prefix)
        .then(|| vocab.trie.advance_root(prefix))
        .flatten();

    while offset < fragment.len() {
        let remainder = &fragment[offset..];
        let (id, matched_len) = match continuation_cursor {
            Some(cursor) => vocab.trie.match_longest_from(cursor, remainder),
            None => match_longest_with_prefix(vocab, prefix, remainder),
        };
        if matched_len > 0 {
            ids.push(id);
            offset += matched_len;
        } else {
            let fallback = utf8_lead_len(remainder[0]).min(remainder.len());
            ids.push(vocab.unk_id());
            offset += fallback;
        }
    }

    ids
}

/// Slow-path continuation match for a vocabulary whose continuation prefix is not itself a
/// trie path: synthesizes `prefix ++ remainder`, matches from the root, then translates the
/// match length back to `remainder`-relative terms. A match entirely inside `prefix` (or no
/// match at all) is reported as no match, since a continuation piece must consume at least
/// one byte of `remainder`.
fn match_longest_with_prefix(vocab: &Vocabulary, prefix: &[u8], remainder: &[u8]) -> (i64, usize) {
    let mut buffer = Vec::with_capacity(prefix.len() + remainder.len());
    buffer.extend_from_slice(prefix);
    buffer.extend_from_slice(remainder);
    let (id, matched_len) = vocab.trie.match_longest(&buffer, 0);
    match matched_len.checked_sub(prefix.len()) {
        Some(len) if len > 0 => (id, len),
        _ => (-1, 0),
    }
}

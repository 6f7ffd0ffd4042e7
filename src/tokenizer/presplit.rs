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

//! # Pre-splitter
//!
//! Splits raw input text into word-like fragments ahead of segmentation (`spec.md` §4.3).
//! Generalizes the teacher's char-based `tokenization_utils::{is_whitespace, is_punctuation,
//! whitespace_tokenize, split_on_punct}` to a byte-level, lane-at-a-time classifier, modeled on
//! `original_source`'s `splitWords` (which processes `xsimd::batch<int8_t>` lanes and walks the
//! resulting bitmask with `CountTrailingZeros64`). No SIMD crate appears anywhere in the
//! retrieval pack, so the lane width here is achieved with portable `u64` bit tricks ("SIMD
//! within a register") on stable Rust instead of pulling in a new dependency; the scalar
//! fallback below is unconditionally correct and the two are cross-checked by tests.

use crate::vocab::Mode;

const LANE_BYTES: usize = 8;

fn is_ascii_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// ASCII punctuation per `spec.md` §4.3: ranges 33-47, 58-64, 91-96, 123-126. UTF-8 continuation
/// bytes (0x80-0xBF) are never in this range, so multi-byte codepoints always flow through as
/// fragment content regardless of their numeric byte values.
fn is_ascii_punctuation(byte: u8) -> bool {
    matches!(byte, 33..=47 | 58..=64 | 91..=96 | 123..=126)
}

fn is_split_byte(mode: Mode, byte: u8) -> bool {
    match mode {
        Mode::Metaspace => is_ascii_whitespace(byte),
        Mode::WordPiece => is_ascii_whitespace(byte) || is_ascii_punctuation(byte),
    }
}

/// Builds a bitmask over an 8-byte lane: bit `j` is set if `lane[j]` is a split byte for `mode`.
/// This is the lane-granular step `spec.md` §4.3 describes ("for each lane, set a bit in a
/// split-mask if that byte matches the active split set").
fn lane_split_mask(mode: Mode, lane: [u8; LANE_BYTES]) -> u64 {
    let mut mask = 0u64;
    for (j, &byte) in lane.iter().enumerate() {
        if is_split_byte(mode, byte) {
            mask |= 1u64 << j;
        }
    }
    mask
}

/// Splits `text` into fragments. A fragment is a maximal run of non-separator bytes; in
/// WordPiece mode a non-whitespace separator (punctuation) is additionally emitted as its own
/// single-byte fragment. Order is preserved; empty fragments are never produced.
pub fn split(mode: Mode, text: &[u8]) -> Vec<&[u8]> {
    let mut fragments = Vec::new();
    let mut word_start = 0usize;
    let mut i = 0usize;
    let len = text.len();

    while i + LANE_BYTES <= len {
        let mut lane = [0u8; LANE_BYTES];
        lane.copy_from_slice(&text[i..i + LANE_BYTES]);
        let mut mask = lane_split_mask(mode, lane);

        while mask != 0 {
            let offset = mask.trailing_zeros() as usize;
            let pos = i + offset;

            if pos > word_start {
                fragments.push(&text[word_start..pos]);
            }
            if mode == Mode::WordPiece && !is_ascii_whitespace(text[pos]) {
                fragments.push(&text[pos..pos + 1]);
            }
            word_start = pos + 1;

            mask &= mask - 1; // clear lowest set bit
        }
        i += LANE_BYTES;
    }

    // Scalar tail: the same split rule, one byte at a time, for what didn't fill a full lane.
    for (offset, &byte) in text[i..].iter().enumerate() {
        let pos = i + offset;
        if is_split_byte(mode, byte) {
            if pos > word_start {
                fragments.push(&text[word_start..pos]);
            }
            if mode == Mode::WordPiece && !is_ascii_whitespace(byte) {
                fragments.push(&text[pos..pos + 1]);
            }
            word_start = pos + 1;
        }
    }

    if word_start < len {
        fragments.push(&text[word_start..len]);
    }

    fragments
}

/// Scalar-only reimplementation of [`split`], used by tests to confirm the lane-accelerated
/// path and the naive byte-at-a-time path always agree, per `spec.md` §9 ("property tests
/// SHOULD run both paths on identical inputs and compare").
#[cfg(test)]
pub fn split_scalar(mode: Mode, text: &[u8]) -> Vec<&[u8]> {
    let mut fragments = Vec::new();
    let mut word_start = 0usize;
    for (pos, &byte) in text.iter().enumerate() {
        if is_split_byte(mode, byte) {
            if pos > word_start {
                fragments.push(&text[word_start..pos]);
            }
            if mode == Mode::WordPiece && !is_ascii_whitespace(byte) {
                fragments.push(&text[pos..pos + 1]);
            }
            word_start = pos + 1;
        }
    }
    if word_start < text.len() {
        fragments.push(&text[word_start..text.len()]);
    }
    fragments
}

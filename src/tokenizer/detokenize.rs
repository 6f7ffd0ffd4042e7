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

//! # Detokenizer
//!
//! Joins a sequence of token strings back into text (`spec.md` §4.5), following the per-mode
//! rules in `original_source`'s `decode`/`convert_tokens_to_text` and generalizing the teacher's
//! `clean_up_tokenization`/`convert_tokens_to_string` from whole-string punctuation heuristics to
//! the same byte-level prefix test the segmenter uses.

use crate::vocab::{Mode, Vocabulary};

/// Same ASCII punctuation class the pre-splitter uses (`spec.md` §4.3), reused here for the
/// "no space before punctuation" WordPiece joining exception.
fn is_ascii_punctuation(byte: u8) -> bool {
    matches!(byte, 33..=47 | 58..=64 | 91..=96 | 123..=126)
}

/// Joins `tokens` into text per the vocabulary's mode. Special tokens (unk/bos/eos) are joined
/// like any other token: callers that want them excluded must filter beforehand, e.g. `decode`.
pub fn convert_tokens_to_text(vocab: &Vocabulary, tokens: &[&str]) -> String {
    match vocab.mode {
        Mode::Metaspace => convert_metaspace(vocab, tokens),
        Mode::WordPiece => convert_wordpiece(vocab, tokens),
    }
}

fn convert_metaspace(vocab: &Vocabulary, tokens: &[&str]) -> String {
    let prefix = vocab.subword_prefix();
    let mut out = String::new();
    for token in tokens {
        let bytes = token.as_bytes();
        if bytes.starts_with(prefix) {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&token[prefix.len()..]);
        } else {
            out.push_str(token);
        }
    }
    out
}

fn convert_wordpiece(vocab: &Vocabulary, tokens: &[&str]) -> String {
    let prefix = vocab.subword_prefix();
    let mut out = String::new();
    for token in tokens {
        let bytes = token.as_bytes();
        if bytes.starts_with(prefix) {
            out.push_str(&token[prefix.len()..]);
            continue;
        }
        if out.is_empty() {
            out.push_str(token);
            continue;
        }
        if bytes.len() == 1 && is_ascii_punctuation(bytes[0]) {
            out.push_str(token);
        } else {
            out.push(' ');
            out.push_str(token);
        }
    }
    out
}

/// Converts ids back to text. Ids absent from the vocabulary are silently dropped rather than
/// rendered as UNK (`spec.md` §4.5/§7 — decode never fails and never fabricates UNK tokens for
/// ids it does not recognize). When `skip_special_tokens` is set, `bos`/`eos` ids are dropped
/// before detokenization, matching `spec.md` §4.6 `decode(ids, skip_special)`.
pub fn decode(vocab: &Vocabulary, ids: &[i64], skip_special_tokens: bool) -> String {
    let tokens: Vec<&str> = ids
        .iter()
        .filter(|&&id| vocab.contains_id(id))
        .filter(|&&id| {
            !skip_special_tokens || (id != vocab.bos_id() && id != vocab.eos_id())
        })
        .map(|&id| vocab.id_to_token(id))
        .collect();
    convert_tokens_to_text(vocab, &tokens)
}

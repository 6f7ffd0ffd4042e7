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

use crate::trie::ByteTrie;
use hashbrown::HashMap;

/// The two decoding conventions this engine understands. See `spec.md` §1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// SentencePiece-style: word starts are marked with a visible prefix (commonly `▁`).
    Metaspace,
    /// BERT-style: word-internal continuation pieces are marked with `##`.
    WordPiece,
}

/// The three special tokens every supported vocabulary family carries: unknown, beginning
/// and end of sequence. Named generically because the concrete strings differ by family
/// (`<unk>`/`<s>`/`</s>` for SentencePiece, `[UNK]`/`[CLS]`/`[SEP]` for WordPiece).
#[derive(Debug, Clone)]
pub struct SpecialTokens {
    pub unk: (String, i64),
    pub bos: (String, i64),
    pub eos: (String, i64),
}

/// The loaded vocabulary: a byte trie plus bidirectional string/id maps, immutable after
/// [`Vocabulary::load`].
///
/// # Invariants
/// - For every `(t, i)` in `token_to_id`, walking `trie` along the bytes of `t` ends at a
///   terminal node whose id is `i`, and `id_to_token[i] == t`.
/// - `mode`, `subword_prefix` and `special` are set once during load and never mutated after.
/// - `special.unk.1` is a key of `id_to_token`.
pub struct Vocabulary {
    pub mode: Mode,
    subword_prefix: Vec<u8>,
    pub special: SpecialTokens,
    token_to_id: HashMap<String, i64>,
    id_to_token: HashMap<i64, String>,
    pub(crate) trie: ByteTrie,
}

impl Vocabulary {
    pub(crate) fn new(
        mode: Mode,
        subword_prefix: Vec<u8>,
        special: SpecialTokens,
        token_to_id: HashMap<String, i64>,
        id_to_token: HashMap<i64, String>,
        trie: ByteTrie,
    ) -> Self {
        Vocabulary {
            mode,
            subword_prefix,
            special,
            token_to_id,
            id_to_token,
            trie,
        }
    }

    /// The per-mode subword prefix: prepended to the first piece of a word in Metaspace mode,
    /// or to non-initial pieces of a word in WordPiece mode.
    pub fn subword_prefix(&self) -> &[u8] {
        &self.subword_prefix
    }

    pub fn unk_id(&self) -> i64 {
        self.special.unk.1
    }

    pub fn bos_id(&self) -> i64 {
        self.special.bos.1
    }

    pub fn eos_id(&self) -> i64 {
        self.special.eos.1
    }

    pub fn unk_token(&self) -> &str {
        &self.special.unk.0
    }

    pub fn bos_token(&self) -> &str {
        &self.special.bos.0
    }

    pub fn eos_token(&self) -> &str {
        &self.special.eos.0
    }

    /// Converts a token string to its id. Unknown tokens map to the UNK id.
    pub fn token_to_id(&self, token: &str) -> i64 {
        self.token_to_id
            .get(token)
            .copied()
            .unwrap_or_else(|| self.unk_id())
    }

    /// Converts an id to its token string. Unknown ids map to the UNK token.
    pub fn id_to_token(&self, id: i64) -> &str {
        self.id_to_token
            .get(&id)
            .map(|s| s.as_str())
            .unwrap_or_else(|| self.unk_token())
    }

    /// Returns `true` if `id` exists in the vocabulary (distinguishes "maps to UNK because
    /// unknown" from "id happens to equal the UNK id"). Used by `decode`, which silently drops
    /// ids absent from the vocabulary rather than emitting UNK for them (`spec.md` §4.5/§7).
    pub fn contains_id(&self, id: i64) -> bool {
        self.id_to_token.contains_key(&id)
    }

    /// Number of entries in the vocabulary, including special tokens. `spec.md` §6's loader
    /// rejects an empty `vocab` map, so a loaded [`Vocabulary`] is never empty; exposed via
    /// [`crate::tokenizer::Tokenizer::vocab_size`].
    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }
}

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

//! # Vocabulary
//!
//! Loads a single `tokenizer.json`-shaped vocabulary file and builds the state the tokenizer
//! needs to segment and detokenize: a byte trie over every vocabulary token, bidirectional
//! token/id maps, the decoding mode (Metaspace or WordPiece), and the three special tokens
//! (unk/bos/eos).

mod loader;
mod vocabulary;

pub use loader::{AddedToken, DecoderSection, ModelSection, TokenizerFile};
pub use vocabulary::{Mode, SpecialTokens, Vocabulary};

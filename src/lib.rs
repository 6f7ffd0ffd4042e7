// Copyright 2018 The HuggingFace Inc. team.
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

//! # matchpiece
//!
//! A subword tokenizer core supporting the Metaspace (SentencePiece-style) and WordPiece
//! decoding conventions, loaded from a single `tokenizer.json`-shaped vocabulary file.
//!
//! ```no_run
//! use matchpiece::Tokenizer;
//!
//! let tokenizer = Tokenizer::load("tokenizer.json")?;
//! let ids = tokenizer.encode("hello world", false)?;
//! let text = tokenizer.decode(&ids, false)?;
//! # Ok::<(), matchpiece::TokenizerError>(())
//! ```

mod trie;

pub mod error;
pub mod tokenizer;
pub mod vocab;

pub use error::TokenizerError;
pub use tokenizer::Tokenizer;
pub use vocab::{Mode, Vocabulary};

#[macro_use]
extern crate lazy_static;

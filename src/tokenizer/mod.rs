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

//! # Tokenizer
//!
//! The facade exposed to callers: load a vocabulary, then tokenize, encode, decode and convert
//! between tokens and ids against it. Generalizes the teacher's per-model-family
//! `Tokenizer<T: Vocab>` trait (`base_tokenizer.rs`) — which dispatches to one of many concrete
//! vocab types — down to a single concrete engine parameterized only by [`Vocabulary::mode`],
//! since this crate supports exactly the Metaspace and WordPiece conventions rather than a
//! family of model-specific tokenizers.

mod detokenize;
mod presplit;
mod segment;

use crate::error::{NotLoadedSnafu, TokenizerError};
use crate::vocab::Vocabulary;
use rayon::prelude::*;
use snafu::OptionExt;
use std::path::Path;

/// Default size of the worker pool driving [`Tokenizer::batch_tokenize`]. `original_source`'s
/// `batch_tokenize` pins `omp_set_num_threads(3)`; this carries the same default over to rayon.
const DEFAULT_WORKER_THREADS: usize = 3;

lazy_static! {
    static ref WORKER_POOL: rayon::ThreadPool = rayon::ThreadPoolBuilder::new()
        .num_threads(DEFAULT_WORKER_THREADS)
        .build()
        .expect("failed to build the batch_tokenize worker pool");
}

/// Shared by [`Tokenizer::tokenize`] and [`Tokenizer::batch_tokenize`] so both fan out to the
/// same per-text pre-split/segment/lookup pipeline.
fn tokenize_one(vocab: &Vocabulary, text: &str, add_special_tokens: bool) -> Vec<String> {
    let mut tokens = Vec::new();
    if add_special_tokens {
        tokens.push(vocab.bos_token().to_string());
    }
    for fragment in presplit::split(vocab.mode, text.as_bytes()) {
        for id in segment::segment(vocab, fragment) {
            tokens.push(vocab.id_to_token(id).to_string());
        }
    }
    if add_special_tokens {
        tokens.push(vocab.eos_token().to_string());
    }
    tokens
}

/// The subword tokenizer engine. Holds at most one loaded [`Vocabulary`]; every operation other
/// than loading fails with [`TokenizerError::NotLoaded`] until one is present.
pub struct Tokenizer {
    vocabulary: Option<Vocabulary>,
    batch_concurrency: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new()
    }
}

impl Tokenizer {
    /// Creates a tokenizer with no vocabulary loaded.
    pub fn new() -> Self {
        Tokenizer {
            vocabulary: None,
            batch_concurrency: DEFAULT_WORKER_THREADS,
        }
    }

    /// Creates a tokenizer already backed by `vocabulary`.
    pub fn from_vocabulary(vocabulary: Vocabulary) -> Self {
        Tokenizer {
            vocabulary: Some(vocabulary),
            batch_concurrency: DEFAULT_WORKER_THREADS,
        }
    }

    /// Loads a vocabulary from a `tokenizer.json`-shaped file at `path` and returns a tokenizer
    /// ready to use.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TokenizerError> {
        Ok(Tokenizer::from_vocabulary(Vocabulary::load(path)?))
    }

    /// Sets the degree of parallelism [`Tokenizer::batch_tokenize`] fans out across
    /// (`spec.md` §5: "suggested default: 3; implementers may tune"). Builder-style: consumes
    /// and returns `self`, matching the teacher's `BaseTokenizer::from_file`-adjacent
    /// constructor-chaining conventions. A `threads` of `0` is treated as `1`.
    pub fn with_batch_concurrency(mut self, threads: usize) -> Self {
        self.batch_concurrency = threads.max(1);
        self
    }

    fn vocab(&self) -> Result<&Vocabulary, TokenizerError> {
        self.vocabulary.as_ref().context(NotLoadedSnafu)
    }

    /// Splits `text` into token strings (`spec.md` §4.6 `tokenize`): pre-split into fragments,
    /// then segment each fragment by longest-prefix trie match, mapping ids back to their token
    /// strings. When `add_special_tokens` is set, `bos`/`eos` are prepended/appended at the
    /// fragment-sequence level, not per fragment (`spec.md` §4.4 "Special tokens").
    pub fn tokenize(
        &self,
        text: &str,
        add_special_tokens: bool,
    ) -> Result<Vec<String>, TokenizerError> {
        let vocab = self.vocab()?;
        Ok(tokenize_one(vocab, text, add_special_tokens))
    }

    /// Tokenizes each of `texts` independently, preserving input order. Dispatched across a
    /// worker pool sized by [`Tokenizer::with_batch_concurrency`] (default
    /// [`DEFAULT_WORKER_THREADS`]; `spec.md` §4.6 `batch_tokenize`), mirroring the teacher's
    /// `MultiThreadedTokenizer::tokenize_list`'s use of `rayon::prelude::*` `par_iter()`.
    pub fn batch_tokenize(
        &self,
        texts: &[&str],
        add_special_tokens: bool,
    ) -> Result<Vec<Vec<String>>, TokenizerError> {
        let vocab = self.vocab()?;
        let run = |pool: &rayon::ThreadPool| {
            pool.install(|| {
                texts
                    .par_iter()
                    .map(|text| tokenize_one(vocab, text, add_special_tokens))
                    .collect()
            })
        };
        if self.batch_concurrency == DEFAULT_WORKER_THREADS {
            Ok(run(&WORKER_POOL))
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.batch_concurrency)
                .build()
                .expect("failed to build a batch_tokenize worker pool");
            Ok(run(&pool))
        }
    }

    /// Tokenizes `text` and converts directly to vocabulary ids (`spec.md` §4.6 `encode`),
    /// skipping the intermediate token-string allocation `tokenize` performs. MUST (and does)
    /// produce the same id sequence as `convert_tokens_to_ids(tokenize(text, add_special_tokens))`
    /// (`spec.md` §4.6 `encode` notes, §8).
    pub fn encode(
        &self,
        text: &str,
        add_special_tokens: bool,
    ) -> Result<Vec<i64>, TokenizerError> {
        let vocab = self.vocab()?;
        let mut ids = Vec::new();
        if add_special_tokens {
            ids.push(vocab.bos_id());
        }
        for fragment in presplit::split(vocab.mode, text.as_bytes()) {
            ids.extend(segment::segment(vocab, fragment));
        }
        if add_special_tokens {
            ids.push(vocab.eos_id());
        }
        Ok(ids)
    }

    /// Converts ids back to text (`spec.md` §4.6 `decode`). Ids absent from the vocabulary are
    /// dropped rather than rendered as UNK; see [`detokenize::decode`]. When `skip_special_tokens`
    /// is set, `bos`/`eos` ids are dropped as well, before detokenization joins the rest.
    pub fn decode(&self, ids: &[i64], skip_special_tokens: bool) -> Result<String, TokenizerError> {
        let vocab = self.vocab()?;
        Ok(detokenize::decode(vocab, ids, skip_special_tokens))
    }

    /// Converts token strings to ids (`spec.md` §4.6 `convert_tokens_to_ids`). Tokens absent
    /// from the vocabulary map to the UNK id. When `add_special_tokens` is set, `bos`/`eos` ids
    /// are prepended/appended around the converted sequence.
    pub fn convert_tokens_to_ids(
        &self,
        tokens: &[&str],
        add_special_tokens: bool,
    ) -> Result<Vec<i64>, TokenizerError> {
        let vocab = self.vocab()?;
        let mut ids = Vec::with_capacity(tokens.len() + 2);
        if add_special_tokens {
            ids.push(vocab.bos_id());
        }
        ids.extend(tokens.iter().map(|t| vocab.token_to_id(t)));
        if add_special_tokens {
            ids.push(vocab.eos_id());
        }
        Ok(ids)
    }

    /// Converts ids to token strings (`spec.md` §4.6 `convert_ids_to_tokens`). Ids absent from
    /// the vocabulary map to the UNK token. When `skip_special_tokens` is set, `bos`/`eos` ids
    /// are dropped from the output rather than rendered as their token strings.
    pub fn convert_ids_to_tokens(
        &self,
        ids: &[i64],
        skip_special_tokens: bool,
    ) -> Result<Vec<String>, TokenizerError> {
        let vocab = self.vocab()?;
        Ok(ids
            .iter()
            .filter(|&&id| !skip_special_tokens || (id != vocab.bos_id() && id != vocab.eos_id()))
            .map(|&id| vocab.id_to_token(id).to_string())
            .collect())
    }

    /// Joins token strings into text (`spec.md` §4.6 `convert_tokens_to_text`) without the
    /// round trip through ids that `decode` performs.
    pub fn convert_tokens_to_text(&self, tokens: &[&str]) -> Result<String, TokenizerError> {
        let vocab = self.vocab()?;
        Ok(detokenize::convert_tokens_to_text(vocab, tokens))
    }

    /// `true` once a vocabulary has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Number of entries in the loaded vocabulary (`spec.md` §4.2), including special tokens.
    pub fn vocab_size(&self) -> Result<usize, TokenizerError> {
        Ok(self.vocab()?.len())
    }
}

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

//! JSON deserialization of the `tokenizer.json`-shaped vocabulary file (`spec.md` §6), following
//! the same `File` → `BufReader` → `serde_json::from_reader` shape as the teacher's
//! `vocab::base_vocab::read_json_file` and `hf_tokenizers::config::Config::from_file`.

use crate::error::{MalformedVocabularySnafu, TokenizerError};
use crate::trie::ByteTrie;
use crate::vocab::vocabulary::{Mode, SpecialTokens, Vocabulary};
use hashbrown::HashMap;
use serde::Deserialize;
use snafu::{ensure, OptionExt, ResultExt};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const DEFAULT_METASPACE_PREFIX: &str = "\u{2581}";
const DEFAULT_WORDPIECE_PREFIX: &str = "##";

/// One entry of the `added_tokens` array: a special token's literal content and its id.
#[derive(Debug, Clone, Deserialize)]
pub struct AddedToken {
    pub content: String,
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecoderSection {
    #[serde(rename = "type")]
    pub decoder_type: Option<String>,
    pub replacement: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    pub unk_token: Option<String>,
    pub vocab: HashMap<String, i64>,
}

/// The top-level shape of the vocabulary file, per `spec.md` §6.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerFile {
    pub decoder: Option<DecoderSection>,
    pub model: ModelSection,
    #[serde(default)]
    pub added_tokens: Vec<AddedToken>,
}

fn find_added_token(added_tokens: &[AddedToken], content: &str) -> Option<(String, i64)> {
    added_tokens
        .iter()
        .find(|t| t.content == content)
        .map(|t| (t.content.clone(), t.id))
}

impl Vocabulary {
    /// Loads a vocabulary from a `tokenizer.json`-shaped file at `path`. See `spec.md` §4.2 for
    /// the full load algorithm; this is its direct translation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vocabulary, TokenizerError> {
        let path = path.as_ref();
        let file = File::open(path).context(crate::error::IoSnafu {
            path: path.to_path_buf(),
        })?;
        let reader = BufReader::new(file);
        let parsed: TokenizerFile = serde_json::from_reader(reader).map_err(|source| {
            MalformedVocabularySnafu {
                message: format!("failed to parse vocabulary JSON: {source}"),
            }
            .build()
        })?;
        Vocabulary::from_parsed(parsed)
    }

    /// Parses an in-memory JSON document. Exposed for testing; production callers use
    /// [`Vocabulary::load`].
    pub fn from_str(json: &str) -> Result<Vocabulary, TokenizerError> {
        let parsed: TokenizerFile = serde_json::from_str(json).map_err(|source| {
            MalformedVocabularySnafu {
                message: format!("failed to parse vocabulary JSON: {source}"),
            }
            .build()
        })?;
        Vocabulary::from_parsed(parsed)
    }

    fn from_parsed(parsed: TokenizerFile) -> Result<Vocabulary, TokenizerError> {
        let decoder = parsed
            .decoder
            .context(MalformedVocabularySnafu {
                message: "vocabulary is missing the `decoder` section".to_string(),
            })?;
        let decoder_type = decoder.decoder_type.context(MalformedVocabularySnafu {
            message: "vocabulary is missing `decoder.type`".to_string(),
        })?;

        let (mode, subword_prefix) = match decoder_type.as_str() {
            "Metaspace" => (
                Mode::Metaspace,
                decoder
                    .replacement
                    .unwrap_or_else(|| DEFAULT_METASPACE_PREFIX.to_string()),
            ),
            "WordPiece" => (
                Mode::WordPiece,
                decoder
                    .prefix
                    .unwrap_or_else(|| DEFAULT_WORDPIECE_PREFIX.to_string()),
            ),
            other => {
                return MalformedVocabularySnafu {
                    message: format!(
                        "unsupported decoder.type `{other}`, expected `Metaspace` or `WordPiece`"
                    ),
                }
                .fail()
            }
        };

        let unk_token = parsed.model.unk_token.context(MalformedVocabularySnafu {
            message: "vocabulary is missing `model.unk_token`".to_string(),
        })?;

        let (unk_content, bos_content, eos_content) = match unk_token.as_str() {
            "<unk>" => ("<unk>", "<s>", "</s>"),
            "[UNK]" => ("[UNK]", "[CLS]", "[SEP]"),
            other => {
                return MalformedVocabularySnafu {
                    message: format!(
                        "unsupported model.unk_token `{other}`, expected `<unk>` or `[UNK]`"
                    ),
                }
                .fail()
            }
        };

        let unk = find_added_token(&parsed.added_tokens, unk_content).context(
            MalformedVocabularySnafu {
                message: format!("added_tokens is missing the special token `{unk_content}`"),
            },
        )?;
        let bos = find_added_token(&parsed.added_tokens, bos_content).context(
            MalformedVocabularySnafu {
                message: format!("added_tokens is missing the special token `{bos_content}`"),
            },
        )?;
        let eos = find_added_token(&parsed.added_tokens, eos_content).context(
            MalformedVocabularySnafu {
                message: format!("added_tokens is missing the special token `{eos_content}`"),
            },
        )?;

        let vocab_size = parsed.model.vocab.len();
        ensure!(
            vocab_size > 0,
            MalformedVocabularySnafu {
                message: "vocabulary `model.vocab` is empty".to_string(),
            }
        );

        let mut trie = ByteTrie::with_capacity(vocab_size);
        let mut token_to_id = HashMap::with_capacity(vocab_size);
        let mut id_to_token = HashMap::with_capacity(vocab_size);
        for (token, id) in parsed.model.vocab {
            trie.insert(token.as_bytes(), id);
            id_to_token.insert(id, token.clone());
            token_to_id.insert(token, id);
        }

        let special = SpecialTokens { unk, bos, eos };
        ensure!(
            id_to_token.contains_key(&special.unk.1),
            MalformedVocabularySnafu {
                message: format!(
                    "unk token `{}` (id {}) is not present in `model.vocab`",
                    special.unk.0, special.unk.1
                ),
            }
        );

        Ok(Vocabulary::new(
            mode,
            subword_prefix.into_bytes(),
            special,
            token_to_id,
            id_to_token,
            trie,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn wordpiece_json() -> &'static str {
        r#"{
            "decoder": {"type": "WordPiece", "prefix": "##"},
            "model": {
                "unk_token": "[UNK]",
                "vocab": {
                    "[UNK]": 0, "[CLS]": 1, "[SEP]": 2,
                    "hello": 10, "world": 11, "##s": 20, ".": 30, ",": 31
                }
            },
            "added_tokens": [
                {"content": "[UNK]", "id": 0},
                {"content": "[CLS]", "id": 1},
                {"content": "[SEP]", "id": 2}
            ]
        }"#
    }

    fn metaspace_json() -> &'static str {
        r#"{
            "decoder": {"type": "Metaspace", "replacement": "▁"},
            "model": {
                "unk_token": "<unk>",
                "vocab": {
                    "<unk>": 0, "<s>": 1, "</s>": 2,
                    "▁hello": 10, "▁world": 11
                }
            },
            "added_tokens": [
                {"content": "<unk>", "id": 0},
                {"content": "<s>", "id": 1},
                {"content": "</s>", "id": 2}
            ]
        }"#
    }

    #[test]
    fn loads_wordpiece_vocabulary() -> anyhow::Result<()> {
        let vocab = Vocabulary::from_str(wordpiece_json())?;
        assert_eq!(vocab.mode, Mode::WordPiece);
        assert_eq!(vocab.subword_prefix(), b"##");
        assert_eq!(vocab.unk_token(), "[UNK]");
        assert_eq!(vocab.bos_token(), "[CLS]");
        assert_eq!(vocab.eos_token(), "[SEP]");
        assert_eq!(vocab.token_to_id("hello"), 10);
        Ok(())
    }

    #[test]
    fn loads_metaspace_vocabulary() -> anyhow::Result<()> {
        let vocab = Vocabulary::from_str(metaspace_json())?;
        assert_eq!(vocab.mode, Mode::Metaspace);
        assert_eq!(vocab.subword_prefix(), "\u{2581}".as_bytes());
        assert_eq!(vocab.unk_token(), "<unk>");
        assert_eq!(vocab.bos_token(), "<s>");
        assert_eq!(vocab.eos_token(), "</s>");
        Ok(())
    }

    #[test]
    fn missing_decoder_type_is_malformed() {
        let json = r#"{"decoder": {}, "model": {"unk_token": "[UNK]", "vocab": {"[UNK]": 0}}, "added_tokens": []}"#;
        assert!(Vocabulary::from_str(json).is_err());
    }

    #[test]
    fn missing_special_token_triple_is_malformed() {
        let json = r#"{
            "decoder": {"type": "WordPiece"},
            "model": {"unk_token": "[UNK]", "vocab": {"[UNK]": 0}},
            "added_tokens": [{"content": "[UNK]", "id": 0}]
        }"#;
        assert!(Vocabulary::from_str(json).is_err());
    }

    #[test]
    fn unrecognized_unk_token_is_malformed() {
        let json = r#"{
            "decoder": {"type": "WordPiece"},
            "model": {"unk_token": "???", "vocab": {"[UNK]": 0}},
            "added_tokens": []
        }"#;
        assert!(Vocabulary::from_str(json).is_err());
    }

    #[test]
    fn default_prefixes_apply_when_absent() -> anyhow::Result<()> {
        let json = r#"{
            "decoder": {"type": "WordPiece"},
            "model": {
                "unk_token": "[UNK]",
                "vocab": {"[UNK]": 0, "[CLS]": 1, "[SEP]": 2}
            },
            "added_tokens": [
                {"content": "[UNK]", "id": 0},
                {"content": "[CLS]", "id": 1},
                {"content": "[SEP]", "id": 2}
            ]
        }"#;
        let vocab = Vocabulary::from_str(json)?;
        assert_eq!(vocab.subword_prefix(), b"##");
        Ok(())
    }

    #[test]
    fn load_from_file_not_found_is_io_error() {
        let result = Vocabulary::load("/nonexistent/path/tokenizer.json");
        assert!(matches!(result, Err(TokenizerError::Io { .. })));
    }

    #[test]
    fn load_from_file_reads_json() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{}", wordpiece_json())?;
        let path = file.into_temp_path();
        let vocab = Vocabulary::load(&path)?;
        assert_eq!(vocab.mode, Mode::WordPiece);
        drop(path);
        Ok(())
    }
}

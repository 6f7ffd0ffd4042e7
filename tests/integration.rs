use matchpiece::Tokenizer;
use std::io::Write;

fn wordpiece_vocab_file() -> anyhow::Result<tempfile::TempPath> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "decoder": {{"type": "WordPiece", "prefix": "##"}},
            "model": {{
                "unk_token": "[UNK]",
                "vocab": {{
                    "[UNK]": 0, "[CLS]": 1, "[SEP]": 2,
                    "hello": 10, "world": 11, "##s": 20, ".": 30, ",": 31,
                    "play": 40, "##ing": 41, "hi": 60
                }}
            }},
            "added_tokens": [
                {{"content": "[UNK]", "id": 0}},
                {{"content": "[CLS]", "id": 1}},
                {{"content": "[SEP]", "id": 2}}
            ]
        }}"#
    )?;
    Ok(file.into_temp_path())
}

fn metaspace_vocab_file() -> anyhow::Result<tempfile::TempPath> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "decoder": {{"type": "Metaspace", "replacement": "▁"}},
            "model": {{
                "unk_token": "<unk>",
                "vocab": {{
                    "<unk>": 0, "<s>": 1, "</s>": 2,
                    "▁hello": 10, "▁world": 11,
                    "▁un": 50, "believable": 51
                }}
            }},
            "added_tokens": [
                {{"content": "<unk>", "id": 0}},
                {{"content": "<s>", "id": 1}},
                {{"content": "</s>", "id": 2}}
            ]
        }}"#
    )?;
    Ok(file.into_temp_path())
}

#[test]
fn wordpiece_simple_sentence_end_to_end() -> anyhow::Result<()> {
    let path = wordpiece_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let tokens = tokenizer.tokenize("hello, world.", true)?;
    assert_eq!(
        tokens,
        vec!["[CLS]", "hello", ",", "world", ".", "[SEP]"]
    );

    let ids = tokenizer.encode("hello, world.", true)?;
    assert_eq!(ids, vec![1, 10, 31, 11, 30, 2]);

    let decoded = tokenizer.decode(&ids, true)?;
    assert_eq!(decoded, "hello, world.");
    Ok(())
}

#[test]
fn wordpiece_continuation_piece() -> anyhow::Result<()> {
    let path = wordpiece_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let tokens = tokenizer.tokenize("playing", false)?;
    assert_eq!(tokens, vec!["play", "##ing"]);

    let ids = tokenizer.encode("playing", false)?;
    assert_eq!(ids, vec![40, 41]);

    assert_eq!(tokenizer.decode(&ids, false)?, "playing");
    Ok(())
}

#[test]
fn wordpiece_unknown_codepoint_becomes_single_unk() -> anyhow::Result<()> {
    let path = wordpiece_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let tokens = tokenizer.tokenize("hi \u{1F642}", false)?;
    assert_eq!(tokens, vec!["hi", "[UNK]"]);
    Ok(())
}

#[test]
fn metaspace_simple_sentence() -> anyhow::Result<()> {
    let path = metaspace_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let tokens = tokenizer.tokenize("hello world", false)?;
    assert_eq!(tokens, vec!["\u{2581}hello", "\u{2581}world"]);

    let decoded = tokenizer.convert_tokens_to_text(&["\u{2581}hello", "\u{2581}world"])?;
    assert_eq!(decoded, "hello world");
    Ok(())
}

#[test]
fn metaspace_subword_split_joins_without_space() -> anyhow::Result<()> {
    let path = metaspace_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let tokens = tokenizer.tokenize("unbelievable", false)?;
    assert_eq!(tokens, vec!["\u{2581}un", "believable"]);

    let ids = tokenizer.encode("unbelievable", false)?;
    let decoded = tokenizer.decode(&ids, false)?;
    assert_eq!(decoded, "unbelievable");
    Ok(())
}

#[test]
fn metaspace_whitespace_only_input_yields_empty_or_bos_eos() -> anyhow::Result<()> {
    let path = metaspace_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    assert_eq!(tokenizer.encode("", true)?, vec![1, 2]);
    assert_eq!(tokenizer.encode("   ", true)?, vec![1, 2]);
    assert_eq!(tokenizer.encode("", false)?, Vec::<i64>::new());
    Ok(())
}

#[test]
fn batch_tokenize_matches_sequential_tokenize() -> anyhow::Result<()> {
    let path = wordpiece_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let texts = vec!["hello world", "playing"];
    let batches = tokenizer.batch_tokenize(&texts, false)?;
    for (text, batch) in texts.iter().zip(batches.iter()) {
        assert_eq!(batch, &tokenizer.tokenize(text, false)?);
    }
    Ok(())
}

#[test]
fn encode_matches_convert_tokens_to_ids_of_tokenize() -> anyhow::Result<()> {
    let path = wordpiece_vocab_file()?;
    let tokenizer = Tokenizer::load(&path)?;

    let text = "playing, hello world.";
    let encoded = tokenizer.encode(text, false)?;
    let tokens = tokenizer.tokenize(text, false)?;
    let token_refs: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let converted = tokenizer.convert_tokens_to_ids(&token_refs, false)?;
    assert_eq!(encoded, converted);
    Ok(())
}

#[test]
fn load_rejects_missing_file() {
    let result = Tokenizer::load("/definitely/not/a/real/path/tokenizer.json");
    assert!(result.is_err());
}

#[test]
fn operations_before_load_report_not_loaded() {
    let tokenizer = Tokenizer::new();
    assert!(!tokenizer.is_loaded());
    assert!(tokenizer.tokenize("x", false).is_err());
}

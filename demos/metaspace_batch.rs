use matchpiece::Tokenizer;
use std::env;

fn main() {
    let vocab_file = env::args()
        .nth(1)
        .unwrap_or_else(|| "spm_tokenizer.json".to_string());

    let tokenizer = Tokenizer::load(&vocab_file).expect("failed to load vocabulary");

    let texts = vec![
        "unbelievable results",
        "hello world",
        "the quick brown fox",
    ];
    let batches = tokenizer
        .batch_tokenize(&texts, false)
        .expect("tokenizer must be loaded");

    for (text, tokens) in texts.iter().zip(batches.iter()) {
        println!("{:?} -> {:?}", text, tokens);
    }
}

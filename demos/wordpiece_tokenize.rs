use matchpiece::Tokenizer;
use std::env;

fn main() {
    let vocab_file = env::args()
        .nth(1)
        .unwrap_or_else(|| "tokenizer.json".to_string());

    let tokenizer = Tokenizer::load(&vocab_file).expect("failed to load vocabulary");

    let text = "Hello, world! This tokenizer handles subword continuations like playing.";
    let tokens = tokenizer
        .tokenize(text, true)
        .expect("tokenizer must be loaded");
    println!("{:?}", tokens);

    let ids = tokenizer.encode(text, true).expect("tokenizer must be loaded");
    println!("{:?}", ids);

    let decoded = tokenizer.decode(&ids, true).expect("tokenizer must be loaded");
    println!("{}", decoded);
}

//! # Tokenizer error variants
//!
//! Segmentation and decoding never fail: out-of-vocabulary bytes become UNK tokens, and
//! unknown ids are silently dropped on decode. Errors only arise from loading a vocabulary,
//! or from using a tokenizer before one has been loaded.

#[derive(Debug, snafu::Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TokenizerError {
    #[snafu(display("{location}: failed to read vocabulary file {}: {source}", path.display()))]
    Io {
        source: std::io::Error,
        path: std::path::PathBuf,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    #[snafu(display("{location}: malformed vocabulary: {message}"))]
    MalformedVocabulary {
        message: String,
        #[snafu(implicit)]
        location: snafu::Location,
    },

    #[snafu(display("{location}: tokenizer used before a vocabulary was loaded"))]
    NotLoaded {
        #[snafu(implicit)]
        location: snafu::Location,
    },
}

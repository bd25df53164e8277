use thiserror::Error;

/// Errors raised while building a gram configuration or a segmenter.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("min_gram should be at least 1. min_gram: {min_gram}")]
    ZeroMinGram { min_gram: usize },

    #[error("min_gram should less than max_gram. min_gram: {min_gram} max_gram: {max_gram}")]
    InvalidGramRange { min_gram: usize, max_gram: usize },

    /// The buffer must be able to hold the longest gram.
    #[error("buffer of {buffer_size} chars cannot hold a gram of {max_gram} chars")]
    BufferTooSmall { buffer_size: usize, max_gram: usize },

    #[error("invalid gram settings: {0}")]
    Settings(#[from] serde_yaml::Error),
}

/// Errors raised while pulling terms out of a segmenter.
#[derive(Error, Debug)]
pub enum SegmentError {
    /// The character source failed; the pass is over.
    #[error("character source read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("segmenter is not bound to a character source, call reset first")]
    ResetRequired,
}

pub type Result<T, E = SegmentError> = std::result::Result<T, E>;

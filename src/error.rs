use std::io;
use thiserror::Error;

/// Error type for the chunk optimization pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// The tokenizer could not process a text
    #[error("Tokenization error: {0}")]
    Tokenization(String),

    /// A segment is structurally invalid (e.g. no `text` field)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Invalid thresholds or filter settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Segment loader error
    #[error("Document loader error: {0}")]
    DocumentLoader(String),

    /// A batch worker failed
    #[error("Batch error: {0}")]
    Batch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

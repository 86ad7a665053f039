use std::fmt;

use tiktoken_rs::CoreBPE;

use crate::error::Error;
use crate::traits::TokenCounter;
use crate::Result;

/// Encoding used by `text-embedding-3-small` and `text-embedding-3-large`
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// Token counter backed by OpenAI's BPE tokenizers
pub struct TiktokenCounter {
    name: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Create a counter using the `cl100k_base` encoding
    pub fn cl100k() -> Result<Self> {
        Self::for_encoding(DEFAULT_ENCODING)
    }

    /// Create a counter for a named tiktoken encoding
    pub fn for_encoding(encoding: &str) -> Result<Self> {
        let bpe = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(Error::Tokenization(format!(
                    "Unknown tiktoken encoding: {}",
                    other
                )))
            }
        }
        .map_err(|e| Error::Tokenization(format!("Failed to load {}: {}", encoding, e)))?;

        Ok(Self {
            name: encoding.to_string(),
            bpe,
        })
    }

    /// Create a counter matching the tokenizer of the given OpenAI model
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| {
            Error::Tokenization(format!("No tokenizer for model '{}': {}", model, e))
        })?;
        Ok(Self {
            name: model.to_string(),
            bpe,
        })
    }
}

impl fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("name", &self.name)
            .finish()
    }
}

impl TokenCounter for TiktokenCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn count(&self, text: &str) -> Result<usize> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }
}

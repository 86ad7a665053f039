use crate::traits::TokenCounter;
use crate::Result;

/// A deterministic token counter for testing: one token per whitespace-separated word
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl WordCounter {
    /// Create a new word counter
    pub fn new() -> Self {
        Self
    }
}

impl TokenCounter for WordCounter {
    fn name(&self) -> &str {
        "word-counter"
    }

    fn count(&self, text: &str) -> Result<usize> {
        Ok(text.split_whitespace().count())
    }
}

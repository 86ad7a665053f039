use std::sync::Arc;

use tracing::debug;

use crate::schema::Chunk;
use crate::traits::{TextSplitter, TokenCounter};
use crate::Result;

use super::chunk::ChunkThresholds;

const SENTENCE_DELIMITER: &str = ". ";

/// Splits oversized text at sentence boundaries into chunks of at most `optimal` tokens.
///
/// Sentences are never broken, so a single sentence longer than `optimal` becomes
/// one chunk on its own. Pieces that end up below `min` are dropped.
pub struct SentenceSplitter {
    counter: Arc<dyn TokenCounter>,
    thresholds: ChunkThresholds,
}

impl SentenceSplitter {
    /// Create a new sentence splitter
    pub fn new(counter: Arc<dyn TokenCounter>, thresholds: ChunkThresholds) -> Self {
        Self {
            counter,
            thresholds,
        }
    }

    /// Break text into trimmed sentences, restoring the period the delimiter consumed
    fn sentences(text: &str) -> Vec<String> {
        let parts: Vec<&str> = text.split(SENTENCE_DELIMITER).collect();
        let last = parts.len().saturating_sub(1);

        parts
            .iter()
            .enumerate()
            .filter_map(|(i, part)| {
                let sentence = part.trim();
                if sentence.is_empty() {
                    return None;
                }
                if i < last && !sentence.ends_with('.') {
                    Some(format!("{}.", sentence))
                } else {
                    Some(sentence.to_string())
                }
            })
            .collect()
    }

    /// Emit `current` as a chunk if it meets the minimum
    fn finish(&self, current: &str, chunks: &mut Vec<Chunk>) -> Result<()> {
        if current.is_empty() {
            return Ok(());
        }
        let text = current.trim();
        let tokens = self.counter.count(text)?;
        if tokens >= self.thresholds.min {
            chunks.push(Chunk::new(text, tokens));
        } else {
            debug!(tokens, "dropping split fragment below minimum");
        }
        Ok(())
    }
}

impl TextSplitter for SentenceSplitter {
    fn split_text(&self, text: &str) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in Self::sentences(text) {
            let candidate = if current.is_empty() {
                sentence.clone()
            } else {
                format!("{} {}", current, sentence)
            };

            if self.counter.count(&candidate)? <= self.thresholds.optimal {
                current = candidate;
            } else {
                self.finish(&current, &mut chunks)?;
                current = sentence;
            }
        }
        self.finish(&current, &mut chunks)?;

        Ok(chunks)
    }
}

use async_trait::async_trait;

use crate::schema::{Chunk, SegmentedDocument};
use crate::Result;

/// Trait for tokenizers that measure text in embedding-model tokens.
///
/// Budgets are only meaningful when the counter uses the same tokenizer
/// family as the downstream embedding model.
pub trait TokenCounter: Send + Sync {
    /// Get the tokenizer/model identifier.
    fn name(&self) -> &str;
    /// Count the tokens in `text`. Failures must be propagated, never reported as zero.
    fn count(&self, text: &str) -> Result<usize>;
}

/// Trait for predicates that decide whether a segment carries real content.
pub trait ContentFilter: Send + Sync {
    /// Returns `false` for segments that should be dropped before chunking.
    fn is_meaningful(&self, text: &str) -> bool;
}

/// Trait for text splitters (breaking one oversized text into chunks).
pub trait TextSplitter {
    /// Split text into chunks, in order.
    fn split_text(&self, text: &str) -> Result<Vec<Chunk>>;
}

/// Trait for segment loaders (e.g. parser output files on disk).
#[async_trait]
pub trait SegmentLoader {
    /// Load segmented documents from a source.
    async fn load(&self) -> Result<Vec<SegmentedDocument>>;
}

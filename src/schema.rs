use serde::{Deserialize, Serialize};

/// A raw text unit produced by the upstream document parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// The segment's text
    pub text: String,
}

impl Segment {
    /// Create a new segment with the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A finalized text unit, ready for embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk's text
    pub text: String,

    /// Token count of `text`, as measured by the pipeline's counter
    pub token_count: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, token_count: usize) -> Self {
        Self {
            text: text.into(),
            token_count,
        }
    }
}

/// The ordered segments of one source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentedDocument {
    /// Where the segments were loaded from
    pub source: String,

    /// Segments in document order
    pub segments: Vec<Segment>,
}

impl SegmentedDocument {
    /// Create a new segmented document
    pub fn new(source: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            source: source.into(),
            segments,
        }
    }
}

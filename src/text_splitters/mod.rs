pub mod chunk;
pub mod sentence;

pub use chunk::{ChunkThresholds, SizeClass};
pub use sentence::SentenceSplitter;

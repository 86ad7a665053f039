pub mod batch;
pub mod config;
pub mod document_loaders;
pub mod error;
pub mod filters;
pub mod optimizer;
pub mod schema;
pub mod text_splitters;
pub mod tokenizers;
pub mod traits;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Re-exports for common types
pub mod prelude {
    pub use crate::config::OptimizerConfig;
    pub use crate::error::Error;
    pub use crate::filters::{FilterConfig, MeaningfulnessFilter};
    pub use crate::optimizer::*;
    pub use crate::schema::*;
    pub use crate::text_splitters::{ChunkThresholds, SentenceSplitter, SizeClass};
    pub use crate::tokenizers::{TiktokenCounter, WordCounter};
    pub use crate::traits::*;
    pub use crate::Result;
}

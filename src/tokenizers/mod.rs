pub mod mock;
pub mod tiktoken;

pub use mock::WordCounter;
pub use tiktoken::TiktokenCounter;

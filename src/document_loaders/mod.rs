pub mod directory;
pub mod json;

pub use directory::DirectorySegmentLoader;
pub use json::JsonSegmentLoader;

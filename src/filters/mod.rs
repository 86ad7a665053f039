pub mod meaningful;

pub use meaningful::{FilterConfig, MeaningfulnessFilter};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::error::Error;
use crate::filters::FilterConfig;
use crate::text_splitters::ChunkThresholds;
use crate::tokenizers::tiktoken::DEFAULT_ENCODING;
use crate::Result;

/// Configuration for a chunk optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Tiktoken encoding of the embedding model; defines what a token is
    pub encoding: String,
    /// Chunk size thresholds, in tokens
    pub thresholds: ChunkThresholds,
    /// Meaningfulness filter settings
    pub filter: FilterConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            thresholds: ChunkThresholds::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl OptimizerConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Validate thresholds and filter settings
    pub fn validate(&self) -> Result<()> {
        if self.encoding.trim().is_empty() {
            return Err(Error::Config("encoding must not be empty".into()));
        }
        self.thresholds.validate()?;
        self.filter.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = OptimizerConfig::from_json_str(r#"{"thresholds": {"min": 50}}"#).unwrap();
        assert_eq!(config.thresholds.min, 50);
        assert_eq!(config.thresholds.optimal, 512);
        assert_eq!(config.thresholds.max, 800);
        assert_eq!(config.encoding, DEFAULT_ENCODING);
        assert_eq!(config.filter, FilterConfig::default());
    }

    #[test]
    fn test_invalid_thresholds_are_rejected() {
        let result = OptimizerConfig::from_json_str(r#"{"thresholds": {"min": 900}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
        assert_err!(OptimizerConfig::from_json_str("not json"));
    }

    #[tokio::test]
    async fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"encoding": "o200k_base", "filter": {{"min_chars": 20}}}}"#
        )
        .unwrap();

        let config = assert_ok!(OptimizerConfig::from_file(file.path()).await);
        assert_eq!(config.encoding, "o200k_base");
        assert_eq!(config.filter.min_chars, 20);
        assert_eq!(config.filter.keywords.len(), 8);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = OptimizerConfig::from_file("/nonexistent/chunksmith.json").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

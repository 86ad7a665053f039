use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Error;
use crate::schema::{Segment, SegmentedDocument};
use crate::traits::SegmentLoader;
use crate::Result;

/// Loader for parser output files: a JSON array of `{"text": ...}` objects
pub struct JsonSegmentLoader {
    file_path: PathBuf,
}

impl JsonSegmentLoader {
    /// Create a new JSON segment loader
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    /// Parse segments from JSON text. Fields other than `text` are ignored.
    pub fn parse(source: &str, json: &str) -> Result<SegmentedDocument> {
        let value: Value = serde_json::from_str(json)?;
        let items = match value {
            Value::Array(items) => items,
            _ => {
                return Err(Error::DocumentLoader(format!(
                    "Expected a JSON array of segments in {}",
                    source
                )))
            }
        };

        let segments = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item.get("text") {
                Some(Value::String(text)) => Ok(Segment::new(text.as_str())),
                Some(_) => Err(Error::MalformedInput(format!(
                    "segment {} in {} has a non-string `text` field",
                    index, source
                ))),
                None => Err(Error::MalformedInput(format!(
                    "segment {} in {} has no `text` field",
                    index, source
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SegmentedDocument::new(source, segments))
    }
}

#[async_trait]
impl SegmentLoader for JsonSegmentLoader {
    async fn load(&self) -> Result<Vec<SegmentedDocument>> {
        let metadata = fs::metadata(&self.file_path).await.map_err(|e| {
            Error::DocumentLoader(format!("Failed to read metadata for file: {}", e))
        })?;

        if !metadata.is_file() {
            return Err(Error::DocumentLoader(format!(
                "Path is not a file: {}",
                self.file_path.display()
            )));
        }

        let content = fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| Error::DocumentLoader(format!("Failed to read file: {}", e)))?;

        let source = self.file_path.to_string_lossy();
        Ok(vec![Self::parse(&source, &content)?])
    }
}

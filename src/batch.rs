use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::document_loaders::{DirectorySegmentLoader, JsonSegmentLoader};
use crate::error::Error;
use crate::optimizer::{ChunkOptimizer, OptimizationReport};
use crate::schema::{Chunk, SegmentedDocument};
use crate::traits::SegmentLoader;
use crate::Result;

/// Outcome for one document of a batch
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: String,
    /// Segments loaded for the document; zero when loading failed
    pub segments: usize,
    pub chunks: Vec<Chunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<OptimizationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentReport {
    fn failed(source: String, segments: usize, error: &Error) -> Self {
        Self {
            source,
            segments,
            chunks: Vec::new(),
            report: None,
            error: Some(error.to_string()),
        }
    }

    /// True when the document was optimized without error
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a batch run, documents in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    /// Number of documents optimized without error
    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    /// Number of documents that failed to load or optimize
    pub fn failed(&self) -> usize {
        self.documents.len() - self.succeeded()
    }

    /// Chunks produced across all documents
    pub fn total_chunks(&self) -> usize {
        self.documents.iter().map(|d| d.chunks.len()).sum()
    }
}

/// Runs the optimizer over many documents, a bounded number at a time.
///
/// Every document gets its own optimization pass on a blocking worker. A
/// failing document is recorded in the report and the batch carries on.
pub struct BatchProcessor {
    optimizer: Arc<ChunkOptimizer>,
    concurrency: usize,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(optimizer: Arc<ChunkOptimizer>) -> Self {
        Self {
            optimizer,
            concurrency: 4,
        }
    }

    /// Set how many documents may be in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Process every segment file a directory loader discovers
    pub async fn process_directory(&self, loader: &DirectorySegmentLoader) -> Result<BatchReport> {
        let paths = loader.discover().await?;
        Ok(self.process_paths(&paths).await)
    }

    /// Process segment files
    pub async fn process_paths(&self, paths: &[PathBuf]) -> BatchReport {
        let run_id = Uuid::new_v4();
        info!(%run_id, files = paths.len(), "starting batch");

        let documents: Vec<DocumentReport> = stream::iter(paths)
            .map(|path| self.process_file(path))
            .buffered(self.concurrency)
            .collect()
            .await;

        self.finish(run_id, documents)
    }

    /// Process documents that are already in memory
    pub async fn process_documents(&self, documents: Vec<SegmentedDocument>) -> BatchReport {
        let run_id = Uuid::new_v4();
        info!(%run_id, documents = documents.len(), "starting batch");

        let documents: Vec<DocumentReport> = stream::iter(documents)
            .map(move |document| async move {
                let source = document.source.clone();
                let segments = document.segments.len();
                self.optimize_document(document)
                    .await
                    .unwrap_or_else(|e| self.record_failure(source, segments, e))
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        self.finish(run_id, documents)
    }

    async fn process_file(&self, path: &Path) -> DocumentReport {
        let source = path.to_string_lossy().to_string();
        let loaded = JsonSegmentLoader::new(path).load().await.and_then(|mut docs| {
            docs.pop()
                .ok_or_else(|| Error::DocumentLoader(format!("No segments loaded from {}", source)))
        });

        match loaded {
            Ok(document) => {
                let segments = document.segments.len();
                self.optimize_document(document)
                    .await
                    .unwrap_or_else(|e| self.record_failure(source, segments, e))
            }
            Err(e) => self.record_failure(source, 0, e),
        }
    }

    async fn optimize_document(&self, document: SegmentedDocument) -> Result<DocumentReport> {
        let optimizer = self.optimizer.clone();
        let SegmentedDocument { source, segments } = document;
        let segment_count = segments.len();

        let optimized =
            tokio::task::spawn_blocking(move || optimizer.optimize_with_report(&segments))
                .await
                .map_err(|e| Error::Batch(format!("Worker for {} failed: {}", source, e)))??;

        Ok(DocumentReport {
            source,
            segments: segment_count,
            chunks: optimized.chunks,
            report: Some(optimized.report),
            error: None,
        })
    }

    fn record_failure(&self, source: String, segments: usize, error: Error) -> DocumentReport {
        warn!(source = %source, error = %error, "document failed");
        DocumentReport::failed(source, segments, &error)
    }

    fn finish(&self, run_id: Uuid, documents: Vec<DocumentReport>) -> BatchReport {
        let report = BatchReport { run_id, documents };
        info!(
            %run_id,
            succeeded = report.succeeded(),
            failed = report.failed(),
            chunks = report.total_chunks(),
            "batch complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Segment;
    use crate::tokenizers::WordCounter;
    use std::fs;

    fn processor() -> BatchProcessor {
        let optimizer = ChunkOptimizer::new(Arc::new(WordCounter::new()));
        BatchProcessor::new(Arc::new(optimizer)).with_concurrency(2)
    }

    fn paragraph(words: usize) -> String {
        let mut parts = vec!["Opening".to_string()];
        parts.extend(std::iter::repeat("word".to_string()).take(words - 1));
        format!("{}.", parts.join(" "))
    }

    fn segment_file(words: &[usize]) -> String {
        let segments: Vec<Segment> = words.iter().map(|w| Segment::new(paragraph(*w))).collect();
        serde_json::to_string(&segments).unwrap()
    }

    #[tokio::test]
    async fn test_directory_batch_records_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), segment_file(&[150, 200])).unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"title": "no text"}]"#).unwrap();
        fs::write(dir.path().join("c.json"), segment_file(&[30, 40])).unwrap();

        let loader = DirectorySegmentLoader::new(dir.path());
        let report = processor().process_directory(&loader).await.unwrap();

        assert_eq!(report.documents.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.total_chunks(), 2);

        assert!(report.documents[0].source.ends_with("a.json"));
        assert_eq!(report.documents[0].chunks.len(), 2);
        assert_eq!(report.documents[0].segments, 2);
        assert_eq!(report.documents[1].segments, 0);
        assert_eq!(report.documents[2].segments, 2);
        assert!(report.documents[1]
            .error
            .as_deref()
            .unwrap()
            .contains("Malformed input"));
        // Short runs below the minimum produce an empty, successful result.
        assert!(report.documents[2].is_success());
        assert!(report.documents[2].chunks.is_empty());
        assert_eq!(report.documents[2].report.as_ref().unwrap().discarded_runs, 1);
    }

    #[tokio::test]
    async fn test_in_memory_documents_keep_order() {
        let documents: Vec<SegmentedDocument> = (0..5)
            .map(|i| {
                SegmentedDocument::new(
                    format!("doc-{}", i),
                    vec![Segment::new(paragraph(100 + i * 10))],
                )
            })
            .collect();

        let report = processor().process_documents(documents).await;
        let sources: Vec<&str> = report.documents.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["doc-0", "doc-1", "doc-2", "doc-3", "doc-4"]);
        let sizes: Vec<usize> = report
            .documents
            .iter()
            .map(|d| d.chunks[0].token_count)
            .collect();
        assert_eq!(sizes, vec![100, 110, 120, 130, 140]);
    }

    #[tokio::test]
    async fn test_missing_file_is_recorded() {
        let report = processor()
            .process_paths(&[PathBuf::from("/nonexistent/segments.json")])
            .await;
        assert_eq!(report.failed(), 1);
        assert!(report.documents[0].chunks.is_empty());
    }
}

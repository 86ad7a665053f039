//! Example: Batch optimization of a directory of segment files
//! Run with: cargo run --bin batch_segments -- path/to/segments

use std::sync::Arc;

use chunksmith::batch::BatchProcessor;
use chunksmith::config::OptimizerConfig;
use chunksmith::document_loaders::DirectorySegmentLoader;
use chunksmith::optimizer::ChunkOptimizer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dir = std::env::args().nth(1).unwrap_or_else(|| "segments".to_string());

    let config = match std::env::var("CHUNKSMITH_CONFIG") {
        Ok(path) => OptimizerConfig::from_file(path).await?,
        Err(_) => OptimizerConfig::default(),
    };
    let optimizer = Arc::new(ChunkOptimizer::from_config(&config)?);

    let loader = DirectorySegmentLoader::new(&dir).with_recursive(true);
    let report = BatchProcessor::new(optimizer)
        .with_concurrency(4)
        .process_directory(&loader)
        .await?;

    for doc in &report.documents {
        match (&doc.error, &doc.report) {
            (Some(error), _) => println!("{:<60} failed: {}", doc.source, error),
            (None, Some(summary)) => println!(
                "{:<60} {:>4} segments -> {:>4} chunks",
                doc.source,
                summary.input_segments,
                doc.chunks.len()
            ),
            (None, None) => {}
        }
    }
    println!(
        "Run {}: {} succeeded, {} failed, {} chunks",
        report.run_id,
        report.succeeded(),
        report.failed(),
        report.total_chunks()
    );

    Ok(())
}

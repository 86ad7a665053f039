//! Example: Optimizing parser segments into embedding-ready chunks
//! Run with: RUST_LOG=chunksmith=debug cargo run --bin optimize_segments

use chunksmith::config::OptimizerConfig;
use chunksmith::optimizer::ChunkOptimizer;
use chunksmith::schema::Segment;
use chunksmith::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Build an optimizer with the default cl100k_base tokenizer and thresholds
    let optimizer = ChunkOptimizer::from_config(&OptimizerConfig::default())?;

    let paragraph = "Attention to the present moment changes how a reader experiences a text. \
        Each sentence is weighed on its own, and the argument unfolds slowly. "
        .repeat(12);

    let segments = vec![
        Segment::new("Table of Contents\nChapter 1\nChapter 2"),
        Segment::new("A short opening remark that sets the scene for what follows."),
        Segment::new(paragraph.trim()),
        Segment::new(paragraph.repeat(6).trim()),
    ];

    let optimized = optimizer.optimize_with_report(&segments)?;

    for (i, chunk) in optimized.chunks.iter().enumerate() {
        let preview: String = chunk.text.chars().take(60).collect();
        println!("Chunk {}: {} tokens - {}...", i + 1, chunk.token_count, preview);
    }
    println!("{}", serde_json::to_string_pretty(&optimized.report)?);

    Ok(())
}

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::OptimizerConfig;
use crate::filters::MeaningfulnessFilter;
use crate::schema::{Chunk, Segment};
use crate::text_splitters::{ChunkThresholds, SentenceSplitter, SizeClass};
use crate::tokenizers::TiktokenCounter;
use crate::traits::{ContentFilter, TextSplitter, TokenCounter};
use crate::Result;

/// Accumulates undersized segments until they are flushed or discarded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeBuffer {
    text: String,
    token_count: usize,
}

impl MergeBuffer {
    /// Append text, space-joined, and add its tokens to the running count
    pub fn push(&mut self, text: &str, tokens: usize) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
        self.token_count += tokens;
    }

    /// The concatenated text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sum of the token counts of everything pushed
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// True when nothing has been pushed since the last flush
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.token_count == 0
    }
}

/// Summary statistics over emitted chunk sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: usize,
    pub total: usize,
}

impl ChunkStats {
    /// Compute statistics, or `None` when there are no chunks
    pub fn from_chunks(chunks: &[Chunk]) -> Option<Self> {
        let min = chunks.iter().map(|c| c.token_count).min()?;
        let max = chunks.iter().map(|c| c.token_count).max()?;
        let total: usize = chunks.iter().map(|c| c.token_count).sum();
        Some(Self {
            count: chunks.len(),
            min,
            max,
            avg: total / chunks.len(),
            total,
        })
    }
}

/// What happened to the segments of one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptimizationReport {
    pub input_segments: usize,
    /// Segments rejected by the content filter
    pub filtered_out: usize,
    pub kept_standalone: usize,
    pub merged_chunks: usize,
    /// Oversized segments handed to the splitter
    pub split_segments: usize,
    pub split_chunks: usize,
    /// Runs of undersized segments dropped because they never reached `min`
    pub discarded_runs: usize,
    pub discarded_tokens: usize,
    pub stats: Option<ChunkStats>,
}

/// Chunks produced for one document, with the report describing the run
#[derive(Debug, Clone, Serialize)]
pub struct Optimized {
    pub chunks: Vec<Chunk>,
    pub report: OptimizationReport,
}

/// Turns an ordered sequence of raw segments into budget-conformant chunks.
///
/// Segments are filtered, then classified by token count against the
/// thresholds: standalone segments pass through unchanged, undersized ones are
/// merged, and oversized ones are split at sentence boundaries. Chunks come out
/// in document order.
///
/// A merge run that has not reached `min` when a standalone or oversized
/// segment arrives is discarded, as is one left over at the end of the input.
pub struct ChunkOptimizer {
    counter: Arc<dyn TokenCounter>,
    filter: Arc<dyn ContentFilter>,
    splitter: SentenceSplitter,
    thresholds: ChunkThresholds,
}

impl ChunkOptimizer {
    /// Create an optimizer with default thresholds and filter
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        let thresholds = ChunkThresholds::default();
        Self {
            splitter: SentenceSplitter::new(counter.clone(), thresholds),
            counter,
            filter: Arc::new(MeaningfulnessFilter::default()),
            thresholds,
        }
    }

    /// Build an optimizer using the configured tiktoken encoding
    pub fn from_config(config: &OptimizerConfig) -> Result<Self> {
        config.validate()?;
        let counter = Arc::new(TiktokenCounter::for_encoding(&config.encoding)?);
        let filter = MeaningfulnessFilter::new(config.filter.clone())?;
        Ok(Self::new(counter)
            .with_thresholds(config.thresholds)
            .with_filter(filter))
    }

    /// Set the thresholds
    pub fn with_thresholds(mut self, thresholds: ChunkThresholds) -> Self {
        self.thresholds = thresholds;
        self.splitter = SentenceSplitter::new(self.counter.clone(), thresholds);
        self
    }

    /// Set the content filter
    pub fn with_filter(mut self, filter: impl ContentFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// The thresholds segments are classified against
    pub fn thresholds(&self) -> &ChunkThresholds {
        &self.thresholds
    }

    /// The token counter used for classification and recounts
    pub fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }

    /// Optimize a document's segments into chunks
    pub fn optimize(&self, segments: &[Segment]) -> Result<Vec<Chunk>> {
        self.optimize_with_report(segments).map(|optimized| optimized.chunks)
    }

    /// Optimize a document's segments, also reporting what happened to them
    #[instrument(skip_all, fields(segments = segments.len(), tokenizer = self.counter.name()))]
    pub fn optimize_with_report(&self, segments: &[Segment]) -> Result<Optimized> {
        let mut run = Run::new(self);
        run.report.input_segments = segments.len();

        for segment in segments {
            if !self.filter.is_meaningful(&segment.text) {
                debug!(preview = %preview(&segment.text), "skipping non-meaningful segment");
                run.report.filtered_out += 1;
                continue;
            }

            let tokens = self.counter.count(&segment.text)?;
            match self.thresholds.classify(tokens) {
                SizeClass::Standalone => run.standalone(segment, tokens)?,
                SizeClass::Undersized => run.undersized(segment, tokens)?,
                SizeClass::Oversized => run.oversized(segment)?,
            }
        }

        let optimized = run.finish()?;
        info!(
            input = segments.len(),
            output = optimized.chunks.len(),
            "chunk optimization complete"
        );
        Ok(optimized)
    }
}

/// State of one optimization pass; owns the merge buffer
struct Run<'a> {
    optimizer: &'a ChunkOptimizer,
    buffer: MergeBuffer,
    chunks: Vec<Chunk>,
    report: OptimizationReport,
}

impl<'a> Run<'a> {
    fn new(optimizer: &'a ChunkOptimizer) -> Self {
        Self {
            optimizer,
            buffer: MergeBuffer::default(),
            chunks: Vec::new(),
            report: OptimizationReport::default(),
        }
    }

    fn standalone(&mut self, segment: &Segment, tokens: usize) -> Result<()> {
        self.settle_buffer()?;
        debug!(tokens, "keeping standalone segment");
        self.chunks.push(Chunk::new(segment.text.clone(), tokens));
        self.report.kept_standalone += 1;
        Ok(())
    }

    fn undersized(&mut self, segment: &Segment, tokens: usize) -> Result<()> {
        self.buffer.push(&segment.text, tokens);
        if self.buffer.token_count() >= self.optimizer.thresholds.optimal {
            let buffer = std::mem::take(&mut self.buffer);
            self.emit_merged(buffer)?;
        }
        Ok(())
    }

    fn oversized(&mut self, segment: &Segment) -> Result<()> {
        self.settle_buffer()?;
        let parts = self.optimizer.splitter.split_text(&segment.text)?;
        debug!(chunks = parts.len(), "split oversized segment");
        self.report.split_segments += 1;
        self.report.split_chunks += parts.len();
        self.chunks.extend(parts);
        Ok(())
    }

    /// Flush the buffer if it reached `min`, otherwise drop it; it is empty afterwards
    fn settle_buffer(&mut self) -> Result<()> {
        let buffer = std::mem::take(&mut self.buffer);
        if buffer.is_empty() {
            return Ok(());
        }
        if buffer.token_count() >= self.optimizer.thresholds.min {
            self.emit_merged(buffer)
        } else {
            debug!(
                tokens = buffer.token_count(),
                "discarding merge buffer below minimum"
            );
            self.report.discarded_runs += 1;
            self.report.discarded_tokens += buffer.token_count();
            Ok(())
        }
    }

    /// Recount the joined text; a merge that falls below `min` once trimmed is discarded
    fn emit_merged(&mut self, buffer: MergeBuffer) -> Result<()> {
        let text = buffer.text().trim();
        let token_count = self.optimizer.counter.count(text)?;
        if token_count < self.optimizer.thresholds.min {
            debug!(
                accumulated = buffer.token_count(),
                token_count, "discarding merged chunk below minimum after recount"
            );
            self.report.discarded_runs += 1;
            self.report.discarded_tokens += buffer.token_count();
            return Ok(());
        }
        debug!(
            accumulated = buffer.token_count(),
            token_count, "flushing merged chunk"
        );
        self.chunks.push(Chunk::new(text, token_count));
        self.report.merged_chunks += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<Optimized> {
        self.settle_buffer()?;
        self.report.stats = ChunkStats::from_chunks(&self.chunks);
        Ok(Optimized {
            chunks: self.chunks,
            report: self.report,
        })
    }
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

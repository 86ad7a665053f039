use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// Token budget for emitted chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkThresholds {
    /// Smallest chunk worth embedding on its own
    pub min: usize,
    /// Target size for merged and split chunks
    pub optimal: usize,
    /// Largest segment kept without splitting
    pub max: usize,
}

/// How a segment's token count relates to the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Below `min`: accumulated into the merge buffer
    Undersized,
    /// Within `[min, max]`: kept as-is
    Standalone,
    /// Above `max`: split at sentence boundaries
    Oversized,
}

impl ChunkThresholds {
    /// Create validated thresholds; requires `0 < min <= optimal <= max`
    pub fn new(min: usize, optimal: usize, max: usize) -> Result<Self> {
        let thresholds = Self { min, optimal, max };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Check the ordering of the thresholds
    pub fn validate(&self) -> Result<()> {
        if self.min == 0 {
            return Err(Error::Config("min must be greater than zero".into()));
        }
        if self.min > self.optimal || self.optimal > self.max {
            return Err(Error::Config(format!(
                "thresholds must satisfy min <= optimal <= max, got {}/{}/{}",
                self.min, self.optimal, self.max
            )));
        }
        Ok(())
    }

    /// Classify a token count
    pub fn classify(&self, tokens: usize) -> SizeClass {
        if tokens < self.min {
            SizeClass::Undersized
        } else if tokens <= self.max {
            SizeClass::Standalone
        } else {
            SizeClass::Oversized
        }
    }
}

impl Default for ChunkThresholds {
    fn default() -> Self {
        Self {
            min: 100,
            optimal: 512,
            max: 800,
        }
    }
}

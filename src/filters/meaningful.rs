use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Error;
use crate::traits::ContentFilter;
use crate::Result;

/// Settings for the meaningfulness filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Segments whose trimmed length is below this many characters are rejected
    pub min_chars: usize,
    /// Segments whose trimmed length is at most this many characters are degenerate symbols
    pub max_symbol_chars: usize,
    /// Navigation keywords (tables of contents, indexes, ...), matched as lowercase substrings
    pub keywords: Vec<String>,
    /// Reject when the share of matched keywords exceeds this ratio
    pub max_keyword_ratio: f64,
    /// Reject when tabs, newlines and spaces exceed this share of all characters
    pub max_whitespace_ratio: f64,
    /// At least one of these must appear for the text to count as prose
    pub terminators: Vec<char>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_chars: 50,
            max_symbol_chars: 2,
            keywords: [
                "table of contents",
                "contents",
                "chapter",
                "page",
                "index",
                "appendix",
                "bibliography",
                "references",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            max_keyword_ratio: 0.3,
            max_whitespace_ratio: 0.7,
            terminators: vec!['.', '!', '?', ';', ':'],
        }
    }
}

impl FilterConfig {
    /// Check that ratios are proportions and the keyword set is usable
    pub fn validate(&self) -> Result<()> {
        if self.keywords.is_empty() {
            return Err(Error::Config("Filter keyword set must not be empty".into()));
        }
        for (name, ratio) in [
            ("max_keyword_ratio", self.max_keyword_ratio),
            ("max_whitespace_ratio", self.max_whitespace_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, ratio
                )));
            }
        }
        Ok(())
    }
}

/// Rejects tables of contents, headers, whitespace runs and other non-prose segments
#[derive(Debug, Clone, Default)]
pub struct MeaningfulnessFilter {
    config: FilterConfig,
}

impl MeaningfulnessFilter {
    /// Create a filter with validated settings
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The filter's settings
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    fn keyword_ratio(&self, lowered: &str) -> f64 {
        let matched = self
            .config
            .keywords
            .iter()
            .filter(|keyword| lowered.contains(keyword.to_lowercase().as_str()))
            .count();
        matched as f64 / self.config.keywords.len() as f64
    }

    fn whitespace_ratio(text: &str) -> f64 {
        let total = text.chars().count();
        if total == 0 {
            return 1.0;
        }
        let formatting = text
            .chars()
            .filter(|c| matches!(c, '\t' | '\n' | ' '))
            .count();
        formatting as f64 / total as f64
    }
}

impl ContentFilter for MeaningfulnessFilter {
    fn is_meaningful(&self, text: &str) -> bool {
        let trimmed = text.trim();
        let trimmed_len = trimmed.chars().count();

        if trimmed_len < self.config.min_chars || trimmed_len <= self.config.max_symbol_chars {
            trace!(trimmed_len, "rejected: too short");
            return false;
        }

        let lowered = trimmed.to_lowercase();
        if self.keyword_ratio(&lowered) > self.config.max_keyword_ratio {
            trace!("rejected: navigation keywords");
            return false;
        }

        // Ratio is taken over the untrimmed text.
        if Self::whitespace_ratio(text) > self.config.max_whitespace_ratio {
            trace!("rejected: mostly formatting");
            return false;
        }

        text.chars().any(|c| self.config.terminators.contains(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> MeaningfulnessFilter {
        MeaningfulnessFilter::default()
    }

    #[test]
    fn test_accepts_prose() {
        let f = filter();
        assert!(f.is_meaningful("This is a meaningful sentence with actual content."));
        assert!(f.is_meaningful(
            "This is a real paragraph with meaningful content that should be included in our RAG system."
        ));
    }

    #[test]
    fn test_rejects_short_and_symbols() {
        let f = filter();
        assert!(!f.is_meaningful("^"));
        assert!(!f.is_meaningful("CHAPTER ONE"));
        assert!(!f.is_meaningful("\t\t\n\n"));
        assert!(!f.is_meaningful(""));
        // 49 visible characters padded with whitespace is still too short.
        let padded = format!("   {}.   ", "a".repeat(48));
        assert!(!f.is_meaningful(&padded));
    }

    #[test]
    fn test_rejects_table_of_contents() {
        let f = filter();
        assert!(!f.is_meaningful("Table of Contents\nChapter 1\nChapter 2"));
        // Long enough, but hits chapter, page and index: 3/8 > 0.3.
        let toc = "Chapter one begins on page twelve; see the index for the full list of terms.";
        assert!(!f.is_meaningful(toc));
    }

    #[test]
    fn test_two_keywords_are_tolerated() {
        let f = filter();
        // chapter + page = 2/8 = 0.25
        let text = "In this chapter we turn the page on older ideas about attention and presence.";
        assert!(f.is_meaningful(text));
    }

    #[test]
    fn test_rejects_mostly_whitespace() {
        let f = filter();
        let text = format!("Hi.{}there, friend.", " ".repeat(200));
        assert!(!f.is_meaningful(&text));
    }

    #[test]
    fn test_requires_a_terminator() {
        let f = filter();
        let text = "a long run of words without any sentence punctuation at all in it";
        assert!(!f.is_meaningful(text));
        let with_colon = format!("{}:", text);
        assert!(f.is_meaningful(&with_colon));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = FilterConfig {
            max_whitespace_ratio: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            MeaningfulnessFilter::new(config),
            Err(Error::Config(_))
        ));

        let config = FilterConfig {
            keywords: vec![],
            ..Default::default()
        };
        assert!(MeaningfulnessFilter::new(config).is_err());
    }
}

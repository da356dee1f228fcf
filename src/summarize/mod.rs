pub mod bart;

pub use bart::BartSummarizer;

use crate::error::{Result, TubesumError};
use async_trait::async_trait;

/// Length budget passed to the summarization model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLength {
    pub min_length: u32,
    pub max_length: u32,
}

impl Default for SummaryLength {
    fn default() -> Self {
        Self {
            min_length: 100,
            max_length: 300,
        }
    }
}

impl SummaryLength {
    pub fn new(min_length: u32, max_length: u32) -> Result<Self> {
        if max_length == 0 || min_length > max_length {
            return Err(TubesumError::Config(format!(
                "Invalid summary length range {}..{}",
                min_length, max_length
            )));
        }
        Ok(Self {
            min_length,
            max_length,
        })
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Join chunk summaries in chunk order with a single space.
pub fn join_summaries(summaries: &[String]) -> String {
    summaries.join(" ")
}

//! Abstractive summarization with a hosted BART model.

use crate::error::{Result, TubesumError};
use crate::inference::InferenceClient;
use crate::summarize::{Summarizer, SummaryLength};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct BartSummarizer {
    client: InferenceClient,
    model: String,
}

impl BartSummarizer {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            model: "facebook/bart-large-cnn".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: SummaryLengthParameters,
}

#[derive(Serialize)]
struct SummaryLengthParameters {
    min_length: u32,
    max_length: u32,
}

#[derive(Deserialize, Debug)]
struct SummarizationOutput {
    summary_text: String,
}

#[async_trait]
impl Summarizer for BartSummarizer {
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String> {
        debug!(
            "Summarizing {} chars (length {}..{})",
            text.len(),
            length.min_length,
            length.max_length
        );

        let request = SummarizationRequest {
            inputs: text,
            parameters: SummaryLengthParameters {
                min_length: length.min_length,
                max_length: length.max_length,
            },
        };

        let outputs: Vec<SummarizationOutput> = self
            .client
            .post(&self.model, &request)
            .await
            .map_err(|e| TubesumError::Summarization(e.to_string()))?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text.trim().to_string())
            .ok_or_else(|| TubesumError::Summarization("model returned no summary".to_string()))
    }

    fn name(&self) -> &'static str {
        "bart"
    }
}

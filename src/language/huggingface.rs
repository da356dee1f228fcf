//! Language identification through a hosted text-classification model.

use crate::error::{Result, TubesumError};
use crate::inference::InferenceClient;
use crate::language::{chinese_variant, normalize_code, sample_prefix, LanguageDetector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Codes reported for `papluca/xlm-roberta-base-language-detection`, with
/// its `zh` label split by script.
const XLM_ROBERTA_LABELS: [&str; 21] = [
    "ar", "bg", "de", "el", "en", "es", "fr", "hi", "it", "ja", "nl", "pl", "pt", "ru", "sw", "th",
    "tr", "ur", "vi", "zh-cn", "zh-tw",
];

pub struct HfLanguageDetector {
    client: InferenceClient,
    model: String,
    sample_chars: usize,
}

impl HfLanguageDetector {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            model: "papluca/xlm-roberta-base-language-detection".to_string(),
            sample_chars: 2000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Only the first `chars` characters are sent for classification.
    pub fn with_sample_chars(mut self, chars: usize) -> Self {
        self.sample_chars = chars;
        self
    }

    fn sample<'a>(&self, text: &'a str) -> &'a str {
        sample_prefix(text, self.sample_chars)
    }
}

#[derive(Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize, Debug, Clone)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn best(self) -> Option<LabelScore> {
        let labels = match self {
            ClassificationResponse::Nested(batches) => batches.into_iter().next()?,
            ClassificationResponse::Flat(labels) => labels,
        };
        labels
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[async_trait]
impl LanguageDetector for HfLanguageDetector {
    async fn detect(&self, text: &str) -> Result<String> {
        let sample = self.sample(text);
        if sample.trim().is_empty() {
            return Err(TubesumError::LanguageDetection(
                "no text to classify".to_string(),
            ));
        }

        let response: ClassificationResponse = self
            .client
            .post(&self.model, &ClassificationRequest { inputs: sample })
            .await
            .map_err(|e| TubesumError::LanguageDetection(e.to_string()))?;

        let best = response.best().ok_or_else(|| {
            TubesumError::LanguageDetection("classifier returned no labels".to_string())
        })?;
        debug!("Detected {} (score {:.3})", best.label, best.score);

        if normalize_code(&best.label) == "zh" {
            return Ok(chinese_variant(sample).to_string());
        }
        Ok(best.label)
    }

    fn vocabulary(&self) -> &[&str] {
        &XLM_ROBERTA_LABELS
    }

    fn name(&self) -> &'static str {
        "huggingface"
    }
}

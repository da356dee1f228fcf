//! NLLB-200 translation through the HuggingFace Inference API.

use crate::error::{Result, TubesumError};
use crate::inference::InferenceClient;
use crate::language::LanguageTag;
use crate::translate::Translator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Translator backed by a hosted NLLB model.
pub struct NllbTranslator {
    client: InferenceClient,
    model: String,
}

impl NllbTranslator {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            model: "facebook/nllb-200-distilled-600M".to_string(),
        }
    }

    /// Use a different NLLB checkpoint (e.g., "facebook/nllb-200-1.3B").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct TranslationRequest<'a> {
    inputs: &'a str,
    parameters: TranslationParameters<'a>,
}

#[derive(Serialize)]
struct TranslationParameters<'a> {
    src_lang: &'a str,
    tgt_lang: &'a str,
}

#[derive(Deserialize, Debug)]
struct TranslationOutput {
    translation_text: String,
}

#[async_trait]
impl Translator for NllbTranslator {
    async fn translate(
        &self,
        text: &str,
        source: LanguageTag,
        target: LanguageTag,
    ) -> Result<String> {
        debug!(
            "Translating {} chars {} -> {}",
            text.len(),
            source.tag,
            target.tag
        );

        let request = TranslationRequest {
            inputs: text,
            parameters: TranslationParameters {
                src_lang: source.tag,
                tgt_lang: target.tag,
            },
        };

        let outputs: Vec<TranslationOutput> = self
            .client
            .post(&self.model, &request)
            .await
            .map_err(|e| TubesumError::Translation(e.to_string()))?;

        outputs
            .into_iter()
            .next()
            .map(|o| o.translation_text.trim().to_string())
            .ok_or_else(|| TubesumError::Translation("model returned no translation".to_string()))
    }

    fn name(&self) -> &'static str {
        "nllb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::resolve;

    #[test]
    fn test_request_shape() {
        let request = TranslationRequest {
            inputs: "Guten Morgen",
            parameters: TranslationParameters {
                src_lang: resolve("de").unwrap().tag,
                tgt_lang: LanguageTag::english().tag,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "Guten Morgen");
        assert_eq!(json["parameters"]["src_lang"], "deu_Latn");
        assert_eq!(json["parameters"]["tgt_lang"], "eng_Latn");
    }

    #[test]
    fn test_with_model() {
        let client = InferenceClient::new("http://localhost", None);
        let translator = NllbTranslator::new(client).with_model("facebook/nllb-200-1.3B");
        assert_eq!(translator.model, "facebook/nllb-200-1.3B");
        assert_eq!(translator.name(), "nllb");
    }
}

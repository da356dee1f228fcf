//! Thin client for the HuggingFace Inference API.

use crate::error::{Result, TubesumError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shared HTTP client for hosted model pipelines.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: String,
}

impl InferenceClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_token,
        }
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), model)
    }

    /// POST a JSON payload to a model endpoint and decode the JSON reply.
    pub async fn post<B, R>(&self, model: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.model_url(model);
        debug!("POST {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("x-wait-for-model", "true")
            .json(body);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} responded {} ({} bytes)", model, status, body.len());

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(TubesumError::Api(format!(
                    "{} ({}): {}",
                    model, status, api_error.error
                )));
            }
            return Err(TubesumError::Api(format!("{} ({}): {}", model, status, body)));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

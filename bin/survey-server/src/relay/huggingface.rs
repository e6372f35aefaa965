//! Single-shot text-generation provider.

use serde_json::{Value, json};
use survey_types::EMPTY_RESULT_MESSAGE;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ServerError;

#[derive(Clone, Debug)]
pub struct HuggingFaceClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl HuggingFaceClient {
    pub fn new(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    /// Run one generation and return its text, or the fallback literal when
    /// the provider produced nothing.
    pub async fn generate(&self, prompt: &str) -> Result<String, ServerError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ServerError::ProviderNotConfigured("HUGGINGFACE_API_KEY"))?;

        let url = format!("{}/models/{}", self.config.base_url, self.config.model);
        debug!(%url, prompt_len = prompt.len(), "calling text-generation provider");

        let body: Value = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(first_generated_text(&body))
    }
}

/// Extract `[0].generated_text`, treating absence and the empty string alike.
pub fn first_generated_text(body: &Value) -> String {
    body.get(0)
        .and_then(|first| first.get("generated_text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(EMPTY_RESULT_MESSAGE)
        .to_owned()
}

//! Streaming chat-completion provider.

use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::ServerError;

pub const SYSTEM_PROMPT: &str =
    "You are an AI assistant that analyzes survey results and provides insights.";

const USER_PROMPT_PREFIX: &str = "Analyze the following survey results and provide insights: ";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: Vec<UpstreamMessage>,
}

#[derive(Debug, Serialize)]
struct UpstreamMessage {
    role: &'static str,
    content: String,
}

/// Build the fixed two-turn conversation sent upstream.
fn completion_request<'a>(model: &'a str, prompt: &str) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        stream: true,
        messages: vec![
            UpstreamMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_owned(),
            },
            UpstreamMessage {
                role: "user",
                content: format!("{USER_PROMPT_PREFIX}{prompt}"),
            },
        ],
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    /// Open a streaming completion and return the raw upstream body.
    ///
    /// Fails before any byte is relayed if the provider is unconfigured,
    /// unreachable, or answers with a non-2xx status.
    pub async fn stream_completion(
        &self,
        prompt: &str,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>> + Send + use<>, ServerError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ServerError::ProviderNotConfigured("OPENAI_API_KEY"))?;

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(%url, model = %self.config.model, prompt_len = prompt.len(), "opening upstream stream");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&completion_request(&self.config.model, prompt))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes_stream())
    }
}

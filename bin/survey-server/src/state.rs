//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::relay::huggingface::HuggingFaceClient;
use crate::relay::openai::OpenAiClient;

/// State shared across all HTTP handlers.
///
/// Holds no per-request data: every relay call is independent.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Streaming chat-completion provider.
    pub openai: OpenAiClient,
    /// Single-shot text-generation provider.
    pub huggingface: HuggingFaceClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // One connection pool shared by both providers. No timeout: a hung
        // upstream stalls only its own request.
        let http = reqwest::Client::builder()
            .user_agent(concat!("survey-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            openai: OpenAiClient::new(http.clone(), config.openai.clone()),
            huggingface: HuggingFaceClient::new(http, config.huggingface.clone()),
            config: Arc::new(config),
        })
    }
}

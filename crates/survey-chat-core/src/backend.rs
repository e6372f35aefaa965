//! Transport between the chat controller and the chat backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use survey_types::{ChatRequest, ChatResponse, ErrorDetail};
use thiserror::Error;
use tracing::debug;

/// Default backend address; override with `HttpChatBackend::new`.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Why a chat request produced no reply.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP 429 from the backend.
    #[error("backend is rate limiting requests")]
    RateLimited,

    /// Any other non-success status. `detail` is the backend's own message,
    /// when the error body carried one.
    #[error("backend returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },

    /// No usable response: connection failure or an undecodable body.
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Something that can answer a chat request.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;
}

/// [`ChatBackend`] speaking JSON over HTTP to `POST {base_url}/chat`.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpChatBackend {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
        debug!(endpoint = %self.endpoint, turns = request.messages.len(), model = %request.model, "posting chat request");

        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }
        if !status.is_success() {
            // Best effort: a non-JSON body or a blank detail means no detail.
            let detail = response
                .json::<ErrorDetail>()
                .await
                .ok()
                .and_then(|d| d.detail)
                .filter(|d| !d.trim().is_empty());
            return Err(BackendError::Status { status, detail });
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}

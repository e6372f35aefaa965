//! Relay (`POST /api/analyze`) request and response bodies.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Message returned for any selector other than the known providers.
pub const INVALID_MODEL_MESSAGE: &str = "Invalid model specified.";

/// Result returned when the non-streaming provider produced no text.
pub const EMPTY_RESULT_MESSAGE: &str = "No response received.";

/// Upstream provider named by the `model` field of an analyze request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum ModelSelector {
    /// Streaming chat-completion provider.
    #[strum(serialize = "openai")]
    OpenAi,
    /// Single-shot text-generation provider.
    #[strum(serialize = "huggingface")]
    HuggingFace,
}

/// Request body for `POST /api/analyze`.
///
/// `model` stays a plain string on the wire so an unknown selector can be
/// answered with a 400 instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalyzeRequest {
    /// Free-text survey question or data.
    #[serde(default)]
    pub prompt: String,
    /// `"openai"` or `"huggingface"`.
    #[serde(default)]
    pub model: String,
}

impl AnalyzeRequest {
    pub fn selector(&self) -> Option<ModelSelector> {
        self.model.parse().ok()
    }
}

/// Non-streaming relay response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalyzeResult {
    pub result: String,
}

/// Error body returned by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
}

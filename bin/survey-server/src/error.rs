//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{ "error": ... }` JSON body with an appropriate status code.
//!
//! Upstream failures are logged with full detail but only a
//! generic message is returned to the caller, so provider URLs, keys or
//! response bodies never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use survey_types::ErrorBody;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the relay request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A provider was selected whose credentials are not configured.
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(&'static str),

    /// The upstream provider could not be reached or answered with an error.
    #[error("upstream error: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),

            ServerError::ProviderNotConfigured(key) => {
                error!(key, "provider credentials missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "model provider is not configured".to_owned(),
                )
            }
            ServerError::Upstream(e) => {
                error!(error = %e, status = ?e.status(), "upstream provider error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream provider request failed".to_owned(),
                )
            }
        };
        (status, Json(ErrorBody { error: client_message })).into_response()
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("invalid request body: {e}"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let resp = ServerError::BadRequest("Invalid model specified.".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid model specified.");
    }

    #[tokio::test]
    async fn unparsable_body_is_a_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let resp = ServerError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].as_str().unwrap().starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn missing_provider_is_a_server_error() {
        let resp = ServerError::ProviderNotConfigured("OPENAI_API_KEY").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
    }
}

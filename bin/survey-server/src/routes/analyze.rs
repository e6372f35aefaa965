//! Survey-analysis relay (`POST /api/analyze`).
//!
//! `model = "openai"` relays a streaming completion as `text/event-stream`;
//! `model = "huggingface"` waits for a single generation and answers with
//! `{ "result": ... }`. The selector is checked before any upstream call.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use survey_types::{
    AnalyzeRequest, AnalyzeResult, ErrorBody, INVALID_MODEL_MESSAGE, ModelSelector,
};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::relay::passthrough::relay_events;
use crate::state::AppState;

/// Maximum allowed prompt length in bytes to prevent memory exhaustion.
const MAX_PROMPT_BYTES: usize = 128 * 1024; // 128 KiB

#[derive(OpenApi)]
#[openapi(
    paths(analyze),
    components(schemas(AnalyzeRequest, AnalyzeResult, ErrorBody))
)]
pub struct AnalyzeApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analyze", post(analyze))
}

/// Analyze survey text with the selected provider.
///
/// The body is parsed as JSON whatever its `Content-Type` says.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Raw payload stream (`openai`) or generated text (`huggingface`)", body = AnalyzeResult),
        (status = 400, description = "Invalid model selector or malformed body", body = ErrorBody),
        (status = 500, description = "Upstream provider failure", body = ErrorBody),
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ServerError> {
    let req: AnalyzeRequest = serde_json::from_slice(&body)?;

    let selector = req
        .selector()
        .ok_or_else(|| ServerError::BadRequest(INVALID_MODEL_MESSAGE.to_owned()))?;

    if req.prompt.len() > MAX_PROMPT_BYTES {
        return Err(ServerError::BadRequest(format!(
            "prompt too large ({} bytes); maximum is {} bytes",
            req.prompt.len(),
            MAX_PROMPT_BYTES,
        )));
    }

    debug!(model = %selector, prompt_len = req.prompt.len(), "analyze request");

    match selector {
        ModelSelector::OpenAi => {
            let upstream = state.openai.stream_completion(&req.prompt).await?;
            info!(model = %selector, "relaying upstream stream");
            Ok((
                [(header::CONTENT_TYPE, "text/event-stream")],
                Body::from_stream(relay_events(upstream)),
            )
                .into_response())
        }
        ModelSelector::HuggingFace => {
            let result = state.huggingface.generate(&req.prompt).await?;
            info!(model = %selector, output_len = result.len(), "generation done");
            Ok(Json(AnalyzeResult { result }).into_response())
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    use crate::config::Config;
    use crate::routes;
    use crate::state::AppState;

    /// Serve `upstream` on an ephemeral port and return its base URL.
    async fn spawn_upstream(upstream: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn app_for(base: &str) -> axum::Router {
        let state = AppState::new(Config::for_tests(base)).unwrap();
        routes::build(Arc::new(state))
    }

    fn analyze_request(body: Value) -> Request<axum::body::Body> {
        Request::post("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_body(resp: Response) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn streaming_upstream(frames: &'static [&'static str]) -> axum::Router {
        axum::Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<Value>| async move {
                assert_eq!(body["stream"], true);
                let chunks = frames.iter().map(|f| Ok::<_, Infallible>(Bytes::from_static(f.as_bytes())));
                (
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    axum::body::Body::from_stream(futures::stream::iter(chunks)),
                )
            }),
        )
    }

    #[tokio::test]
    async fn openai_stream_is_relayed_verbatim_and_closed() {
        let base = spawn_upstream(streaming_upstream(&[
            "data: Hello\n\n",
            "data:  wor",
            "ld\n\n",
            "data: [DONE]\n\n",
            "data: after-close\n\n",
        ]))
        .await;

        let resp = app_for(&base)
            .oneshot(analyze_request(json!({ "prompt": "q", "model": "openai" })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert!(resp.headers().contains_key("x-trace-id"));
        assert_eq!(read_body(resp).await, Bytes::from("Hello world"));
    }

    #[tokio::test]
    async fn openai_request_carries_bearer_and_prompt() {
        let upstream = axum::Router::new().route(
            "/chat/completions",
            post(|headers: axum::http::HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers[header::AUTHORIZATION], "Bearer test-key");
                let prompt = body["messages"][1]["content"].as_str().unwrap().to_owned();
                let frame = format!("data: {prompt}\n\ndata: [DONE]\n\n");
                ([(header::CONTENT_TYPE, "text/event-stream")], frame)
            }),
        );
        let base = spawn_upstream(upstream).await;

        let resp = app_for(&base)
            .oneshot(analyze_request(json!({ "prompt": "NPS 42", "model": "openai" })))
            .await
            .unwrap();
        assert_eq!(
            read_body(resp).await,
            Bytes::from("Analyze the following survey results and provide insights: NPS 42")
        );
    }

    #[tokio::test]
    async fn openai_upstream_failure_is_500() {
        let upstream = axum::Router::new().route(
            "/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn_upstream(upstream).await;

        let resp = app_for(&base)
            .oneshot(analyze_request(json!({ "prompt": "q", "model": "openai" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn huggingface_returns_first_generation() {
        let upstream = axum::Router::new().route(
            "/models/gpt2",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["inputs"], "survey text");
                Json(json!([{ "generated_text": "foo" }]))
            }),
        );
        let base = spawn_upstream(upstream).await;

        let resp = app_for(&base)
            .oneshot(analyze_request(json!({ "prompt": "survey text", "model": "huggingface" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body, json!({ "result": "foo" }));
    }

    #[tokio::test]
    async fn huggingface_empty_array_falls_back() {
        let upstream =
            axum::Router::new().route("/models/gpt2", post(|| async { Json(json!([])) }));
        let base = spawn_upstream(upstream).await;

        let resp = app_for(&base)
            .oneshot(analyze_request(json!({ "prompt": "x", "model": "huggingface" })))
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body, json!({ "result": "No response received." }));
    }

    #[tokio::test]
    #[traced_test]
    async fn unknown_model_is_rejected_without_upstream_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let upstream = axum::Router::new().fallback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { StatusCode::OK }
        });
        let base = spawn_upstream(upstream).await;

        let resp = app_for(&base)
            .oneshot(analyze_request(json!({ "prompt": "x", "model": "llama" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body, json!({ "error": "Invalid model specified." }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(logs_contain("request started"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let req = Request::post("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let resp = app_for("http://127.0.0.1:9").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn body_without_content_type_is_still_parsed() {
        let upstream = axum::Router::new().route(
            "/models/gpt2",
            post(|| async { Json(json!([{ "generated_text": "plain" }])) }),
        );
        let base = spawn_upstream(upstream).await;

        let req = Request::post("/api/analyze")
            .body(axum::body::Body::from(r#"{"prompt":"x","model":"huggingface"}"#))
            .unwrap();
        let resp = app_for(&base).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body, json!({ "result": "plain" }));
    }

    #[tokio::test]
    async fn oversized_prompt_is_rejected() {
        let prompt = "x".repeat(MAX_PROMPT_BYTES + 1);
        let resp = app_for("http://127.0.0.1:9")
            .oneshot(analyze_request(json!({ "prompt": prompt, "model": "huggingface" })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let req = Request::get("/api-docs/openapi.json")
            .body(axum::body::Body::empty())
            .unwrap();
        let resp = app_for("http://127.0.0.1:9").oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert!(body["paths"].get("/api/analyze").is_some());
    }
}

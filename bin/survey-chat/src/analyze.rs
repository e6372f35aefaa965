//! One-shot call to the relay's analyze endpoint.

use std::io::Write;

use anyhow::{Context, bail};
use futures::StreamExt;
use survey_types::{AnalyzeRequest, AnalyzeResult, ErrorBody, ModelSelector};
use tracing::debug;

/// Post `prompt` to `{relay_url}/api/analyze` and write the answer to `out`.
///
/// Event-stream responses are written chunk by chunk as they arrive; JSON
/// responses are written once. A relay error body becomes an `Err`.
pub async fn run<W: Write>(
    client: &reqwest::Client,
    relay_url: &str,
    model: ModelSelector,
    prompt: String,
    out: &mut W,
) -> anyhow::Result<()> {
    let endpoint = format!("{}/api/analyze", relay_url.trim_end_matches('/'));
    let body = AnalyzeRequest {
        prompt,
        model: model.to_string(),
    };
    debug!(%endpoint, %model, "calling relay");

    let response = client
        .post(&endpoint)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("relay unreachable at {endpoint}"))?;
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody { error }) => error,
            Err(_) => status.to_string(),
        };
        bail!("relay returned {status}: {message}");
    }

    let streaming = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"));

    if streaming {
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.context("relay stream interrupted")?;
            out.write_all(&chunk)?;
            out.flush()?;
        }
        writeln!(out)?;
    } else {
        let AnalyzeResult { result } = response.json().await.context("unexpected relay response")?;
        writeln!(out, "{result}")?;
    }
    Ok(())
}

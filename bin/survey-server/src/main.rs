//! survey-server – relays survey-analysis prompts to an LLM provider.
//!
//! Configuration comes from the environment (see [`config::Config`]); the
//! process serves until SIGINT or SIGTERM and then drains open requests.

mod config;
mod error;
mod middleware;
mod relay;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env();
    init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), config = ?cfg, "survey-server starting");
    for (provider, key) in [
        ("openai", &cfg.openai.api_key),
        ("huggingface", &cfg.huggingface.api_key),
    ] {
        if key.is_none() {
            warn!(provider, "no API key configured; requests for this model will fail");
        }
    }

    let addr: SocketAddr = cfg.bind_address.parse()?;
    let app = routes::build(Arc::new(AppState::new(cfg)?));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("survey-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `SURVEY_LOG`; an unparsable filter falls back to
/// `info` with a warning on stderr.
fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        cfg.log_level.parse().unwrap_or_else(|e| {
            eprintln!(
                "WARN: SURVEY_LOG='{}' is not a valid tracing filter ({e}); falling back to 'info'",
                cfg.log_level
            );
            EnvFilter::new("info")
        })
    });

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for CTRL+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "cannot listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutting down");
}

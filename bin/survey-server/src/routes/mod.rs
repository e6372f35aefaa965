//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document (disable with `SURVEY_ENABLE_OPENAPI=false`)
//! - Health / heartbeat route
//! - The `/api/analyze` relay

mod analyze;
pub mod doc;
mod health;

use crate::middleware::{cors, trace};
use crate::state::AppState;
use axum::{Json, Router, middleware, routing::get};
use std::sync::Arc;
use tower::ServiceBuilder;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", analyze::router());

    if state.config.enable_openapi {
        app = app.route("/api-docs/openapi.json", get(|| async { Json(doc::get_docs()) }));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}

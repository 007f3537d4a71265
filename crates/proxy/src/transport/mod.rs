// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the dev proxy.

pub mod forward;
pub mod http;

use std::sync::Arc;

use axum::routing::{any, get};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::ProxyState;

/// Build the axum `Router` with all proxy routes.
pub fn build_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        // Health
        .route("/api/v1/health", get(http::health))
        // Agent calls → workflow run
        .route("/api/agents", any(forward::agents))
        .route("/api/agents/{*rest}", any(forward::agents))
        // Secrets → /v1/secrets
        .route("/api/secrets", any(forward::secrets))
        .route("/api/secrets/", any(forward::secrets))
        .route("/api/secrets/{*rest}", any(forward::secrets))
        // Middleware
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

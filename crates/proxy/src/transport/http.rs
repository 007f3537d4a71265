// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers served by the proxy itself.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::ProxyState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream: String,
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<ProxyState>>) -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned(), upstream: s.upstream.base_url().to_owned() })
}

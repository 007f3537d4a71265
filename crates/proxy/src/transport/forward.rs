// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rewrite-and-forward handlers for the playground's API paths.
//!
//! `/api/agents*` always lands on the workflow run endpoint with a bearer
//! key. `/api/secrets{rest}` maps to `/v1/secrets{rest}` with an `x-api-key`
//! header, keeping method, query and body.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::error::ProxyError;
use crate::state::ProxyState;
use crate::upstream::client::{Credential, Forward, SECRETS_PATH, WORKFLOW_RUN_PATH};

/// `ANY /api/agents[/{*rest}]`: relay to the workflow run endpoint.
pub async fn agents(
    State(s): State<Arc<ProxyState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let fwd = Forward {
        method,
        path: WORKFLOW_RUN_PATH.to_owned(),
        headers,
        body,
        credential: Credential::Bearer,
    };
    relay(&s, fwd).await
}

/// `ANY /api/secrets[/{*rest}]`: relay to the secrets collection.
pub async fn secrets(
    State(s): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let fwd = Forward {
        method,
        path: secrets_path(&uri),
        headers,
        body,
        credential: Credential::ApiKey,
    };
    relay(&s, fwd).await
}

/// Upstream path for a `/api/secrets…` request URI.
pub fn secrets_path(uri: &Uri) -> String {
    let rest = uri.path().strip_prefix("/api/secrets").unwrap_or_default();
    match uri.query() {
        Some(q) => format!("{SECRETS_PATH}{rest}?{q}"),
        None => format!("{SECRETS_PATH}{rest}"),
    }
}

async fn relay(state: &ProxyState, fwd: Forward) -> Response {
    let path = fwd.path.clone();
    match state.upstream.forward(fwd).await {
        Ok(relayed) => {
            let mut builder = Response::builder().status(relayed.status);
            if let Some(headers) = builder.headers_mut() {
                *headers = relayed.headers;
            }
            match builder.body(Body::from(relayed.body)) {
                Ok(resp) => resp,
                Err(e) => ProxyError::Internal.to_http_response(e.to_string()).into_response(),
            }
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "upstream request failed");
            ProxyError::UpstreamError.to_http_response(format!("upstream error: {e}")).into_response()
        }
    }
}

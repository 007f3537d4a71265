// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the upstream agent API.

use std::time::Duration;

use axum::http::HeaderMap;
use axum::http::Method;
use bytes::Bytes;
use reqwest::Client;

/// Upstream endpoint that runs agent workflows.
pub const WORKFLOW_RUN_PATH: &str = "/api/v1/workflows/run";

/// Upstream secrets collection.
pub const SECRETS_PATH: &str = "/v1/secrets";

/// How the proxy's key is presented upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer {key}`
    Bearer,
    /// `x-api-key: {key}`
    ApiKey,
}

/// Client request headers that never reach the upstream.
const STRIPPED_REQUEST_HEADERS: &[&str] =
    &["host", "content-length", "connection", "transfer-encoding", "authorization", X_API_KEY];

/// Upstream response headers not relayed to the client.
const STRIPPED_RESPONSE_HEADERS: &[&str] = &["content-length", "connection", "transfer-encoding"];

const X_API_KEY: &str = "x-api-key";

/// A request to relay upstream.
#[derive(Debug)]
pub struct Forward {
    pub method: Method,
    /// Upstream path, including any query string.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub credential: Credential,
}

/// What came back from upstream.
#[derive(Debug)]
pub struct Relayed {
    pub status: axum::http::StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP client wrapper for the upstream API.
pub struct UpstreamClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl UpstreamClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { base_url: base_url.trim_end_matches('/').to_owned(), api_key, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder, credential: Credential) -> reqwest::RequestBuilder {
        match (&self.api_key, credential) {
            (Some(key), Credential::Bearer) => req.bearer_auth(key),
            (Some(key), Credential::ApiKey) => req.header(X_API_KEY, key),
            (None, _) => req,
        }
    }

    /// Send `fwd` upstream and buffer the response.
    pub async fn forward(&self, fwd: Forward) -> Result<Relayed, reqwest::Error> {
        let url = self.url(&fwd.path);
        let req = self
            .client
            .request(fwd.method.clone(), &url)
            .headers(request_headers(fwd.headers))
            .body(fwd.body);
        let resp = self.apply_auth(req, fwd.credential).send().await?;

        let status = resp.status();
        let headers = response_headers(resp.headers());
        let body = resp.bytes().await?;
        tracing::debug!(method = %fwd.method, path = %fwd.path, status = status.as_u16(), "forwarded");
        Ok(Relayed { status, headers, body })
    }
}

fn request_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in STRIPPED_REQUEST_HEADERS {
        headers.remove(*name);
    }
    headers
}

fn response_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in STRIPPED_RESPONSE_HEADERS {
        out.remove(*name);
    }
    out
}

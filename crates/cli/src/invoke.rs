// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic agent invoker: POST a JSON payload, keep both sides for display.
//!
//! The upstream response schema varies by agent, so nothing here decodes it
//! beyond "JSON or text". Picking a display value out of the body is the job
//! of [`crate::extract`].

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream endpoint that runs agent workflows.
pub const WORKFLOW_RUN_PATH: &str = "/api/v1/workflows/run";

/// Upstream secrets collection.
pub const SECRETS_PATH: &str = "/v1/secrets";

/// Body of every agent call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub text: String,
    pub agent_names: Vec<String>,
    pub args: AgentArgs,
}

/// Task descriptor, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentArgs {
    SummarizeText,
    Custom { name: String, objective: String, instructions: String },
    Sentiment,
    ExtractCategorizedEntities,
    Classify { classify_by: Vec<String> },
    TranslateText { target_language: String },
    Moderation { threshold: f64 },
}

/// Outbound request as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedRequest {
    /// Real upstream endpoint, even when the call went through the proxy.
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    pub curl: String,
}

/// Response body: JSON when it says so and parses, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    /// Text verbatim, JSON stringified.
    pub fn to_message(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Json(Value::String(s)) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }
}

/// Inbound response as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

/// Both sides of one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub request: RecordedRequest,
    pub response: RecordedResponse,
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// No response arrived.
    #[error("{message}")]
    Transport { message: String, request: Box<RecordedRequest> },
    /// The response status was 400 or above.
    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String, exchange: Box<Exchange> },
}

impl InvokeError {
    /// The outbound request, which is recorded even when the call fails.
    pub fn request(&self) -> &RecordedRequest {
        match self {
            Self::Transport { request, .. } => request,
            Self::Status { exchange, .. } => &exchange.request,
        }
    }
}

/// Where calls go and how they authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Through the dev proxy: local paths, no credential.
    Proxy { base_url: String },
    /// Straight to the upstream with a bearer token.
    Direct { upstream: String, token: String },
}

/// HTTP client for agent calls.
pub struct AgentClient {
    route: Route,
    /// Upstream base used for the displayed URL and curl string.
    upstream: String,
    client: Client,
}

impl AgentClient {
    pub fn new(route: Route, upstream: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        let upstream = upstream.into().trim_end_matches('/').to_owned();
        Self { route, upstream, client }
    }

    /// URL actually requested for a local playground path.
    pub fn target_url(&self, path: &str) -> String {
        match &self.route {
            Route::Proxy { base_url } => format!("{}{path}", base_url.trim_end_matches('/')),
            Route::Direct { upstream, .. } => display_url(upstream, path),
        }
    }

    /// Invoke an agent at `path` with `request`.
    pub async fn invoke(&self, path: &str, request: &AgentRequest) -> Result<Exchange, InvokeError> {
        let body = serde_json::to_value(request).unwrap_or(Value::Null);
        self.call(Method::POST, path, &body).await
    }

    /// Send `body` to `path` and record both sides.
    pub async fn call(&self, method: Method, path: &str, body: &Value) -> Result<Exchange, InvokeError> {
        let display = display_url(&self.upstream, path);
        let headers =
            BTreeMap::from([("Content-Type".to_owned(), "application/json".to_owned())]);
        let request = RecordedRequest {
            curl: curl_command(method.as_str(), body, &display),
            url: display,
            method: method.as_str().to_owned(),
            headers,
            body: body.clone(),
        };

        let mut req = self.client.request(method, self.target_url(path)).json(body);
        if let Route::Direct { token, .. } = &self.route {
            req = req.bearer_auth(token);
        }

        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path, err = %e, "agent call failed");
                return Err(InvokeError::Transport {
                    message: e.to_string(),
                    request: Box::new(request),
                });
            }
        };

        let status = resp.status();
        let headers = header_map(resp.headers());
        let is_json = is_json_content(resp.headers());
        let text = resp.text().await.unwrap_or_default();
        let body = if is_json {
            serde_json::from_str(&text).map_or(ResponseBody::Text(text), ResponseBody::Json)
        } else {
            ResponseBody::Text(text)
        };

        let response = RecordedResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            body,
        };
        let exchange = Exchange { request, response };
        tracing::debug!(path, status = status.as_u16(), "agent call returned");

        if status.as_u16() >= 400 {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                message: exchange.response.body.to_message(),
                exchange: Box::new(exchange),
            });
        }
        Ok(exchange)
    }
}

/// Resolve a playground path to the upstream endpoint it stands for.
///
/// `/api/agents*` → workflow run, `/api/secrets*` → `/v1/secrets*`, anything
/// else is appended as-is.
pub fn display_url(upstream: &str, path: &str) -> String {
    let upstream = upstream.trim_end_matches('/');
    if path.starts_with("/api/agents") {
        format!("{upstream}{WORKFLOW_RUN_PATH}")
    } else if let Some(rest) = path.strip_prefix("/api/secrets") {
        format!("{upstream}{SECRETS_PATH}{rest}")
    } else {
        format!("{upstream}{path}")
    }
}

/// Copy-pasteable curl equivalent of a JSON call, with a key placeholder.
pub fn curl_command(method: &str, body: &Value, url: &str) -> String {
    let escaped = body.to_string().replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "curl -X {method} -H \"x-api-key: YOUR_API_KEY\" -H \"Content-Type: application/json\" -d \"{escaped}\" {url}"
    )
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
        .collect()
}

fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

#[cfg(test)]
#[path = "invoke_tests.rs"]
mod tests;

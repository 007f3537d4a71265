// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport to the remote secrets collection.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::secrets::{SecretList, SecretRecord, SecretWrite};

/// Failure of a single call against the secrets store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store answered 429.
    #[error("rate limited: {body}")]
    RateLimited { body: String },
    /// Any other non-success status. Displays as the response body.
    #[error("{body}")]
    Status { status: u16, body: String },
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
    /// A success response whose body could not be decoded.
    #[error("invalid secrets response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Rate limits and transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Transport(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Operations the provisioner needs from a secrets store.
pub trait SecretStore {
    /// List secret records, at most `limit` when given.
    fn list(
        &self,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<SecretRecord>, StoreError>> + Send;

    /// Create a new secret record.
    fn create(&self, write: &SecretWrite) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrite the record identified by `secret_id`.
    fn update(
        &self,
        secret_id: &str,
        write: &SecretWrite,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Secrets store reached over HTTP.
///
/// Through the dev proxy the collection is `{base}/api/secrets/` and the proxy
/// injects the key. Pointed straight at the upstream, pass `api_key` and it is
/// sent as `x-api-key`.
pub struct HttpSecretStore {
    collection_url: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpSecretStore {
    pub fn new(collection_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();
        let mut collection_url = collection_url.into();
        if !collection_url.ends_with('/') {
            collection_url.push('/');
        }
        Self { collection_url, api_key, client }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, secret_id: &str) -> String {
        format!("{}{secret_id}", self.collection_url)
    }

    fn apply_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }

    async fn send_write(&self, req: RequestBuilder, write: &SecretWrite) -> Result<(), StoreError> {
        let resp = self.apply_auth(req).json(write).send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

impl SecretStore for HttpSecretStore {
    async fn list(&self, limit: Option<usize>) -> Result<Vec<SecretRecord>, StoreError> {
        let url = match limit {
            Some(n) => format!("{}?limit={n}", self.collection_url),
            None => self.collection_url.clone(),
        };
        let resp = self.apply_auth(self.client.get(&url)).send().await?;
        let resp = check_status(resp).await?;
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        let list: SecretList =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(list.data)
    }

    async fn create(&self, write: &SecretWrite) -> Result<(), StoreError> {
        let req = self.client.post(&self.collection_url);
        self.send_write(req, write).await
    }

    async fn update(&self, secret_id: &str, write: &SecretWrite) -> Result<(), StoreError> {
        let req = self.client.patch(self.item_url(secret_id));
        self.send_write(req, write).await
    }
}

/// Map a response's status onto [`StoreError`], passing successes through.
async fn check_status(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(StoreError::RateLimited { body });
    }
    let body = if body.is_empty() { format!("HTTP {}", status.as_u16()) } else { body };
    Err(StoreError::Status { status: status.as_u16(), body })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

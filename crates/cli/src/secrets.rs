// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote secret records and the tool-scoped lookup built from them.
//!
//! Secrets live in a remote store. Each record binds one credential value to
//! one tool name under the `api_token` argument. The provisioner never keeps
//! these between runs: it fetches the list, indexes it into a [`SecretIndex`],
//! and decides create-vs-update from that index alone.

pub mod store;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::secrets::store::{SecretStore, StoreError};

/// Tool argument every provisioned secret binds to.
pub const TOOL_ARG_API_TOKEN: &str = "api_token";

/// One secret record as returned by the secrets listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub secret_id: String,
    pub secret_name: String,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_arg: String,
    #[serde(default)]
    pub is_default_for_tool: bool,
}

/// Envelope of `GET {collection}`.
#[derive(Debug, Default, Deserialize)]
pub struct SecretList {
    #[serde(default)]
    pub data: Vec<SecretRecord>,
}

/// Body of a secret create (`POST`) or update (`PATCH`).
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SecretWrite {
    pub secret_name: String,
    pub secret_value: String,
    pub tool_name: String,
    pub tool_arg: String,
    pub is_default_for_tool: bool,
}

impl SecretWrite {
    /// Default `api_token` binding of `value` for `tool`, named `{prefix}-{tool}`.
    pub fn api_token(prefix: &str, tool: &str, value: &str) -> Self {
        Self {
            secret_name: scoped_secret_name(prefix, tool),
            secret_value: value.to_owned(),
            tool_name: tool.to_owned(),
            tool_arg: TOOL_ARG_API_TOKEN.to_owned(),
            is_default_for_tool: true,
        }
    }
}

impl fmt::Debug for SecretWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretWrite")
            .field("secret_name", &self.secret_name)
            .field("secret_value", &"<redacted>")
            .field("tool_name", &self.tool_name)
            .field("tool_arg", &self.tool_arg)
            .field("is_default_for_tool", &self.is_default_for_tool)
            .finish()
    }
}

/// Composite name a tool's secret is stored under.
pub fn scoped_secret_name(prefix: &str, tool: &str) -> String {
    format!("{prefix}-{tool}")
}

/// Lookup over a snapshot of the remote secret list.
///
/// Later records win when two share a name or tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretIndex {
    by_name: HashMap<String, String>,
    by_tool: HashMap<String, String>,
}

impl SecretIndex {
    pub fn from_records(records: &[SecretRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            index.by_name.insert(record.secret_name.clone(), record.secret_id.clone());
            if let Some(ref tool) = record.tool_name {
                if record.tool_arg == TOOL_ARG_API_TOKEN {
                    index.by_tool.insert(tool.clone(), record.secret_id.clone());
                }
            }
        }
        index
    }

    /// Secret id stored under an exact secret name.
    pub fn secret_id(&self, secret_name: &str) -> Option<&str> {
        self.by_name.get(secret_name).map(String::as_str)
    }

    /// Secret id stored under `{prefix}-{tool}`.
    pub fn scoped(&self, prefix: &str, tool: &str) -> Option<&str> {
        self.secret_id(&scoped_secret_name(prefix, tool))
    }

    /// Secret id bound to `tool` as its `api_token`, whatever its name.
    pub fn tool_secret(&self, tool: &str) -> Option<&str> {
        self.by_tool.get(tool).map(String::as_str)
    }

    /// True when any of `tools` already has an `api_token` secret.
    pub fn is_configured(&self, tools: &[&str]) -> bool {
        tools.iter().any(|tool| self.by_tool.contains_key(*tool))
    }

    /// Number of distinct secret names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Fetch the secret list and index it.
pub async fn fetch_index<S: SecretStore>(
    store: &S,
    limit: Option<usize>,
) -> Result<SecretIndex, StoreError> {
    let records = store.list(limit).await?;
    tracing::debug!(records = records.len(), ?limit, "indexed secret list");
    Ok(SecretIndex::from_records(&records))
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;

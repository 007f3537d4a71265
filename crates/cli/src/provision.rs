// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk credential provisioning: bind one secret value to every tool of an
//! integration against a rate-limited secrets store.
//!
//! - **Batching**: tools are written in consecutive chunks of `batch_size`;
//!   writes inside a chunk run concurrently, chunks run one after another
//!   with `batch_delay` between them.
//! - **Create vs update**: decided per tool from a [`SecretIndex`] fetched
//!   before the first write.
//! - **Retries**: 429s and transport failures back off `2^attempt * backoff_base`;
//!   any other error status is final for that tool.
//! - **Aggregation**: per-tool failures are collected and the job fails as a
//!   whole if any tool is left unwritten.

use std::fmt;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;

use crate::secrets::store::{SecretStore, StoreError};
use crate::secrets::{fetch_index, scoped_secret_name, SecretIndex, SecretWrite};

/// Tools written concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 2;

/// Pause between batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(1000);

/// Additional attempts per write after the first.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff step; doubles per attempt.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Page size of the listing re-fetched after a successful job.
pub const DEFAULT_REFRESH_LIMIT: usize = 100;

/// Concurrency and retry policy for one provisioning job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPolicy {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub refresh_limit: usize,
}

impl Default for ProvisionPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            refresh_limit: DEFAULT_REFRESH_LIMIT,
        }
    }
}

impl ProvisionPolicy {
    /// Wait before retry number `attempt + 1`: 1s, 2s, 4s, ... for the default base.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Number of batches needed for `tools` items.
    pub fn batch_count(&self, tools: usize) -> usize {
        tools.div_ceil(self.batch_size.max(1))
    }

    /// Total attempts per write.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// One user-initiated "save this key for every tool" action.
#[derive(Clone)]
pub struct ProvisionJob {
    pub secret_name_prefix: String,
    pub secret_value: String,
    pub tool_names: Vec<String>,
}

impl ProvisionJob {
    pub fn new(
        secret_name_prefix: impl Into<String>,
        secret_value: impl Into<String>,
        tool_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            secret_name_prefix: secret_name_prefix.into(),
            secret_value: secret_value.into(),
            tool_names: tool_names.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Debug for ProvisionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionJob")
            .field("secret_name_prefix", &self.secret_name_prefix)
            .field("secret_value", &"<redacted>")
            .field("tool_names", &self.tool_names)
            .finish()
    }
}

/// Items finished after a batch, out of the job total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// How a tool's secret was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    Create,
    Update,
}

/// A tool whose secret was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub tool_name: String,
    pub mode: WriteMode,
}

/// A tool whose secret could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub tool_name: String,
    pub message: String,
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tool_name, self.message)
    }
}

/// Result of a job in which every tool was written.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub outcomes: Vec<ToolOutcome>,
    pub completed: usize,
    /// Index re-fetched after the writes; `None` if that fetch failed.
    pub refreshed: Option<SecretIndex>,
}

impl ProvisionReport {
    /// "updated" when every tool already had a secret, "saved" otherwise.
    pub fn action_label(&self) -> &'static str {
        let all_updates = !self.outcomes.is_empty()
            && self.outcomes.iter().all(|o| o.mode == WriteMode::Update);
        if all_updates {
            "updated"
        } else {
            "saved"
        }
    }

    pub fn count(&self, mode: WriteMode) -> usize {
        self.outcomes.iter().filter(|o| o.mode == mode).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("failed to fetch existing secrets: {0}")]
    Fetch(#[source] StoreError),
    #[error("Failed to save secrets for some tools:\n{}", join_failures(.0))]
    Failed(Vec<ToolFailure>),
}

impl ProvisionError {
    /// Names of the tools left unwritten.
    pub fn failed_tools(&self) -> Vec<&str> {
        match self {
            Self::Fetch(_) => Vec::new(),
            Self::Failed(failures) => failures.iter().map(|f| f.tool_name.as_str()).collect(),
        }
    }
}

fn join_failures(failures: &[ToolFailure]) -> String {
    failures.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Where a single write goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WriteTarget {
    Create,
    Update(String),
}

impl WriteTarget {
    fn mode(&self) -> WriteMode {
        match self {
            Self::Create => WriteMode::Create,
            Self::Update(_) => WriteMode::Update,
        }
    }
}

/// Run a provisioning job to completion.
///
/// `on_progress` is called once per finished batch.
pub async fn provision<S, F>(
    store: &S,
    job: &ProvisionJob,
    policy: &ProvisionPolicy,
    mut on_progress: F,
) -> Result<ProvisionReport, ProvisionError>
where
    S: SecretStore,
    F: FnMut(Progress),
{
    let existing = fetch_index(store, None).await.map_err(ProvisionError::Fetch)?;

    let total = job.tool_names.len();
    let batch_size = policy.batch_size.max(1);
    let batches = policy.batch_count(total);
    tracing::info!(
        prefix = %job.secret_name_prefix,
        tools = total,
        batches,
        existing = existing.len(),
        "provision: starting"
    );

    let mut outcomes = Vec::with_capacity(total);
    let mut failures = Vec::new();
    let mut completed = 0;

    for (index, batch) in job.tool_names.chunks(batch_size).enumerate() {
        let writes = batch.iter().map(|tool| {
            let name = scoped_secret_name(&job.secret_name_prefix, tool);
            let target = match existing.secret_id(&name) {
                Some(id) => WriteTarget::Update(id.to_owned()),
                None => WriteTarget::Create,
            };
            let write = SecretWrite::api_token(&job.secret_name_prefix, tool, &job.secret_value);
            async move { write_with_retry(store, tool, &target, &write, policy).await }
        });

        for result in join_all(writes).await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(failure) => {
                    tracing::warn!(tool = %failure.tool_name, err = %failure.message, "provision: tool failed");
                    failures.push(failure);
                }
            }
        }

        completed += batch.len();
        on_progress(Progress { completed, total });
        tracing::debug!(batch = index + 1, batches, completed, total, "provision: batch complete");

        if index + 1 < batches {
            tokio::time::sleep(policy.batch_delay).await;
        }
    }

    if !failures.is_empty() {
        tracing::warn!(failed = failures.len(), total, "provision: job failed");
        return Err(ProvisionError::Failed(failures));
    }

    let refreshed = match fetch_index(store, Some(policy.refresh_limit)).await {
        Ok(index) => Some(index),
        Err(e) => {
            tracing::warn!(err = %e, "provision: could not refresh secret list");
            None
        }
    };

    tracing::info!(completed, "provision: all tools written");
    Ok(ProvisionReport { outcomes, completed, refreshed })
}

/// Write one tool's secret, retrying rate limits and transport failures.
async fn write_with_retry<S: SecretStore>(
    store: &S,
    tool: &str,
    target: &WriteTarget,
    write: &SecretWrite,
    policy: &ProvisionPolicy,
) -> Result<ToolOutcome, ToolFailure> {
    let fail = |message: String| ToolFailure { tool_name: tool.to_owned(), message };

    for attempt in 0..=policy.max_retries {
        let result = match target {
            WriteTarget::Create => store.create(write).await,
            WriteTarget::Update(id) => store.update(id, write).await,
        };
        let err = match result {
            Ok(()) => return Ok(ToolOutcome { tool_name: tool.to_owned(), mode: target.mode() }),
            Err(e) => e,
        };

        match err {
            e if e.is_retryable() && attempt < policy.max_retries => {
                let wait = policy.backoff(attempt);
                tracing::debug!(tool, attempt, wait_ms = wait.as_millis() as u64, err = %e, "provision: retrying write");
                tokio::time::sleep(wait).await;
            }
            StoreError::RateLimited { body } => {
                return Err(fail(format!(
                    "Rate limited after {} attempts: {body}",
                    policy.attempts()
                )));
            }
            e => return Err(fail(e.to_string())),
        }
    }

    Err(fail("Max retries exceeded".to_owned()))
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;

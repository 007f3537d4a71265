// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agentplay provision`: save one API key for every tool of an integration.

use std::time::Duration;

use crate::config::Config;
use crate::integration::Integration;
use crate::provision::{
    provision, ProvisionJob, ProvisionPolicy, ProvisionReport,
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_RETRIES,
};
use crate::secrets::store::HttpSecretStore;

#[derive(Debug, clap::Args)]
pub struct ProvisionArgs {
    /// Integration whose tools get the key (only github has tools).
    pub integration: Integration,

    /// Secret name prefix (defaults to `<integration>-api-key`).
    #[arg(long)]
    pub secret_name: Option<String>,

    /// API key to store.
    #[arg(long, env = "AGENTPLAY_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Tools written concurrently per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Pause between batches in milliseconds.
    #[arg(long, default_value = "1000")]
    pub batch_delay_ms: u64,

    /// Retries per tool after a rate limit or transport failure.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl ProvisionArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.integration.supports_provisioning() {
            anyhow::bail!("{} has no tools to provision", self.integration.display_name());
        }
        if self.batch_size == 0 {
            anyhow::bail!("--batch-size must be greater than zero");
        }
        if self.token.trim().is_empty() {
            anyhow::bail!("--token must not be empty");
        }
        if self.secret_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            anyhow::bail!("--secret-name must not be empty");
        }
        Ok(())
    }

    pub fn secret_name(&self) -> String {
        self.secret_name.clone().unwrap_or_else(|| self.integration.default_secret_name())
    }

    pub fn policy(&self) -> ProvisionPolicy {
        ProvisionPolicy {
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            max_retries: self.max_retries,
            ..ProvisionPolicy::default()
        }
    }

    pub fn job(&self) -> ProvisionJob {
        ProvisionJob::new(
            self.secret_name(),
            self.token.trim(),
            self.integration.tool_names().iter().copied(),
        )
    }
}

/// Run `agentplay provision`. Returns a process exit code.
pub async fn run(config: &Config, args: &ProvisionArgs) -> i32 {
    let store =
        HttpSecretStore::new(config.secrets_collection_url(), config.api_key.clone(), config.timeout());
    let job = args.job();
    let integration = args.integration;

    eprintln!(
        "Saving {} API key for {} tools as '{}'...",
        integration.display_name(),
        job.tool_names.len(),
        job.secret_name_prefix
    );
    let result = provision(&store, &job, &args.policy(), |p| {
        eprintln!("  {}/{} tools", p.completed, p.total);
    })
    .await;

    match result {
        Ok(report) => {
            println!("{}", success_message(integration, &report));
            if report.refreshed.is_none() {
                eprintln!("warning: could not refresh the secret list");
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

pub fn success_message(integration: Integration, report: &ProvisionReport) -> String {
    format!(
        "Successfully {} {} API key for all {} tools",
        report.action_label(),
        integration.display_name(),
        report.completed
    )
}

#[cfg(test)]
#[path = "provision_tests.rs"]
mod tests;

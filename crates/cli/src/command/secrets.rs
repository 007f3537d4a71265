// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agentplay secrets`: inspect what the secret store holds.

use crate::config::Config;
use crate::integration::Integration;
use crate::secrets::store::{HttpSecretStore, SecretStore};
use crate::secrets::{SecretIndex, SecretRecord};

#[derive(Debug, clap::Args)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SecretsCommand {
    /// List secret records (never their values).
    List {
        /// Maximum records to fetch.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show how many tools of an integration have a key.
    Status {
        integration: Integration,
    },
}

/// Run `agentplay secrets`. Returns a process exit code.
pub async fn run(config: &Config, args: &SecretsArgs) -> i32 {
    let store =
        HttpSecretStore::new(config.secrets_collection_url(), config.api_key.clone(), config.timeout());

    let limit = match &args.command {
        SecretsCommand::List { limit } => *limit,
        SecretsCommand::Status { .. } => None,
    };
    let records = match store.list(limit).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    match &args.command {
        SecretsCommand::List { .. } => print!("{}", render_table(&records)),
        SecretsCommand::Status { integration } => {
            let index = SecretIndex::from_records(&records);
            println!("{}", status_line(*integration, &index));
        }
    }
    0
}

pub fn render_table(records: &[SecretRecord]) -> String {
    if records.is_empty() {
        return "No secrets stored.\n".to_owned();
    }
    let mut out = format!("{:<38} {:<40} {:<10}\n", "SECRET_ID", "NAME", "TOOL");
    out.push_str(&"-".repeat(90));
    out.push('\n');
    for record in records {
        let tool = record.tool_name.as_deref().unwrap_or("-");
        out.push_str(&format!("{:<38} {:<40} {tool}\n", record.secret_id, record.secret_name));
    }
    out
}

pub fn status_line(integration: Integration, index: &SecretIndex) -> String {
    let tools = integration.tool_names();
    if tools.is_empty() {
        return format!("{}: no tools to configure", integration.display_name());
    }
    let present = tools.iter().filter(|t| index.tool_secret(t).is_some()).count();
    let state = if index.is_configured(tools) { "configured" } else { "not configured" };
    format!("{}: {state} ({present}/{} tools)", integration.display_name(), tools.len())
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;

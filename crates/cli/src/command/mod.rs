// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands: `invoke`, `provision`, `secrets`.

pub mod invoke;
pub mod provision;
pub mod secrets;

use crate::config::Config;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Call an agent and show the request, a best-effort result, and the
    /// raw response.
    Invoke(invoke::InvokeArgs),
    /// Save one API key for every tool of an integration.
    Provision(provision::ProvisionArgs),
    /// Inspect stored secrets.
    Secrets(secrets::SecretsArgs),
}

impl Command {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Invoke(args) => args.validate(),
            Self::Provision(args) => args.validate(),
            Self::Secrets(_) => Ok(()),
        }
    }
}

/// Run the parsed subcommand. Returns a process exit code.
pub async fn run(config: &Config) -> i32 {
    match &config.command {
        Command::Invoke(args) => invoke::run(config, args).await,
        Command::Provision(args) => provision::run(config, args).await,
        Command::Secrets(args) => secrets::run(config, args).await,
    }
}

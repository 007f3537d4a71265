// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;

use crate::command::Command;
use crate::invoke::{Route, SECRETS_PATH};

/// Upstream agent API used when `IO_API_BASE` is unset.
pub const DEFAULT_UPSTREAM: &str = "https://api.intelligence-dev.io.solutions";

/// Local dev proxy address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5173";

/// Playground client for a multi-agent text-processing API.
#[derive(Debug, Parser)]
#[command(name = "agentplay", version, about)]
pub struct Config {
    /// Dev proxy the requests go through.
    #[arg(long, env = "AGENTPLAY_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Upstream API base. Used for displayed URLs, and as the target when
    /// --api-key is set.
    #[arg(long, env = "IO_API_BASE", default_value = DEFAULT_UPSTREAM, global = true)]
    pub upstream: String,

    /// Call the upstream directly with this key instead of going through the
    /// proxy.
    #[arg(long, env = "AGENTPLAY_SECRETS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "AGENTPLAY_TIMEOUT_SECS", default_value = "30", global = true)]
    pub timeout_secs: u64,

    /// Log format (json or text).
    #[arg(long, env = "AGENTPLAY_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "AGENTPLAY_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs must be greater than zero");
        }
        if self.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            anyhow::bail!("--api-key must not be empty");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        self.command.validate()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Secrets collection, direct or through the proxy.
    pub fn secrets_collection_url(&self) -> String {
        match self.api_key {
            Some(_) => format!("{}{SECRETS_PATH}/", self.upstream.trim_end_matches('/')),
            None => format!("{}/api/secrets/", self.base_url.trim_end_matches('/')),
        }
    }

    /// Where agent calls go.
    pub fn agent_route(&self) -> Route {
        match &self.api_key {
            Some(key) => Route::Direct { upstream: self.upstream.clone(), token: key.clone() },
            None => Route::Proxy { base_url: self.base_url.clone() },
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

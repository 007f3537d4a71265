// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Upstream agent API used when `IO_API_BASE` is unset.
pub const DEFAULT_UPSTREAM: &str = "https://api.intelligence-dev.io.solutions";

/// Configuration for the agentproxy dev server.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "agentproxy", version, about)]
pub struct ProxyConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "AGENTPROXY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 5173, env = "AGENTPROXY_PORT")]
    pub port: u16,

    /// Upstream API base URL.
    #[arg(long, default_value = DEFAULT_UPSTREAM, env = "IO_API_BASE")]
    pub upstream: String,

    /// API key injected into every forwarded request. If unset, requests are
    /// forwarded without credentials.
    #[arg(long, env = "IO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = 120, env = "AGENTPROXY_TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl ProxyConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upstream_base(&self) -> &str {
        self.upstream.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

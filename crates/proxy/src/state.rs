// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::ProxyConfig;
use crate::upstream::client::UpstreamClient;

/// Shared proxy state.
pub struct ProxyState {
    pub upstream: UpstreamClient,
}

impl ProxyState {
    pub fn new(config: &ProxyConfig) -> Self {
        let upstream =
            UpstreamClient::new(config.upstream_base(), config.api_key.clone(), config.timeout());
        Self { upstream }
    }
}

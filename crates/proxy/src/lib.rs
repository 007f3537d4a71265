// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agentproxy: dev reverse proxy that forwards playground calls to the
//! upstream agent API with the server-held key.

pub mod config;
pub mod error;
pub mod state;
pub mod transport;
pub mod upstream;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ProxyConfig;
use crate::state::ProxyState;
use crate::transport::build_router;

/// Run the proxy server until shutdown.
pub async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    let addr = config.addr();
    let shutdown = CancellationToken::new();

    if config.api_key.is_none() {
        tracing::warn!("IO_API_KEY is not set; requests are forwarded without credentials");
    }

    let state = Arc::new(ProxyState::new(&config));
    tracing::info!("agentproxy listening on {addr} (upstream {})", state.upstream.base_url());

    {
        let sd = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("received SIGINT");
            }
            sd.cancel();
        });
    }

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}

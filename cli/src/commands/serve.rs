// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `asb-gateway serve`: build the gateway context once and serve HTTP until a
//! shutdown signal arrives.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use asb_core::domain::gateway_config::GatewayConfig;
use asb_core::infrastructure::GatewayContext;
use asb_core::presentation::api;

use crate::telemetry;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// HTTP API host (default: spec.network.bind_address)
    #[arg(long, env = "ASB_HOST")]
    pub host: Option<String>,

    /// HTTP API port (default: spec.network.port)
    #[arg(long, env = "ASB_PORT")]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Flag values override the loaded network section.
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.spec.network.bind_address = host.clone();
        }
        if let Some(port) = self.port {
            config.spec.network.port = port;
        }
    }
}

pub async fn run(args: ServeArgs, mut config: GatewayConfig) -> Result<()> {
    args.apply(&mut config);

    telemetry::install_metrics(&config.spec.metrics, &config.spec.network.bind_address)?;

    let addr = format!(
        "{}:{}",
        config.spec.network.bind_address, config.spec.network.port
    );

    let context = Arc::new(
        GatewayContext::from_config(config).context("Failed to initialize gateway")?,
    );
    let settings = &context.config().spec;
    info!(
        service = %settings.service.name,
        environment = settings.service.environment.as_deref().unwrap_or("-"),
        policy = %settings.policy.url,
        chat_mode = ?settings.upstream.chat.mode,
        search_backend = ?settings.rag.backend,
        "Gateway context ready"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Gateway listening on {}", addr);

    let served = axum::serve(listener, api::app(context.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed");

    info!("Gateway shutting down");
    context.shutdown().await;

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_network_section() {
        let mut config = GatewayConfig::default();
        ServeArgs {
            host: Some("127.0.0.1".to_string()),
            port: Some(9100),
        }
        .apply(&mut config);
        assert_eq!(config.spec.network.bind_address, "127.0.0.1");
        assert_eq!(config.spec.network.port, 9100);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = GatewayConfig::default();
        ServeArgs::default().apply(&mut config);
        assert_eq!(config.spec.network.bind_address, "0.0.0.0");
        assert_eq!(config.spec.network.port, 8000);
    }
}

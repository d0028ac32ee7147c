// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Logging and metrics bootstrap for the gateway process.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use asb_core::domain::gateway_config::{LoggingConfig, MetricsConfig};

/// Log filter directive: `--log-level` wins over the configured level.
/// `RUST_LOG`, when set, wins over both (see [`init_logging`]).
pub fn filter_directive<'a>(cli_level: Option<&'a str>, config: &'a LoggingConfig) -> &'a str {
    cli_level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(&config.level)
}

/// Initialize tracing subscriber for logging
pub fn init_logging(cli_level: Option<&str>, config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(cli_level, config)))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.format.eq_ignore_ascii_case("json") {
        builder.json().with_current_span(false).init();
    } else {
        builder.with_target(false).compact().init();
    }

    Ok(())
}

/// Start the Prometheus scrape endpoint when metrics are enabled.
///
/// Must run inside the Tokio runtime; the exporter spawns its listener on it.
pub fn install_metrics(config: &MetricsConfig, bind_address: &str) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let listen = format!("{}:{}", bind_address, config.port);
    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("Invalid metrics listen address {}", listen))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus exporter")?;

    info!("Prometheus metrics available at http://{}/metrics", addr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_overrides_config() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: "text".to_string(),
        };
        assert_eq!(filter_directive(Some("debug"), &config), "debug");
        assert_eq!(filter_directive(None, &config), "warn");
        assert_eq!(filter_directive(Some("  "), &config), "warn");
    }

    #[test]
    fn test_disabled_metrics_is_noop() {
        let config = MetricsConfig {
            enabled: false,
            port: 0,
        };
        assert!(install_metrics(&config, "not an address").is_ok());
    }
}

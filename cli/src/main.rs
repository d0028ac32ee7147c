// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # ASB Secure Gateway
//!
//! The `asb-gateway` binary hosts the policy-enforced mediation core over HTTP.
//!
//! ## Commands
//!
//! - `asb-gateway serve [--host H] [--port P]` - Run the gateway until Ctrl+C/SIGTERM
//! - `asb-gateway config show|validate|generate` - Configuration management
//!
//! Configuration is loaded once per invocation: `.env` first, then the YAML
//! manifest found by discovery, then environment overrides.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use asb_core::domain::gateway_config::GatewayConfig;
use asb_gateway::commands::{self, ConfigCommand, ServeArgs};
use asb_gateway::telemetry;

/// ASB Secure Gateway - policy-enforced access to models, knowledge and tools
#[derive(Parser)]
#[command(name = "asb-gateway")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "ASB_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to spec.logging.level
    #[arg(long, global = true, env = "ASB_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway HTTP server
    #[command(name = "serve")]
    Serve(ServeArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => {
            let config = GatewayConfig::load_or_default(cli.config)
                .context("Failed to load configuration")?;
            telemetry::init_logging(cli.log_level.as_deref(), &config.spec.logging)?;
            info!(
                "Starting {} v{}",
                config.spec.service.name,
                env!("CARGO_PKG_VERSION")
            );
            commands::serve::run(args, config).await
        }
        Some(Commands::Config { command }) => {
            telemetry::init_logging(
                Some(cli.log_level.as_deref().unwrap_or("warn")),
                &Default::default(),
            )?;
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

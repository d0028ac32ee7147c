// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use asb_core::domain::gateway_config::{GatewayConfig, CONFIG_PATH_ENV};

const TEMPLATE: &str = include_str!("../../templates/asb-gateway.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./asb-gateway.yaml)
        #[arg(short, long, default_value = "./asb-gateway.yaml")]
        output: PathBuf,

        /// Write every built-in default instead of the annotated template
        #[arg(long)]
        defaults: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output, defaults } => generate(output, defaults),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = GatewayConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        let mut candidates = GatewayConfig::candidate_paths().into_iter();
        if std::env::var(CONFIG_PATH_ENV).is_ok() {
            if let Some(path) = candidates.next() {
                println!("  2. {}: {}", CONFIG_PATH_ENV, path.display());
            }
        } else {
            println!("  2. {}: {}", CONFIG_PATH_ENV, "(not set)".dimmed());
        }
        for (idx, path) in candidates.enumerate() {
            let marker = if path.exists() { "found".green() } else { "missing".dimmed() };
            println!("  {}. {} ({})", idx + 3, path.display(), marker);
        }
        println!();
    }

    let spec = &config.spec;
    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Service:".bold());
    println!("  Name: {}", spec.service.name);
    println!(
        "  Environment: {}",
        spec.service.environment.as_deref().unwrap_or("(none)")
    );
    println!();

    println!("{}", "Policy:".bold());
    println!("  Decision point: {}", spec.policy.url);
    println!(
        "  Timeouts: connect {:?}, total {:?}",
        spec.policy.connect_timeout, spec.policy.request_timeout
    );
    println!("  Chat rule: {}", spec.policy.paths.chat);
    println!("  Search rule: {}", spec.policy.paths.search);
    println!("  Agent rule: {}", spec.policy.paths.agent);
    println!();

    let chat = &spec.upstream.chat;
    println!("{}", "Chat upstream:".bold());
    println!("  Mode: {:?}", chat.mode);
    println!("  Base URL: {}", chat.base_url);
    let credential = if chat.resolve_api_key().is_some() {
        "configured".green()
    } else {
        "missing".yellow()
    };
    println!("  Credential: {}", credential);
    println!();

    let rag = &spec.rag;
    println!("{}", "Knowledge search:".bold());
    println!("  Backend: {:?}", rag.backend);
    println!(
        "  Table: {} ({} / {} / {})",
        rag.table, rag.vector_column, rag.text_column, rag.metadata_column
    );
    println!("  top_k: default {}, max {}", rag.top_k_default, rag.max_top_k);
    println!();

    println!("{}", "Agent tools:".bold());
    for tool in &spec.agent.allowed_tools {
        println!("  - {}", tool);
    }
    println!();

    println!("{}", "Event disclosure:".bold());
    println!("  Message content: {}", spec.events.include_message_content);
    println!("  Query text: {}", spec.events.include_query_text);
    println!();

    println!("{}", "Network:".bold());
    println!("  Listen: {}:{}", spec.network.bind_address, spec.network.port);
    if let Some(deadline) = spec.network.request_deadline {
        println!("  Request deadline: {:?}", deadline);
    }
    if spec.metrics.enabled {
        println!("  Metrics: {}:{}", spec.network.bind_address, spec.metrics.port);
    }
    println!();

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: PathBuf, defaults: bool) -> Result<()> {
    if defaults {
        GatewayConfig::default().to_yaml_file(&output)?;
    } else {
        std::fs::write(&output, TEMPLATE)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    }

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

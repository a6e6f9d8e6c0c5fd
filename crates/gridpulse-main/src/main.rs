// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of GridPulse.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod app;
mod cli;
mod config;
mod watcher;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Cli, Command};
use crate::config::{AppConfig, ConfigSource};

fn init_tracing(log_level: &str) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.system.log_level)?;

    match &source {
        ConfigSource::File(path) => info!("✅ Loaded configuration from {}", path.display()),
        ConfigSource::Defaults => info!("No configuration file found, using defaults"),
    }

    let feed = app::build_source(&config)?;

    match cli.selected_command() {
        Command::Run => {
            info!("🚀 Starting GridPulse v{}", env!("CARGO_PKG_VERSION"));
            info!("📋 Configuration Summary:");
            info!("   Forecast feed: {}", config.feed.forecast_url);
            info!(
                "   Refresh interval: {}s",
                config.monitor.refresh_interval_secs
            );
            info!(
                "   Startup: {} attempt(s), {}s apart",
                config.monitor.startup_attempts, config.monitor.startup_retry_delay_secs
            );
            info!(
                "   Tracker state: {}",
                config.monitor.tracker_state_path.display()
            );
            app::run_daemon(config, source, feed).await
        }
        command => {
            let output = app::execute(command, &config, feed).await?;
            println!("{output}");
            Ok(())
        }
    }
}

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

//! Wiring between configuration, adapters and the core monitor.

use anyhow::{Context, Result};
use gridpulse_adapters::{
    JsonFilePublisher, LoggingCapabilityPublisher, PowerAlertClient, TracingNotifier,
    WebhookNotifier,
};
use gridpulse_core::{
    CapabilityPublisher, CapabilityValues, CycleOutcome, ExportArchive, FeedSource, GridMonitor,
    GridQueryService, RefreshScheduler, TokioRefreshScheduler, TrackerStore, WindowOutcome,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::{AppConfig, ConfigSource};
use crate::watcher::{ConfigWatcher, SettingsListener};

pub fn build_source(config: &AppConfig) -> Result<Arc<dyn FeedSource>> {
    let client = PowerAlertClient::new(
        &config.feed.forecast_url,
        &config.feed.current_status_url,
        config.feed_timeout(),
    )?;
    Ok(Arc::new(client))
}

pub fn build_monitor(config: &AppConfig, source: Arc<dyn FeedSource>) -> Result<GridMonitor> {
    let mut monitor = GridMonitor::new(source)
        .with_options(config.monitor_options())
        .with_settings(config.settings.clone())
        .with_store(TrackerStore::new(&config.monitor.tracker_state_path))
        .with_notifier(Arc::new(TracingNotifier));

    if let Some(url) = &config.notifications.webhook_url {
        info!("📨 Change events will be POSTed to {}", url);
        monitor = monitor.with_notifier(Arc::new(WebhookNotifier::new(url.as_str())?));
    }

    let publisher: Arc<dyn CapabilityPublisher> = match &config.notifications.capability_file {
        Some(path) => Arc::new(JsonFilePublisher::new(path)),
        None => Arc::new(LoggingCapabilityPublisher),
    };
    info!("📊 Capability publisher: {}", publisher.name());

    Ok(monitor.with_publisher(publisher))
}

/// Refresh periodically until ctrl-c
pub async fn run_daemon(
    config: AppConfig,
    source: ConfigSource,
    feed: Arc<dyn FeedSource>,
) -> Result<()> {
    let monitor = Arc::new(build_monitor(&config, feed)?);
    monitor.initialize().await?;

    let scheduler = TokioRefreshScheduler::new(Arc::clone(&monitor));
    let handle = scheduler.schedule(config.refresh_interval());
    let mut listener = SettingsListener::new(handle, config.refresh_interval());

    let mut watcher = match source {
        ConfigSource::File(path) => {
            info!("👀 Watching {} for settings changes", path.display());
            Some(ConfigWatcher::new(path))
        }
        ConfigSource::Defaults => None,
    };
    let mut poll = tokio::time::interval(config.settings_watch_interval());
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for shutdown signal");
                }
                info!("🛑 Shutting down");
                break;
            }
            _ = poll.tick(), if watcher.is_some() => {
                let Some(watcher) = watcher.as_mut() else { continue };
                match watcher.poll() {
                    Ok(Some(reloaded)) => listener.apply(&monitor, &scheduler, &reloaded),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Ignoring invalid configuration change"),
                }
            }
        }
    }

    scheduler.shutdown();
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Run a one-shot command, returning what to print
pub async fn execute(
    command: Command,
    config: &AppConfig,
    feed: Arc<dyn FeedSource>,
) -> Result<String> {
    let queries = GridQueryService::new(Arc::clone(&feed)).with_settings(config.settings.clone());

    match command {
        Command::Run => anyhow::bail!("`run` is not a one-shot command"),
        Command::Once => {
            let monitor = build_monitor(config, feed)?;
            match monitor.refresh().await {
                CycleOutcome::Committed(report) => to_json(&json!({
                    "snapshot": &*report.snapshot,
                    "capabilities": CapabilityValues::from_snapshot(&report.snapshot),
                    "change": report.observation.change,
                    "crossings": report.observation.crossings,
                })),
                CycleOutcome::Failed(e) => Err(e).context("Refresh cycle failed"),
                CycleOutcome::Skipped => anyhow::bail!("Refresh cycle skipped"),
            }
        }
        Command::Status => {
            let status = queries.current_status().await?;
            to_json(&json!({
                "point": status.point,
                "color_id": status.color_id,
            }))
        }
        Command::Metric { name } => {
            let value = queries.get_metric(&name).await?;
            to_json(&json!({ "metric": name, "value": value }))
        }
        Command::Check { state } => {
            let holds = queries.check_state(&state).await?;
            to_json(&json!({ "state": state, "holds": holds }))
        }
        Command::Window {
            duration,
            start,
            end,
        } => {
            let outcome = queries.find_optimal_window(duration, &start, &end).await?;
            if let WindowOutcome::NotFound { .. } = &outcome {
                warn!("No window between {} and {} fits {} minutes", start, end, duration);
            }
            to_json(&outcome.into_report())
        }
        Command::Risk { sensitivity } => to_json(&queries.score_risk(&sensitivity).await?),
        Command::Timeline { hours } => to_json(&queries.build_timeline(hours).await?),
        Command::Export {
            hours,
            format,
            save,
        } => {
            let export = queries.export_history(hours, &format).await?;
            if save {
                let path = ExportArchive::new(&config.system.export_dir).store(&export)?;
                Ok(path.display().to_string())
            } else {
                Ok(export.content)
            }
        }
    }
}

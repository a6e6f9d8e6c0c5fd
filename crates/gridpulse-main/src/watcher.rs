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

use anyhow::Result;
use gridpulse_core::{GridMonitor, RefreshScheduler, ScheduleHandle};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Detects edits to the config file by modification time
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        Self {
            path,
            last_modified,
        }
    }

    /// Reload the file if it changed since the last poll
    ///
    /// A file that changed but fails to load is reported once; the next edit is retried.
    pub fn poll(&mut self) -> Result<Option<AppConfig>> {
        let Some(modified) = modified(&self.path) else {
            return Ok(None);
        };
        if self.last_modified == Some(modified) {
            return Ok(None);
        }
        self.last_modified = Some(modified);

        debug!("Config file {} changed, reloading", self.path.display());
        let mut config = AppConfig::from_file(&self.path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(Some(config))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Feeds reloaded configuration into the running monitor
#[derive(Debug)]
pub struct SettingsListener {
    handle: ScheduleHandle,
    interval: Duration,
}

impl SettingsListener {
    pub fn new(handle: ScheduleHandle, interval: Duration) -> Self {
        Self { handle, interval }
    }

    /// Swap in new settings, restarting the refresh timer if its interval changed
    pub fn apply(
        &mut self,
        monitor: &GridMonitor,
        scheduler: &dyn RefreshScheduler,
        config: &AppConfig,
    ) {
        monitor.apply_settings(config.settings.clone());

        let interval = config.refresh_interval();
        if interval != self.interval {
            info!(
                "🔄 Refresh interval changed {}s -> {}s",
                self.interval.as_secs(),
                interval.as_secs()
            );
            self.handle = scheduler.reschedule(self.handle, interval);
            self.interval = interval;
        }
    }
}

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

use anyhow::{Context, Result, bail};
use gridpulse_adapters::{DEFAULT_CURRENT_STATUS_URL, DEFAULT_FORECAST_URL};
use gridpulse_core::MonitorOptions;
use gridpulse_core::persistence::DEFAULT_TRACKER_STATE_PATH;
use gridpulse_types::Settings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_REFRESH_INTERVAL_SECS: u64 = 10;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// PowerAlert endpoints
    pub feed: FeedConfig,

    /// Refresh cycle and startup behavior
    pub monitor: MonitorConfig,

    /// Thresholds used by the change tracker and state checks
    pub settings: Settings,

    /// Where change events are delivered
    pub notifications: NotificationsConfig,

    /// System configuration
    pub system: SystemConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// JSONP forecast endpoint (`createChart(...)`)
    pub forecast_url: String,

    /// JSONP current-status endpoint (`maintainCurrentStatus(...)`)
    pub current_status_url: String,

    /// HTTP timeout per request (seconds)
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_owned(),
            current_status_url: DEFAULT_CURRENT_STATUS_URL.to_owned(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between refresh cycles (seconds)
    pub refresh_interval_secs: u64,

    /// Initial refresh attempts before giving up
    pub startup_attempts: u32,

    /// Delay between initial refresh attempts (seconds)
    pub startup_retry_delay_secs: u64,

    /// Change tracker state file
    pub tracker_state_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 600,
            startup_attempts: 3,
            startup_retry_delay_secs: 5,
            tracker_state_path: PathBuf::from(DEFAULT_TRACKER_STATE_PATH),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// POST change events here when set
    pub webhook_url: Option<String>,

    /// Keep the latest capability values in this JSON file when set
    pub capability_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    pub log_level: String,

    /// Directory for `export --save`
    pub export_dir: PathBuf,

    /// How often the config file is checked for changes (seconds)
    pub settings_watch_secs: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            export_dir: PathBuf::from("./data/exports"),
            settings_watch_secs: 30,
        }
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl AppConfig {
    /// Load configuration
    ///
    /// Order: explicit path, `config.toml`, `config.json`, then defaults. Environment
    /// overrides apply on top of whichever was found.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (mut config, source) = match explicit {
            Some(path) => (Self::from_file(path)?, ConfigSource::File(path.to_path_buf())),
            None => Self::discover()?,
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, source))
    }

    fn discover() -> Result<(Self, ConfigSource)> {
        for candidate in ["config.toml", "config.json"] {
            let path = Path::new(candidate);
            if path.exists() {
                return Ok((Self::from_file(path)?, ConfigSource::File(path.to_path_buf())));
            }
        }
        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Parse a config file; `.json` is JSON, anything else TOML
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
        }
    }

    /// Apply `GRIDPULSE_*` overrides read through `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GRIDPULSE_FORECAST_URL") {
            self.feed.forecast_url = url;
        }

        if let Some(secs) = lookup("GRIDPULSE_REFRESH_SECS")
            && let Ok(secs) = secs.parse::<u64>()
        {
            self.monitor.refresh_interval_secs = secs;
        }

        if let Some(url) = lookup("GRIDPULSE_WEBHOOK_URL") {
            self.notifications.webhook_url = Some(url);
        }

        if let Some(level) = lookup("GRIDPULSE_LOG_LEVEL") {
            self.system.log_level = level;
        }
    }

    /// Reject configurations the monitor cannot run with
    ///
    /// Threshold settings are not checked here; they are sanitized when applied.
    pub fn validate(&self) -> Result<()> {
        if self.feed.forecast_url.trim().is_empty() {
            bail!("feed.forecast_url must not be empty");
        }
        if self.feed.current_status_url.trim().is_empty() {
            bail!("feed.current_status_url must not be empty");
        }
        if self.feed.timeout_secs == 0 {
            bail!("feed.timeout_secs must be greater than zero");
        }
        if self.monitor.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS {
            bail!(
                "monitor.refresh_interval_secs must be at least {MIN_REFRESH_INTERVAL_SECS} seconds, got {}",
                self.monitor.refresh_interval_secs
            );
        }
        if self.monitor.startup_attempts == 0 {
            bail!("monitor.startup_attempts must be at least 1");
        }
        if self
            .notifications
            .webhook_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            bail!("notifications.webhook_url must not be empty when set");
        }
        if self.system.settings_watch_secs == 0 {
            bail!("system.settings_watch_secs must be greater than zero");
        }
        Ok(())
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.refresh_interval_secs)
    }

    #[must_use]
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.timeout_secs)
    }

    #[must_use]
    pub fn settings_watch_interval(&self) -> Duration {
        Duration::from_secs(self.system.settings_watch_secs)
    }

    #[must_use]
    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            startup_attempts: self.monitor.startup_attempts,
            startup_retry_delay: Duration::from_secs(self.monitor.startup_retry_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.feed.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(config.refresh_interval(), Duration::from_secs(600));
        assert_eq!(config.monitor_options().startup_attempts, 3);
        assert_eq!(
            config.monitor_options().startup_retry_delay,
            Duration::from_secs(5)
        );
        assert_eq!(config.system.log_level, "info");
        assert!(config.notifications.webhook_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_refresh_interval_too_low() {
        let mut config = AppConfig::default();
        config.monitor.refresh_interval_secs = 5;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 10 seconds"));
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = AppConfig::default();
        config.feed.forecast_url = "  ".to_owned();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.monitor.startup_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.notifications.webhook_url = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_settings_are_not_fatal() {
        let mut config = AppConfig::default();
        config.settings.high_utilization = 250.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [monitor]
            refresh_interval_secs = 300

            [settings]
            critical_margin = 1500.0
            margin_thresholds = [500.0, 1500.0]

            [notifications]
            webhook_url = "http://localhost:8123/hook"
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.monitor.startup_attempts, 3);
        assert!((config.settings.critical_margin - 1500.0).abs() < f64::EPSILON);
        assert_eq!(config.settings.margin_thresholds, vec![500.0, 1500.0]);
        assert!((config.settings.high_utilization - 90.0).abs() < f64::EPSILON);
        assert_eq!(
            config.notifications.webhook_url.as_deref(),
            Some("http://localhost:8123/hook")
        );
        assert_eq!(config.feed, FeedConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GRIDPULSE_FORECAST_URL", "http://localhost/forecast"),
            ("GRIDPULSE_REFRESH_SECS", "120"),
            ("GRIDPULSE_WEBHOOK_URL", "http://localhost/hook"),
            ("GRIDPULSE_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| (*v).to_owned()));

        assert_eq!(config.feed.forecast_url, "http://localhost/forecast");
        assert_eq!(config.monitor.refresh_interval_secs, 120);
        assert_eq!(
            config.notifications.webhook_url.as_deref(),
            Some("http://localhost/hook")
        );
        assert_eq!(config.system.log_level, "debug");
    }

    #[test]
    fn test_unparseable_refresh_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| {
            (key == "GRIDPULSE_REFRESH_SECS").then(|| "soon".to_owned())
        });
        assert_eq!(config.monitor.refresh_interval_secs, 600);
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("gridpulse.toml");
        std::fs::write(&toml_path, "[system]\nlog_level = \"warn\"\n").unwrap();
        let config = AppConfig::from_file(&toml_path).unwrap();
        assert_eq!(config.system.log_level, "warn");

        let json_path = dir.path().join("gridpulse.json");
        std::fs::write(&json_path, r#"{"monitor": {"startup_attempts": 5}}"#).unwrap();
        let config = AppConfig::from_file(&json_path).unwrap();
        assert_eq!(config.monitor.startup_attempts, 5);

        std::fs::write(&json_path, "not json").unwrap();
        assert!(AppConfig::from_file(&json_path).is_err());
    }

    #[test]
    fn test_load_explicit_path_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[monitor]\nrefresh_interval_secs = 1\n").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}

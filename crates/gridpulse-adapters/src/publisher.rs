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

use anyhow::{Context, Result};
use async_trait::async_trait;
use gridpulse_core::{CapabilityPublisher, CapabilityValues};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes published values to the log
#[derive(Debug, Clone, Default)]
pub struct LoggingCapabilityPublisher;

#[async_trait]
impl CapabilityPublisher for LoggingCapabilityPublisher {
    async fn publish(&self, values: &CapabilityValues) -> Result<()> {
        info!(
            stage = values.loadshedding_stage,
            probability = values.power_probability,
            margin = values.current_margin,
            utilization = values.utilization,
            "📊 {} ({}) {}",
            values.system_color,
            values.system_direction,
            values.status_message
        );
        debug!(
            peak_demand = values.peak_demand,
            lowest_margin = values.lowest_margin,
            available_capacity = values.available_capacity,
            forecast_highest_stage = values.forecast_highest_stage,
            "   Forecast outlook as of {}",
            values.last_updated
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Keeps the latest published values in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFilePublisher {
    path: PathBuf,
}

impl JsonFilePublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back the last published values, if any
    pub fn load(&self) -> Result<Option<CapabilityValues>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let values = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(values))
    }
}

#[async_trait]
impl CapabilityPublisher for JsonFilePublisher {
    async fn publish(&self, values: &CapabilityValues) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(values)
            .context("Failed to serialize capability values")?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to move {} into place", temp_path.display()))?;

        debug!("💾 Capability values written to {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

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

//! Forecast history export (CSV / JSON) and the on-disk export archive.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gridpulse_types::{ExportFormat, ForecastPoint, GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

use crate::metrics::utilization;

/// Number of export files kept by [`ExportArchive`]
pub const MAX_ARCHIVED_EXPORTS: usize = 10;

const FILENAME_PREFIX: &str = "grid_history_";

/// One exported row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub color: String,
    pub direction: String,
    pub load_forecast: f64,
    pub declared_availability: f64,
    pub max_availability: f64,
    pub margin: f64,
    pub utilization: f64,
}

impl From<&ForecastPoint> for HistoryRecord {
    fn from(point: &ForecastPoint) -> Self {
        Self {
            timestamp: point.timestamp.to_rfc3339(),
            color: point.color.display_name().to_owned(),
            direction: point.direction.display_name().to_owned(),
            load_forecast: point.load_forecast_mw,
            declared_availability: point.declared_availability_mw,
            max_availability: point.max_availability_mw,
            margin: point.margin_mw(),
            utilization: (utilization(point.load_forecast_mw, point.declared_availability_mw)
                * 10.0)
                .round()
                / 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub hours: usize,
    pub average_demand: f64,
    pub peak_demand: f64,
    pub lowest_margin: f64,
    pub hours_per_color: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryExport {
    pub content: String,
    pub filename: String,
    pub record_count: usize,
    pub summary: ExportSummary,
}

#[must_use]
pub fn export_filename(now: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "{FILENAME_PREFIX}{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Export the first `min(len, hours)` points
pub fn export_history(
    points: &[ForecastPoint],
    hours: usize,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> GridResult<HistoryExport> {
    let window = &points[..points.len().min(hours)];
    if window.is_empty() {
        return Err(GridError::EmptyData(format!(
            "No forecast points to export for {hours}h"
        )));
    }

    let records: Vec<HistoryRecord> = window.iter().map(HistoryRecord::from).collect();
    let content = match format {
        ExportFormat::Csv => encode_csv(&records)?,
        ExportFormat::Json => serde_json::to_string_pretty(&records)
            .map_err(|e| GridError::Export(format!("JSON: {e}")))?,
    };

    let export = HistoryExport {
        content,
        filename: export_filename(now, format),
        record_count: records.len(),
        summary: summarize(window),
    };
    debug!(
        "Prepared {} export with {} records",
        format.extension(),
        export.record_count
    );
    Ok(export)
}

fn encode_csv(records: &[HistoryRecord]) -> GridResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record).map_err(csv_encode_error)?;
    }
    let bytes = writer.into_inner().map_err(csv_encode_error)?;
    String::from_utf8(bytes).map_err(csv_encode_error)
}

fn csv_encode_error(e: impl std::fmt::Display) -> GridError {
    GridError::Export(format!("CSV: {e}"))
}

fn summarize(window: &[ForecastPoint]) -> ExportSummary {
    let mut hours_per_color = BTreeMap::new();
    let mut total_demand = 0.0;
    let mut peak_demand = f64::NEG_INFINITY;
    let mut lowest_margin = f64::INFINITY;

    for point in window {
        total_demand += point.load_forecast_mw;
        peak_demand = peak_demand.max(point.load_forecast_mw);
        lowest_margin = lowest_margin.min(point.margin_mw());
        *hours_per_color
            .entry(point.color.display_name().to_owned())
            .or_insert(0) += 1;
    }

    ExportSummary {
        hours: window.len(),
        average_demand: (total_demand / window.len() as f64).round(),
        peak_demand,
        lowest_margin,
        hours_per_color,
    }
}

// ============= Export Archive =============

/// Directory of written exports, pruned to the newest files
#[derive(Debug, Clone)]
pub struct ExportArchive {
    dir: PathBuf,
    keep: usize,
}

impl ExportArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keep: MAX_ARCHIVED_EXPORTS,
        }
    }

    #[must_use]
    pub fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an export and prune older ones
    pub fn store(&self, export: &HistoryExport) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create export directory {}", self.dir.display()))?;

        let path = self.dir.join(&export.filename);
        fs::write(&path, &export.content)
            .with_context(|| format!("Failed to write export {}", path.display()))?;
        info!(
            "💾 Exported {} records to {}",
            export.record_count,
            path.display()
        );

        if let Err(e) = self.prune() {
            warn!(error = %e, "Failed to clean up old exports");
        }
        Ok(path)
    }

    /// Delete all but the newest `keep` export files, returning how many were removed
    pub fn prune(&self) -> Result<usize> {
        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?
        {
            let entry = entry?;
            let is_export = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(FILENAME_PREFIX));
            if !is_export || !entry.file_type()?.is_file() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            files.push((modified, entry.path()));
        }

        // Newest first; the timestamped name breaks ties
        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        let mut removed = 0;
        for (_, path) in files.iter().skip(self.keep) {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove old export {}", path.display()))?;
            removed += 1;
        }
        if removed > 0 {
            debug!("Removed {removed} old export file(s)");
        }
        Ok(removed)
    }
}

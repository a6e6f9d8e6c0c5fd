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
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::tracker::TrackerState;

pub const DEFAULT_TRACKER_STATE_PATH: &str = "./data/tracker_state.json";

/// JSON file holding the change tracker's state between runs
#[derive(Debug, Clone)]
pub struct TrackerStore {
    state_path: PathBuf,
}

impl TrackerStore {
    pub fn new(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.state_path
    }

    /// Load tracker state, or fresh state if the file doesn't exist.
    pub fn load(&self) -> Result<TrackerState> {
        if !self.state_path.exists() {
            info!(
                "Tracker state file not found at {}, starting fresh",
                self.state_path.display()
            );
            return Ok(TrackerState::default());
        }

        let contents = fs::read_to_string(&self.state_path).with_context(|| {
            format!(
                "Failed to read tracker state from {}",
                self.state_path.display()
            )
        })?;

        let state: TrackerState = serde_json::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse tracker state from {}",
                self.state_path.display()
            )
        })?;

        info!(
            "Loaded tracker state: previous_color={:?}, changes_today={}",
            state.previous_color, state.daily_change_count
        );

        Ok(state)
    }

    /// Save tracker state (temp file + rename).
    pub fn save(&self, state: &TrackerState) -> Result<()> {
        if let Some(parent) = self.state_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let json =
            serde_json::to_string_pretty(state).context("Failed to serialize tracker state")?;

        let temp_path = self.state_path.with_extension("tmp");
        fs::write(&temp_path, &json)
            .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.state_path).with_context(|| {
            format!(
                "Failed to rename temp file to {}",
                self.state_path.display()
            )
        })?;

        debug!("Saved tracker state to {}", self.state_path.display());
        Ok(())
    }
}

impl Default for TrackerStore {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKER_STATE_PATH)
    }
}

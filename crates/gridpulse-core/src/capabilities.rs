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

use chrono::{DateTime, Utc};
use chrono_tz::Africa::Johannesburg;
use gridpulse_types::StatusSnapshot;
use serde::{Deserialize, Serialize};

use crate::metrics::status_message;

/// Display format of `last_updated`
pub const LAST_UPDATED_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Named observable properties published for one snapshot
///
/// MW figures are rounded to whole megawatts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityValues {
    pub loadshedding_stage: u8,
    pub power_probability: f64,
    pub status_message: String,
    pub peak_demand: f64,
    /// Declared availability at the hour of the lowest margin
    pub available_capacity: f64,
    pub lowest_margin: f64,
    pub forecast_highest_stage: u8,
    pub current_load_forecast: f64,
    pub current_declared_availability: f64,
    pub current_margin: f64,
    pub utilization: f64,
    pub system_color: String,
    pub system_direction: String,
    pub last_updated: String,
}

impl CapabilityValues {
    #[must_use]
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        let current = &snapshot.current_point;
        let derived = &snapshot.derived_current;
        let aggregates = &snapshot.aggregates;

        Self {
            loadshedding_stage: snapshot.color.loadshedding_stage(),
            power_probability: derived.probability_pct.round(),
            status_message: status_message(snapshot.color, snapshot.direction),
            peak_demand: aggregates.peak_demand_mw.round(),
            available_capacity: aggregates.capacity_at_lowest_margin_mw.round(),
            lowest_margin: aggregates.lowest_margin_mw.round(),
            forecast_highest_stage: aggregates.highest_stage,
            current_load_forecast: current.load_forecast_mw.round(),
            current_declared_availability: current.declared_availability_mw.round(),
            current_margin: derived.margin_mw.round(),
            utilization: (derived.utilization_pct * 10.0).round() / 10.0,
            system_color: snapshot.color.as_str().to_owned(),
            system_direction: snapshot.direction.as_str().to_owned(),
            last_updated: format_last_updated(snapshot.captured_at),
        }
    }
}

/// Format an instant for display in South African Standard Time
#[must_use]
pub fn format_last_updated(at: DateTime<Utc>) -> String {
    at.with_timezone(&Johannesburg)
        .format(LAST_UPDATED_FORMAT)
        .to_string()
}

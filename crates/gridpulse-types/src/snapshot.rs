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
use serde::{Deserialize, Serialize};

use crate::forecast::{Direction, ForecastPoint, GridColor};

/// Minimum and maximum of one raw field over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Single-pass reductions over the full forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAggregates {
    /// Number of points the reductions cover
    pub point_count: usize,

    /// Highest forecast load (MW)
    pub peak_demand_mw: f64,

    /// Lowest declared availability minus load (MW)
    pub lowest_margin_mw: f64,

    /// Declared availability at the hour of the lowest margin (MW)
    pub capacity_at_lowest_margin_mw: f64,

    pub load_forecast: FieldRange,
    pub declared_availability: FieldRange,
    pub max_availability: FieldRange,

    /// Most severe color in the horizon
    pub worst_color: GridColor,

    /// Highest loadshedding stage in the horizon
    pub highest_stage: u8,
}

/// Metrics derived for a single point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub margin_mw: f64,

    /// Load as percentage of declared availability (0 when availability <= 0)
    pub utilization_pct: f64,

    /// Color-bounded supply probability (0-100)
    pub probability_pct: f64,
}

/// Normalized current-status snapshot, replaced wholesale every refresh cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub captured_at: DateTime<Utc>,
    pub current_point: ForecastPoint,
    pub aggregates: ForecastAggregates,
    pub derived_current: DerivedMetrics,
    pub color: GridColor,
    pub direction: Direction,
}

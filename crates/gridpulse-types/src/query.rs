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

//! Closed argument sets of the on-demand query surface.
//!
//! Every enum parses from its wire name and rejects anything else with
//! `GridError::UnknownArgument`; there is no silent fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GridError;

/// Figure returned by `get_metric`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Margin,
    Demand,
    Capacity,
    Utilization,
    ReserveMargin,
}

impl Metric {
    const NAMES: &'static [&'static str] =
        &["margin", "demand", "capacity", "utilization", "reserve_margin"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Margin => "margin",
            Self::Demand => "demand",
            Self::Capacity => "capacity",
            Self::Utilization => "utilization",
            Self::ReserveMargin => "reserve_margin",
        }
    }
}

impl FromStr for Metric {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "margin" => Ok(Self::Margin),
            "demand" => Ok(Self::Demand),
            "capacity" => Ok(Self::Capacity),
            "utilization" => Ok(Self::Utilization),
            "reserve_margin" => Ok(Self::ReserveMargin),
            _ => Err(GridError::unknown_argument("metric", s, Self::NAMES)),
        }
    }
}

/// Condition evaluated by `check_state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemState {
    Critical,
    Stable,
    Improving,
    HighUtilization,
}

impl SystemState {
    const NAMES: &'static [&'static str] = &["critical", "stable", "improving", "high_utilization"];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Stable => "stable",
            Self::Improving => "improving",
            Self::HighUtilization => "high_utilization",
        }
    }
}

impl FromStr for SystemState {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "stable" => Ok(Self::Stable),
            "improving" => Ok(Self::Improving),
            "high_utilization" => Ok(Self::HighUtilization),
            _ => Err(GridError::unknown_argument("state", s, Self::NAMES)),
        }
    }
}

/// Relative importance of color, margin and trend in the risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

/// Weights over {color, margin, trend}, summing to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskWeights {
    pub color: f64,
    pub margin: f64,
    pub trend: f64,
}

impl Sensitivity {
    const NAMES: &'static [&'static str] = &["low", "medium", "high"];

    #[must_use]
    pub fn weights(self) -> RiskWeights {
        match self {
            Self::Low => RiskWeights {
                color: 0.4,
                margin: 0.3,
                trend: 0.3,
            },
            Self::Medium => RiskWeights {
                color: 0.5,
                margin: 0.3,
                trend: 0.2,
            },
            Self::High => RiskWeights {
                color: 0.6,
                margin: 0.3,
                trend: 0.1,
            },
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Sensitivity {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(GridError::unknown_argument("sensitivity", s, Self::NAMES)),
        }
    }
}

/// Output format of `export_history`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    const NAMES: &'static [&'static str] = &["csv", "json"];

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(GridError::unknown_argument("export format", s, Self::NAMES)),
        }
    }
}

/// Wall-clock time of day (`HH:MM`) in the feed's local zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::unknown_argument("time of day", s, &["HH:MM"]);
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

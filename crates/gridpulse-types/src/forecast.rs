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

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GridError;

/// Fixed offset of the forecast feed's native zone (SAST, no DST)
pub const FEED_UTC_OFFSET_HOURS: i32 = 2;

/// Offset used to interpret feed timestamps that carry no zone
#[must_use]
pub fn feed_offset() -> FixedOffset {
    FixedOffset::east_opt(FEED_UTC_OFFSET_HOURS * 3600).unwrap_or_else(|| Utc.fix())
}

// ============= Grid Color =============

/// Color-coded grid stress level published by the forecast feed
///
/// Variant order is the severity order: Green < Yellow < Orange < Red.
/// Yellow is part of the scale but is not used by the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GridColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl GridColor {
    /// Position on the severity scale (Green=1 .. Red=4)
    #[must_use]
    pub fn severity(self) -> u8 {
        match self {
            Self::Green => 1,
            Self::Yellow => 2,
            Self::Orange => 3,
            Self::Red => 4,
        }
    }

    /// Map the legacy numeric `ColorId` of the current-status record
    #[must_use]
    pub fn from_color_id(color_id: i64) -> Option<Self> {
        match color_id {
            1 => Some(Self::Red),
            2 => Some(Self::Green),
            3 => Some(Self::Orange),
            _ => None,
        }
    }

    /// Name as published by the feed
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Yellow => "Yellow",
            Self::Orange => "Orange",
            Self::Red => "Red",
        }
    }

    /// Lowercase value used for published capabilities
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }

    /// Loadshedding stage represented by this color (lowest stage of its range)
    #[must_use]
    pub fn loadshedding_stage(self) -> u8 {
        match self {
            Self::Red => 3,
            Self::Orange => 1,
            Self::Green | Self::Yellow => 0,
        }
    }

    /// Human-readable description of the grid pressure
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Red => "The power system is under severe pressure.",
            Self::Orange => "The power system is under pressure.",
            Self::Green => "The power system is stable.",
            Self::Yellow => "Status unknown.",
        }
    }

    #[must_use]
    pub fn all() -> &'static [GridColor] {
        &[Self::Green, Self::Yellow, Self::Orange, Self::Red]
    }
}

impl fmt::Display for GridColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for GridColor {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "orange" => Ok(Self::Orange),
            "red" => Ok(Self::Red),
            _ => Err(GridError::Parse(format!("Unknown grid color: '{s}'"))),
        }
    }
}

// ============= Direction =============

/// Trend direction code published alongside each forecast point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Stable,
}

impl Direction {
    /// Map the numeric `DirectionId` used by some feed revisions
    #[must_use]
    pub fn from_direction_id(direction_id: i64) -> Option<Self> {
        match direction_id {
            1 => Some(Self::Up),
            2 => Some(Self::Down),
            3 => Some(Self::Stable),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Stable => "Stable",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Direction {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "stable" => Ok(Self::Stable),
            _ => Err(GridError::Parse(format!("Unknown grid direction: '{s}'"))),
        }
    }
}

// ============= Forecast Point =============

/// One hourly grid-status record of the forecast horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Start of the hour, in the feed's local offset
    pub timestamp: DateTime<FixedOffset>,

    pub color: GridColor,

    pub direction: Direction,

    /// Forecast load (MW)
    pub load_forecast_mw: f64,

    /// Declared available capacity (MW)
    pub declared_availability_mw: f64,

    /// Maximum available capacity (MW)
    pub max_availability_mw: f64,
}

impl ForecastPoint {
    #[must_use]
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        color: GridColor,
        direction: Direction,
        load_forecast_mw: f64,
        declared_availability_mw: f64,
        max_availability_mw: f64,
    ) -> Self {
        Self {
            timestamp,
            color,
            direction,
            load_forecast_mw,
            declared_availability_mw,
            max_availability_mw,
        }
    }

    /// Headroom between declared availability and forecast load (MW)
    #[must_use]
    pub fn margin_mw(&self) -> f64 {
        self.declared_availability_mw - self.load_forecast_mw
    }

    /// Hour of day in the feed's local time
    #[must_use]
    pub fn local_hour(&self) -> u32 {
        self.timestamp.hour()
    }

    #[must_use]
    pub fn local_minute(&self) -> u32 {
        self.timestamp.minute()
    }

    /// Local start time formatted as `HH:MM`
    #[must_use]
    pub fn clock_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_severity_order() {
        assert!(GridColor::Green.severity() < GridColor::Yellow.severity());
        assert!(GridColor::Yellow.severity() < GridColor::Orange.severity());
        assert!(GridColor::Orange.severity() < GridColor::Red.severity());
        assert!(GridColor::Green < GridColor::Red);
    }

    #[test]
    fn test_color_id_mapping() {
        assert_eq!(GridColor::from_color_id(1), Some(GridColor::Red));
        assert_eq!(GridColor::from_color_id(2), Some(GridColor::Green));
        assert_eq!(GridColor::from_color_id(3), Some(GridColor::Orange));
        assert_eq!(GridColor::from_color_id(7), None);
    }

    #[test]
    fn test_color_parse_is_case_insensitive() {
        assert_eq!("RED".parse::<GridColor>().unwrap(), GridColor::Red);
        assert_eq!(" orange ".parse::<GridColor>().unwrap(), GridColor::Orange);
        assert!(matches!(
            "purple".parse::<GridColor>(),
            Err(GridError::Parse(_))
        ));
    }

    #[test]
    fn test_loadshedding_stage() {
        assert_eq!(GridColor::Red.loadshedding_stage(), 3);
        assert_eq!(GridColor::Orange.loadshedding_stage(), 1);
        assert_eq!(GridColor::Green.loadshedding_stage(), 0);
    }

    #[test]
    fn test_point_margin_and_clock() {
        let ts = feed_offset()
            .with_ymd_and_hms(2025, 6, 3, 17, 0, 0)
            .unwrap();
        let point = ForecastPoint::new(ts, GridColor::Orange, Direction::Up, 100.0, 80.0, 120.0);

        assert!((point.margin_mw() - (-20.0)).abs() < f64::EPSILON);
        assert_eq!(point.local_hour(), 17);
        assert_eq!(point.clock_label(), "17:00");
    }
}

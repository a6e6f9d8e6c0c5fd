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
use std::cmp::Ordering;
use std::fmt;

use crate::forecast::GridColor;

/// Direction of a color transition on the severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityChange {
    Worsened,
    Improved,
    Unchanged,
}

impl SeverityChange {
    #[must_use]
    pub fn between(previous: GridColor, new: GridColor) -> Self {
        match new.severity().cmp(&previous.severity()) {
            Ordering::Greater => Self::Worsened,
            Ordering::Less => Self::Improved,
            Ordering::Equal => Self::Unchanged,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Worsened => "worsened",
            Self::Improved => "improved",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for SeverityChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted when the committed grid color differs from the previous cycle's
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub previous_color: GridColor,
    pub new_color: GridColor,
    pub severity_change: SeverityChange,
    pub daily_change_count: u32,
    pub changed_at: DateTime<Utc>,
}

/// Monitored figure a threshold applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdKind {
    Margin,
    Demand,
    Capacity,
}

impl ThresholdKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Margin => "margin",
            Self::Demand => "demand",
            Self::Capacity => "capacity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingDirection {
    Rising,
    Falling,
}

/// A configured threshold crossed between two committed snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCrossing {
    pub kind: ThresholdKind,
    pub threshold: f64,
    pub previous: f64,
    pub current: f64,
    pub direction: CrossingDirection,
    pub crossed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_change_between() {
        assert_eq!(
            SeverityChange::between(GridColor::Green, GridColor::Red),
            SeverityChange::Worsened
        );
        assert_eq!(
            SeverityChange::between(GridColor::Red, GridColor::Orange),
            SeverityChange::Improved
        );
        assert_eq!(
            SeverityChange::between(GridColor::Orange, GridColor::Orange),
            SeverityChange::Unchanged
        );
    }

    #[test]
    fn test_change_event_serializes_lowercase_severity() {
        let event = ChangeEvent {
            previous_color: GridColor::Green,
            new_color: GridColor::Orange,
            severity_change: SeverityChange::Worsened,
            daily_change_count: 2,
            changed_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["severity_change"], "worsened");
        assert_eq!(json["new_color"], "Orange");
    }
}

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

use gridpulse_types::{ForecastPoint, GridError, GridResult};
use serde::{Deserialize, Serialize};

/// Number of leading points the trend looks at
pub const TREND_HORIZON: usize = 6;

/// Absolute margin trend (MW) under which the grid may count as stable
pub const STABLE_MARGIN_TREND_MW: f64 = 100.0;

/// Weighted short-horizon trend of margin and color severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Weighted average margin (MW)
    pub margin_trend: f64,
    /// Weighted average severity (1-4)
    pub color_trend: f64,
}

impl Trend {
    #[must_use]
    pub fn is_improving(&self) -> bool {
        self.margin_trend > 0.0 && self.color_trend < 0.0
    }

    #[must_use]
    pub fn is_worsening(&self) -> bool {
        self.margin_trend < 0.0 && self.color_trend > 0.0
    }

    /// Requires the weighted severity to be exactly zero.
    #[must_use]
    #[expect(clippy::float_cmp)]
    pub fn is_stable(&self) -> bool {
        self.margin_trend.abs() < STABLE_MARGIN_TREND_MW && self.color_trend == 0.0
    }
}

/// Weighted trend over the first `min(6, len)` points, nearest weighted highest
pub fn analyze_trend(points: &[ForecastPoint]) -> GridResult<Trend> {
    let horizon = points.len().min(TREND_HORIZON);
    if horizon == 0 {
        return Err(GridError::EmptyData(
            "Cannot analyze trend of an empty forecast".to_owned(),
        ));
    }

    let mut weighted_margin = 0.0;
    let mut weighted_severity = 0.0;
    let mut total_weight = 0.0;

    for (i, point) in points.iter().take(horizon).enumerate() {
        let weight = (horizon - i) as f64;
        weighted_margin += point.margin_mw() * weight;
        weighted_severity += f64::from(point.color.severity()) * weight;
        total_weight += weight;
    }

    Ok(Trend {
        margin_trend: weighted_margin / total_weight,
        color_trend: weighted_severity / total_weight,
    })
}

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

use gridpulse_types::{ForecastPoint, GridColor, TimeOfDay};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Best low-demand window inside the allowed time-of-day range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalWindow {
    /// `HH:MM` of the window's first point
    pub start_time: String,
    /// Mean forecast load across the window, rounded to whole MW
    pub average_demand: f64,
    /// Most severe color inside the window
    pub color: GridColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WindowOutcome {
    Found(OptimalWindow),
    NotFound { requested_start: TimeOfDay },
}

/// Flat `{startTime, averageDemand, color}` shape of the query surface
///
/// A miss echoes the requested start with infinite demand and color `"unknown"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub start_time: String,
    pub average_demand: f64,
    pub color: String,
}

impl WindowOutcome {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    #[must_use]
    pub fn into_report(self) -> WindowReport {
        match self {
            Self::Found(window) => WindowReport {
                start_time: window.start_time,
                average_demand: window.average_demand,
                color: window.color.display_name().to_owned(),
            },
            Self::NotFound { requested_start } => WindowReport {
                start_time: requested_start.to_string(),
                average_demand: f64::INFINITY,
                color: "unknown".to_owned(),
            },
        }
    }
}

/// Number of hourly points needed to cover `duration_minutes`
#[must_use]
pub fn window_hours(duration_minutes: u32) -> usize {
    (duration_minutes.div_ceil(60) as usize).max(1)
}

/// Whether a window may start at `hour:minute`
///
/// Minutes are only checked at the two boundary hours.
#[must_use]
pub fn start_allowed(hour: u32, minute: u32, start: TimeOfDay, end: TimeOfDay) -> bool {
    !(hour < start.hour
        || hour > end.hour
        || (hour == end.hour && minute > end.minute)
        || (hour == start.hour && minute < start.minute))
}

/// Slide a window of `window_hours(duration_minutes)` points over the forecast
///
/// The earliest window wins on equal average demand.
#[must_use]
pub fn find_optimal_window(
    points: &[ForecastPoint],
    duration_minutes: u32,
    start: TimeOfDay,
    end: TimeOfDay,
) -> WindowOutcome {
    let size = window_hours(duration_minutes);
    let not_found = WindowOutcome::NotFound {
        requested_start: start,
    };
    if points.len() < size {
        debug!(
            "Forecast has {} points, window needs {size}; no window",
            points.len()
        );
        return not_found;
    }

    let mut best: Option<(f64, &[ForecastPoint])> = None;

    for window in points.windows(size) {
        let first = &window[0];
        if !start_allowed(first.local_hour(), first.local_minute(), start, end) {
            continue;
        }

        let total: f64 = window.iter().map(|p| p.load_forecast_mw).sum();
        let average = total / size as f64;

        if best.is_none_or(|(best_avg, _)| average < best_avg) {
            best = Some((average, window));
        }
    }

    let Some((average, window)) = best else {
        debug!("No window of {size}h starts between {start} and {end}");
        return not_found;
    };

    let color = window
        .iter()
        .map(|p| p.color)
        .max()
        .unwrap_or(GridColor::Green);

    WindowOutcome::Found(OptimalWindow {
        start_time: window[0].clock_label(),
        average_demand: average.round(),
        color,
    })
}

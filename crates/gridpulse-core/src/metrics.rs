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

//! Per-point derived figures and snapshot assembly.

use chrono::{DateTime, Utc};
use gridpulse_types::{
    DerivedMetrics, Direction, ForecastPoint, GridColor, GridResult, StatusSnapshot,
};
use tracing::debug;

use crate::aggregation::aggregate;
use crate::selection::select_current;

/// Headroom between availability and demand (MW)
#[must_use]
pub fn margin(availability_mw: f64, demand_mw: f64) -> f64 {
    availability_mw - demand_mw
}

/// Demand as a percentage of availability
///
/// Defined as 0 when availability is not positive.
#[must_use]
pub fn utilization(demand_mw: f64, availability_mw: f64) -> f64 {
    if availability_mw <= 0.0 {
        return 0.0;
    }
    demand_mw / availability_mw * 100.0
}

/// Probability band of a color, `None` for colors the feed never maps
#[must_use]
pub fn probability_band(color: GridColor) -> Option<(f64, f64)> {
    match color {
        GridColor::Red => Some((0.0, 25.0)),
        GridColor::Orange => Some((25.0, 75.0)),
        GridColor::Green => Some((75.0, 100.0)),
        GridColor::Yellow => None,
    }
}

/// Color-bounded estimate of continued stable supply (0-100)
///
/// The margin as a percentage of maximum availability, clamped into the color's band.
#[must_use]
pub fn probability(color: GridColor, margin_mw: f64, max_availability_mw: f64) -> f64 {
    let Some((low, high)) = probability_band(color) else {
        return 100.0;
    };

    let margin_pct = if max_availability_mw > 0.0 {
        margin_mw / max_availability_mw * 100.0
    } else {
        0.0
    };
    let margin_pct = if margin_pct.is_finite() { margin_pct } else { 0.0 };

    margin_pct.clamp(low, high)
}

/// Margin as a percentage of demand, 0 when demand is not positive
#[must_use]
pub fn reserve_margin(margin_mw: f64, demand_mw: f64) -> f64 {
    if demand_mw <= 0.0 {
        return 0.0;
    }
    margin_mw / demand_mw * 100.0
}

/// Human-readable one-line status
#[must_use]
pub fn status_message(color: GridColor, direction: Direction) -> String {
    format!(
        "The electricity grid is {} and {}: {}",
        direction.as_str(),
        color.as_str(),
        color.description()
    )
}

/// Derived figures for a single point
#[must_use]
pub fn derive(point: &ForecastPoint) -> DerivedMetrics {
    let margin_mw = margin(point.declared_availability_mw, point.load_forecast_mw);
    DerivedMetrics {
        margin_mw,
        utilization_pct: utilization(point.load_forecast_mw, point.declared_availability_mw),
        probability_pct: probability(point.color, margin_mw, point.max_availability_mw),
    }
}

/// Build a complete snapshot from one fetched sequence
///
/// Selection, aggregation and derivation all read the same slice, so the result is
/// internally consistent or not produced at all.
pub fn build_snapshot(points: &[ForecastPoint], now: DateTime<Utc>) -> GridResult<StatusSnapshot> {
    let aggregates = aggregate(points)?;
    let current = select_current(points, now)?.clone();
    let derived = derive(&current);

    debug!(
        "Snapshot at {}: {} {} margin {:.0} MW, utilization {:.1}%",
        current.clock_label(),
        current.color,
        current.direction,
        derived.margin_mw,
        derived.utilization_pct
    );

    Ok(StatusSnapshot {
        captured_at: now,
        color: current.color,
        direction: current.direction,
        current_point: current,
        aggregates,
        derived_current: derived,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{points_with, utc};
    use gridpulse_types::GridError;

    #[test]
    fn test_utilization_zero_availability() {
        assert!((utilization(500.0, 0.0)).abs() < f64::EPSILON);
        assert!((utilization(500.0, -10.0)).abs() < f64::EPSILON);
        assert!((utilization(75.0, 100.0) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_probability_stays_in_band() {
        let cases = [
            (GridColor::Red, 5000.0, 30_000.0),
            (GridColor::Red, -5000.0, 30_000.0),
            (GridColor::Orange, 100.0, 30_000.0),
            (GridColor::Orange, 29_000.0, 30_000.0),
            (GridColor::Green, 100.0, 30_000.0),
            (GridColor::Green, 1e9, 1.0),
            (GridColor::Red, 1000.0, 0.0),
            (GridColor::Green, -1000.0, 0.0),
            (GridColor::Orange, f64::NAN, 100.0),
        ];
        for (color, margin_mw, max_avail) in cases {
            let p = probability(color, margin_mw, max_avail);
            let (low, high) = probability_band(color).unwrap();
            assert!(
                (low..=high).contains(&p),
                "{color} {margin_mw} {max_avail} -> {p}"
            );
        }
    }

    #[test]
    fn test_probability_inside_band_is_unclamped() {
        // 15000 / 30000 = 50%
        assert!((probability(GridColor::Orange, 15_000.0, 30_000.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmapped_color_probability() {
        assert!((probability(GridColor::Yellow, -900.0, 30_000.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reserve_margin_divides_by_demand() {
        assert!((reserve_margin(2000.0, 25_000.0) - 8.0).abs() < 1e-9);
        assert!(reserve_margin(2000.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_message() {
        assert_eq!(
            status_message(GridColor::Orange, Direction::Down),
            "The electricity grid is down and orange: The power system is under pressure."
        );
    }

    #[test]
    fn test_build_snapshot_uses_current_point() {
        let points = points_with(
            18,
            &[
                (GridColor::Red, 100.0, 80.0),
                (GridColor::Orange, 60.0, 80.0),
                (GridColor::Green, 40.0, 80.0),
            ],
        );
        // 17:10 UTC -> 19:00 local
        let snapshot = build_snapshot(&points, utc(2025, 6, 3, 17, 10)).unwrap();

        assert_eq!(snapshot.color, GridColor::Orange);
        assert!((snapshot.derived_current.margin_mw - 20.0).abs() < f64::EPSILON);
        assert!((snapshot.derived_current.utilization_pct - 75.0).abs() < 1e-9);
        assert!((snapshot.aggregates.peak_demand_mw - 100.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.aggregates.point_count, 3);
    }

    #[test]
    fn test_build_snapshot_empty() {
        assert!(matches!(
            build_snapshot(&[], utc(2025, 6, 3, 17, 10)),
            Err(GridError::EmptyData(_))
        ));
    }
}

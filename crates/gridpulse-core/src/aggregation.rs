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

use gridpulse_types::{FieldRange, ForecastAggregates, ForecastPoint, GridError, GridResult};
use tracing::debug;

/// Running min/max/sum of one field
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }

    fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    fn finish(self, count: usize) -> FieldRange {
        FieldRange {
            min: self.min,
            max: self.max,
            avg: self.sum / count as f64,
        }
    }
}

/// Reduce the whole forecast horizon in a single pass
///
/// The lowest margin keeps the first point on ties, and so does the capacity reported
/// alongside it.
pub fn aggregate(points: &[ForecastPoint]) -> GridResult<ForecastAggregates> {
    let Some(first) = points.first() else {
        return Err(GridError::EmptyData(
            "Cannot aggregate an empty forecast".to_owned(),
        ));
    };

    let mut load = Accumulator::new();
    let mut declared = Accumulator::new();
    let mut max_avail = Accumulator::new();

    let mut lowest_margin = first.margin_mw();
    let mut capacity_at_lowest_margin = first.declared_availability_mw;
    let mut worst_color = first.color;

    for point in points {
        load.push(point.load_forecast_mw);
        declared.push(point.declared_availability_mw);
        max_avail.push(point.max_availability_mw);

        let margin = point.margin_mw();
        if margin < lowest_margin {
            lowest_margin = margin;
            capacity_at_lowest_margin = point.declared_availability_mw;
        }
        if point.color > worst_color {
            worst_color = point.color;
        }
    }

    let count = points.len();
    let aggregates = ForecastAggregates {
        point_count: count,
        peak_demand_mw: load.max,
        lowest_margin_mw: lowest_margin,
        capacity_at_lowest_margin_mw: capacity_at_lowest_margin,
        load_forecast: load.finish(count),
        declared_availability: declared.finish(count),
        max_availability: max_avail.finish(count),
        worst_color,
        highest_stage: worst_color.loadshedding_stage(),
    };

    debug!(
        "Aggregated {} points: peak {:.0} MW, lowest margin {:.0} MW, worst {}",
        count, aggregates.peak_demand_mw, aggregates.lowest_margin_mw, worst_color
    );

    Ok(aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::points_with;
    use gridpulse_types::GridColor;

    #[test]
    fn test_aggregate_basic_figures() {
        let points = points_with(
            18,
            &[
                (GridColor::Red, 100.0, 80.0),
                (GridColor::Orange, 60.0, 80.0),
                (GridColor::Green, 40.0, 80.0),
            ],
        );
        let agg = aggregate(&points).unwrap();

        assert_eq!(agg.point_count, 3);
        assert!((agg.peak_demand_mw - 100.0).abs() < f64::EPSILON);
        assert!((agg.lowest_margin_mw + 20.0).abs() < f64::EPSILON);
        assert!((agg.capacity_at_lowest_margin_mw - 80.0).abs() < f64::EPSILON);
        assert!((agg.load_forecast.min - 40.0).abs() < f64::EPSILON);
        assert!((agg.load_forecast.avg - 200.0 / 3.0).abs() < 1e-9);
        assert!((agg.declared_availability.avg - 80.0).abs() < f64::EPSILON);
        assert!((agg.max_availability.max - 2080.0).abs() < f64::EPSILON);
        assert_eq!(agg.worst_color, GridColor::Red);
        assert_eq!(agg.highest_stage, 3);
    }

    #[test]
    fn test_bounds_hold_for_every_point() {
        let points = points_with(
            0,
            &[
                (GridColor::Green, 24_000.0, 29_000.0),
                (GridColor::Orange, 27_800.0, 28_100.0),
                (GridColor::Green, 22_000.0, 30_500.0),
                (GridColor::Red, 29_900.0, 29_000.0),
                (GridColor::Orange, 26_000.0, 27_000.0),
            ],
        );
        let agg = aggregate(&points).unwrap();

        for p in &points {
            assert!(agg.peak_demand_mw >= p.load_forecast_mw);
            assert!(agg.lowest_margin_mw <= p.margin_mw());
        }
        assert!((agg.capacity_at_lowest_margin_mw - 29_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_point() {
        let points = points_with(12, &[(GridColor::Green, 20_000.0, 25_000.0)]);
        let agg = aggregate(&points).unwrap();
        assert!((agg.load_forecast.avg - 20_000.0).abs() < f64::EPSILON);
        assert!((agg.lowest_margin_mw - 5000.0).abs() < f64::EPSILON);
        assert_eq!(agg.highest_stage, 0);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(aggregate(&[]), Err(GridError::EmptyData(_))));
    }
}

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

//! Color transition and threshold crossing detection across committed snapshots.
//!
//! All mutable per-monitor state lives in [`TrackerState`], owned by one [`ChangeTracker`].
//! The state is plain data so it can be persisted between runs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Africa::Johannesburg;
use gridpulse_types::{
    ChangeEvent, CrossingDirection, GridColor, SeverityChange, Settings, StatusSnapshot,
    ThresholdCrossing, ThresholdKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Figures compared against the configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedMetrics {
    pub margin_mw: f64,
    pub demand_mw: f64,
    pub capacity_mw: f64,
}

impl ObservedMetrics {
    #[must_use]
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        Self {
            margin_mw: snapshot.derived_current.margin_mw,
            demand_mw: snapshot.current_point.load_forecast_mw,
            capacity_mw: snapshot.current_point.declared_availability_mw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    /// Color of the last observed snapshot
    pub previous_color: Option<GridColor>,
    pub daily_change_count: u32,
    /// Next local midnight at which the counter is zeroed
    pub daily_reset_boundary: Option<DateTime<Utc>>,
    pub last_metrics: Option<ObservedMetrics>,
}

/// Everything one observation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub change: Option<ChangeEvent>,
    pub crossings: Vec<ThresholdCrossing>,
}

impl Observation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.change.is_none() && self.crossings.is_empty()
    }
}

/// First local (Johannesburg) midnight strictly after `now`
#[must_use]
pub fn next_local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&Johannesburg);
    local
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Johannesburg.from_local_datetime(&midnight).earliest())
        .map_or_else(|| now + Duration::days(1), |dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    state: TrackerState,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: TrackerState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn daily_change_count(&self) -> u32 {
        self.state.daily_change_count
    }

    /// Process one committed snapshot
    ///
    /// The very first observation only records state. `previous_color` is updated on
    /// every call.
    pub fn observe(
        &mut self,
        snapshot: &StatusSnapshot,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Observation {
        self.roll_daily_counter(now);

        let new_color = snapshot.color;
        let change = match self.state.previous_color {
            Some(previous) if previous != new_color => {
                self.state.daily_change_count += 1;
                let severity_change = SeverityChange::between(previous, new_color);
                info!(
                    "🚦 Grid status changed: {} → {} ({}), {} change(s) today",
                    previous, new_color, severity_change, self.state.daily_change_count
                );
                Some(ChangeEvent {
                    previous_color: previous,
                    new_color,
                    severity_change,
                    daily_change_count: self.state.daily_change_count,
                    changed_at: now,
                })
            }
            _ => None,
        };
        self.state.previous_color = Some(new_color);

        let current = ObservedMetrics::from_snapshot(snapshot);
        let crossings = match self.state.last_metrics {
            Some(previous) => detect_crossings(&previous, &current, settings, now),
            None => Vec::new(),
        };
        self.state.last_metrics = Some(current);

        for crossing in &crossings {
            debug!(
                kind = crossing.kind.as_str(),
                threshold = crossing.threshold,
                "Threshold crossed {:?}: {:.0} → {:.0}",
                crossing.direction,
                crossing.previous,
                crossing.current
            );
        }

        Observation { change, crossings }
    }

    fn roll_daily_counter(&mut self, now: DateTime<Utc>) {
        match self.state.daily_reset_boundary {
            Some(boundary) if now >= boundary => {
                debug!(
                    "Daily change counter reset (was {})",
                    self.state.daily_change_count
                );
                self.state.daily_change_count = 0;
                self.state.daily_reset_boundary = Some(next_local_midnight(now));
            }
            Some(_) => {}
            None => self.state.daily_reset_boundary = Some(next_local_midnight(now)),
        }
    }
}

/// Crossing direction of `threshold` between two readings, if it was crossed
#[must_use]
pub fn crossing_direction(previous: f64, current: f64, threshold: f64) -> Option<CrossingDirection> {
    if previous < threshold && threshold <= current {
        Some(CrossingDirection::Rising)
    } else if previous >= threshold && threshold > current {
        Some(CrossingDirection::Falling)
    } else {
        None
    }
}

fn detect_crossings(
    previous: &ObservedMetrics,
    current: &ObservedMetrics,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Vec<ThresholdCrossing> {
    let checks = [
        (
            ThresholdKind::Margin,
            &settings.margin_thresholds,
            previous.margin_mw,
            current.margin_mw,
        ),
        (
            ThresholdKind::Demand,
            &settings.demand_thresholds,
            previous.demand_mw,
            current.demand_mw,
        ),
        (
            ThresholdKind::Capacity,
            &settings.capacity_thresholds,
            previous.capacity_mw,
            current.capacity_mw,
        ),
    ];

    checks
        .into_iter()
        .flat_map(|(kind, thresholds, before, after)| {
            thresholds.iter().filter_map(move |&threshold| {
                crossing_direction(before, after, threshold).map(|direction| ThresholdCrossing {
                    kind,
                    threshold,
                    previous: before,
                    current: after,
                    direction,
                    crossed_at: now,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::build_snapshot;
    use crate::test_support::{points_with, utc};

    fn snapshot(color: GridColor, load: f64, declared: f64) -> StatusSnapshot {
        let points = points_with(12, &[(color, load, declared)]);
        build_snapshot(&points, utc(2025, 6, 3, 10, 0)).unwrap()
    }

    #[test]
    fn test_first_observation_emits_nothing() {
        let mut tracker = ChangeTracker::new();
        let obs = tracker.observe(
            &snapshot(GridColor::Red, 28_000.0, 27_000.0),
            &Settings::default(),
            utc(2025, 6, 3, 10, 0),
        );
        assert!(obs.is_empty());
        assert_eq!(tracker.state().previous_color, Some(GridColor::Red));
        assert_eq!(tracker.daily_change_count(), 0);
    }

    #[test]
    fn test_color_change_counts_and_classifies() {
        let settings = Settings::default();
        let mut tracker = ChangeTracker::new();
        tracker.observe(
            &snapshot(GridColor::Green, 25_000.0, 29_000.0),
            &settings,
            utc(2025, 6, 3, 8, 0),
        );

        let obs = tracker.observe(
            &snapshot(GridColor::Orange, 25_000.0, 29_000.0),
            &settings,
            utc(2025, 6, 3, 9, 0),
        );
        let event = obs.change.unwrap();
        assert_eq!(event.previous_color, GridColor::Green);
        assert_eq!(event.new_color, GridColor::Orange);
        assert_eq!(event.severity_change, SeverityChange::Worsened);
        assert_eq!(event.daily_change_count, 1);

        let obs = tracker.observe(
            &snapshot(GridColor::Orange, 25_000.0, 29_000.0),
            &settings,
            utc(2025, 6, 3, 10, 0),
        );
        assert!(obs.change.is_none());
        assert_eq!(tracker.state().previous_color, Some(GridColor::Orange));

        let event = tracker
            .observe(
                &snapshot(GridColor::Green, 25_000.0, 29_000.0),
                &settings,
                utc(2025, 6, 3, 11, 0),
            )
            .change
            .unwrap();
        assert_eq!(event.severity_change, SeverityChange::Improved);
        assert_eq!(event.daily_change_count, 2);
    }

    #[test]
    fn test_counter_resets_to_one_after_midnight() {
        let settings = Settings::default();
        let mut tracker = ChangeTracker::new();
        let colors = [GridColor::Green, GridColor::Red, GridColor::Green];
        for (hour, color) in [8, 9, 10].into_iter().zip(colors) {
            tracker.observe(
                &snapshot(color, 25_000.0, 29_000.0),
                &settings,
                utc(2025, 6, 3, hour, 0),
            );
        }
        assert_eq!(tracker.daily_change_count(), 2);

        // 22:30 UTC is 00:30 in Johannesburg
        let event = tracker
            .observe(
                &snapshot(GridColor::Orange, 25_000.0, 29_000.0),
                &settings,
                utc(2025, 6, 3, 22, 30),
            )
            .change
            .unwrap();
        assert_eq!(event.daily_change_count, 1);
    }

    #[test]
    fn test_next_local_midnight() {
        assert_eq!(
            next_local_midnight(utc(2025, 6, 3, 10, 0)),
            utc(2025, 6, 3, 22, 0)
        );
        // Already past local midnight
        assert_eq!(
            next_local_midnight(utc(2025, 6, 3, 22, 30)),
            utc(2025, 6, 4, 22, 0)
        );
    }

    #[test]
    fn test_crossing_direction_rules() {
        assert_eq!(
            crossing_direction(900.0, 1000.0, 1000.0),
            Some(CrossingDirection::Rising)
        );
        assert_eq!(
            crossing_direction(1000.0, 999.0, 1000.0),
            Some(CrossingDirection::Falling)
        );
        assert_eq!(crossing_direction(1000.0, 1200.0, 1000.0), None);
        assert_eq!(crossing_direction(800.0, 999.0, 1000.0), None);
    }

    #[test]
    fn test_threshold_crossings_between_cycles() {
        let settings = Settings::default();
        let mut tracker = ChangeTracker::new();
        // margin 3500, demand 25500, capacity 29000
        tracker.observe(
            &snapshot(GridColor::Green, 25_500.0, 29_000.0),
            &settings,
            utc(2025, 6, 3, 8, 0),
        );
        // margin 1500, demand 27500, capacity 29000
        let obs = tracker.observe(
            &snapshot(GridColor::Green, 27_500.0, 29_000.0),
            &settings,
            utc(2025, 6, 3, 9, 0),
        );

        let margin: Vec<_> = obs
            .crossings
            .iter()
            .filter(|c| c.kind == ThresholdKind::Margin)
            .map(|c| (c.threshold, c.direction))
            .collect();
        assert_eq!(
            margin,
            vec![
                (2000.0, CrossingDirection::Falling),
                (3000.0, CrossingDirection::Falling)
            ]
        );
        assert!(
            !obs.crossings
                .iter()
                .any(|c| c.kind == ThresholdKind::Demand)
        );
        assert!(
            !obs.crossings
                .iter()
                .any(|c| c.kind == ThresholdKind::Capacity)
        );
        assert!(obs.change.is_none());
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut tracker = ChangeTracker::new();
        tracker.observe(
            &snapshot(GridColor::Orange, 25_000.0, 29_000.0),
            &Settings::default(),
            utc(2025, 6, 3, 8, 0),
        );
        let json = serde_json::to_string(tracker.state()).unwrap();
        let restored: TrackerState = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, tracker.state());
    }
}

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

//! Run-length color timeline over the forecast horizon.

use chrono::{DateTime, Duration, FixedOffset};
use gridpulse_types::{Direction, ForecastPoint, GridColor, GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One run of equal color
///
/// `direction` is the direction of the point that closed the run (the next run's first
/// point), or of the final point for the last run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub color: GridColor,
    pub direction: Direction,
}

impl fmt::Display for TimelineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}: {} ({})",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.color,
            self.direction
        )
    }
}

/// Single most severe hour of the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstPeriod {
    pub start: DateTime<FixedOffset>,
    pub color: GridColor,
}

impl fmt::Display for WorstPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}: {}",
            self.start.format("%H:%M"),
            (self.start + Duration::hours(1)).format("%H:%M"),
            self.color
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub segments: Vec<TimelineSegment>,
    pub worst_period: WorstPeriod,
}

/// Flat `{timeline, statusChanges, worstPeriod}` shape of the query surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineReport {
    pub timeline: String,
    pub status_changes: usize,
    pub worst_period: String,
}

impl Timeline {
    /// Number of color boundaries inside the window
    #[must_use]
    pub fn status_changes(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn to_report(&self) -> TimelineReport {
        TimelineReport {
            timeline: self.text(),
            status_changes: self.status_changes(),
            worst_period: self.worst_period.to_string(),
        }
    }
}

/// Encode the first `min(len, hours)` points as color runs
pub fn build_timeline(points: &[ForecastPoint], hours: usize) -> GridResult<Timeline> {
    let window = &points[..points.len().min(hours)];
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return Err(GridError::EmptyData(format!(
            "No forecast points for a {hours}h timeline"
        )));
    };

    let mut segments = Vec::new();
    let mut open_start = first.timestamp;
    let mut open_color = first.color;
    let mut worst = first;

    for point in &window[1..] {
        if point.color != open_color {
            segments.push(TimelineSegment {
                start: open_start,
                end: point.timestamp,
                color: open_color,
                direction: point.direction,
            });
            open_start = point.timestamp;
            open_color = point.color;
        }
        if point.color > worst.color {
            worst = point;
        }
    }

    segments.push(TimelineSegment {
        start: open_start,
        end: last.timestamp + Duration::hours(1),
        color: open_color,
        direction: last.direction,
    });

    Ok(Timeline {
        segments,
        worst_period: WorstPeriod {
            start: worst.timestamp,
            color: worst.color,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::hourly_points;

    fn with_directions(mut points: Vec<ForecastPoint>, dirs: &[Direction]) -> Vec<ForecastPoint> {
        for (point, dir) in points.iter_mut().zip(dirs) {
            point.direction = *dir;
        }
        points
    }

    #[test]
    fn test_segments_use_arriving_direction() {
        let points = with_directions(
            hourly_points(
                16,
                &[
                    GridColor::Green,
                    GridColor::Green,
                    GridColor::Orange,
                    GridColor::Red,
                    GridColor::Red,
                ],
            ),
            &[
                Direction::Stable,
                Direction::Stable,
                Direction::Up,
                Direction::Down,
                Direction::Stable,
            ],
        );
        let timeline = build_timeline(&points, 24).unwrap();

        assert_eq!(
            timeline.text(),
            "16:00-18:00: Green (Up)\n18:00-19:00: Orange (Down)\n19:00-21:00: Red (Stable)"
        );
        assert_eq!(timeline.status_changes(), 2);
        assert_eq!(timeline.worst_period.to_string(), "19:00-20:00: Red");
    }

    #[test]
    fn test_truncates_to_requested_hours() {
        let points = hourly_points(
            16,
            &[
                GridColor::Green,
                GridColor::Orange,
                GridColor::Red,
                GridColor::Green,
            ],
        );
        let report = build_timeline(&points, 2).unwrap().to_report();

        assert_eq!(report.status_changes, 1);
        assert_eq!(
            report.timeline,
            "16:00-17:00: Green (Stable)\n17:00-18:00: Orange (Stable)"
        );
        assert_eq!(report.worst_period, "17:00-18:00: Orange");
    }

    #[test]
    fn test_segments_are_contiguous() {
        let colors = [
            GridColor::Green,
            GridColor::Orange,
            GridColor::Orange,
            GridColor::Green,
            GridColor::Red,
            GridColor::Red,
            GridColor::Orange,
            GridColor::Green,
        ];
        let points = hourly_points(22, &colors);
        let timeline = build_timeline(&points, 6).unwrap();

        let window = &points[..6];
        let boundaries = window.windows(2).filter(|w| w[0].color != w[1].color).count();
        assert_eq!(timeline.status_changes(), boundaries);

        assert_eq!(timeline.segments[0].start, window[0].timestamp);
        for pair in timeline.segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_ne!(pair[0].color, pair[1].color);
        }
        assert_eq!(
            timeline.segments.last().unwrap().end,
            window[5].timestamp + Duration::hours(1)
        );
    }

    #[test]
    fn test_single_color_has_no_changes() {
        let points = hourly_points(0, &[GridColor::Green; 12]);
        let report = build_timeline(&points, 24).unwrap().to_report();
        assert_eq!(report.status_changes, 0);
        assert_eq!(report.timeline, "00:00-12:00: Green (Stable)");
        assert_eq!(report.worst_period, "00:00-01:00: Green");
    }

    #[test]
    fn test_zero_hours_is_error() {
        let points = hourly_points(0, &[GridColor::Green; 3]);
        assert!(matches!(
            build_timeline(&points, 0),
            Err(GridError::EmptyData(_))
        ));
        assert!(build_timeline(&[], 24).is_err());
    }
}

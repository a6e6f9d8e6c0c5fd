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

use chrono::{DateTime, Timelike, Utc};
use gridpulse_types::{FEED_UTC_OFFSET_HOURS, ForecastPoint, GridError, GridResult};
use tracing::debug;

/// Feed-local hour that corresponds to `now`
#[must_use]
pub fn target_hour(now: DateTime<Utc>) -> u32 {
    (now.hour() + FEED_UTC_OFFSET_HOURS.unsigned_abs()) % 24
}

/// Index of the point describing "now"
///
/// First point whose local hour equals the target hour; falls back to index 0.
pub fn current_index(points: &[ForecastPoint], now: DateTime<Utc>) -> GridResult<usize> {
    if points.is_empty() {
        return Err(GridError::EmptyData(
            "Cannot select current point from empty forecast".to_owned(),
        ));
    }

    let hour = target_hour(now);
    match points.iter().position(|p| p.local_hour() == hour) {
        Some(idx) => Ok(idx),
        None => {
            debug!("No forecast point for local hour {hour:02}, using first point");
            Ok(0)
        }
    }
}

/// The point describing "now" (see [`current_index`])
pub fn select_current(points: &[ForecastPoint], now: DateTime<Utc>) -> GridResult<&ForecastPoint> {
    let idx = current_index(points, now)?;
    Ok(&points[idx])
}

/// The forecast from the current point onward
pub fn upcoming(points: &[ForecastPoint], now: DateTime<Utc>) -> GridResult<&[ForecastPoint]> {
    let idx = current_index(points, now)?;
    Ok(&points[idx..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{hourly_points, utc};
    use gridpulse_types::GridColor;

    #[test]
    fn test_target_hour_wraps_midnight() {
        assert_eq!(target_hour(utc(2025, 6, 3, 10, 15)), 12);
        assert_eq!(target_hour(utc(2025, 6, 3, 22, 0)), 0);
        assert_eq!(target_hour(utc(2025, 6, 3, 23, 59)), 1);
    }

    #[test]
    fn test_selects_matching_hour() {
        // Local 16:00 .. 21:00
        let points = hourly_points(16, &[GridColor::Green; 6]);
        let current = select_current(&points, utc(2025, 6, 3, 17, 30)).unwrap();
        assert_eq!(current.local_hour(), 19);
    }

    #[test]
    fn test_first_match_wins() {
        // Two days: 18:00 appears at index 2 and again at index 26
        let points = hourly_points(16, &[GridColor::Green; 30]);
        assert_eq!(current_index(&points, utc(2025, 6, 3, 16, 0)).unwrap(), 2);
    }

    #[test]
    fn test_falls_back_to_first_point() {
        let points = hourly_points(16, &[GridColor::Orange; 3]);
        let current = select_current(&points, utc(2025, 6, 3, 5, 0)).unwrap();
        assert_eq!(current.local_hour(), 16);
    }

    #[test]
    fn test_upcoming_starts_at_current() {
        let points = hourly_points(16, &[GridColor::Green; 6]);
        let rest = upcoming(&points, utc(2025, 6, 3, 16, 0)).unwrap();
        assert_eq!(rest.len(), 4);
        assert_eq!(rest[0].local_hour(), 18);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(
            select_current(&[], utc(2025, 6, 3, 16, 0)),
            Err(GridError::EmptyData(_))
        ));
    }
}

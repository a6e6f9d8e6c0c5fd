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

//! Fixture builders shared by the unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use gridpulse_types::{Direction, ForecastPoint, GridColor, feed_offset};

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

/// A point at local `2025-06-03 hour:minute` (+hours spill into following days)
pub fn point_at(
    hours_from_midnight: i64,
    minute: u32,
    color: GridColor,
    load: f64,
    declared: f64,
) -> ForecastPoint {
    let midnight = feed_offset()
        .with_ymd_and_hms(2025, 6, 3, 0, minute, 0)
        .single()
        .unwrap();
    ForecastPoint::new(
        midnight + Duration::hours(hours_from_midnight),
        color,
        Direction::Stable,
        load,
        declared,
        declared + 2000.0,
    )
}

/// Hourly points starting at local `start_hour:00`, one per color
pub fn hourly_points(start_hour: i64, colors: &[GridColor]) -> Vec<ForecastPoint> {
    colors
        .iter()
        .enumerate()
        .map(|(i, color)| point_at(start_hour + i as i64, 0, *color, 25_000.0, 28_000.0))
        .collect()
}

/// Hourly points with explicit (color, load, declared) triples
pub fn points_with(start_hour: i64, rows: &[(GridColor, f64, f64)]) -> Vec<ForecastPoint> {
    rows.iter()
        .enumerate()
        .map(|(i, (color, load, declared))| {
            point_at(start_hour + i as i64, 0, *color, *load, *declared)
        })
        .collect()
}

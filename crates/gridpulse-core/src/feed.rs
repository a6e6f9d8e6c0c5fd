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

//! Ingestion of the callback-wrapped PowerAlert feed.
//!
//! The feed answers with `callbackName(<json>)`. The interior between the first `(`
//! and the last `)` is either an ordered array of hourly forecast records or a single
//! current-status record.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use gridpulse_types::{
    Direction, ForecastPoint, GridColor, GridError, GridResult, feed_offset,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Forecast record as published by the feed
///
/// `DeclaredAvailabilty` is misspelled upstream; the corrected spelling is accepted too.
#[derive(Debug, Deserialize)]
struct RawForecastRecord {
    #[serde(rename = "Timestamp")]
    timestamp: String,

    #[serde(rename = "Color", default)]
    color: Option<String>,

    #[serde(rename = "ColorId", default)]
    color_id: Option<i64>,

    #[serde(rename = "Direction", default)]
    direction: Option<Value>,

    #[serde(rename = "DirectionId", default)]
    direction_id: Option<i64>,

    #[serde(rename = "LoadForecast", default)]
    load_forecast: Option<f64>,

    #[serde(
        rename = "DeclaredAvailabilty",
        alias = "DeclaredAvailability",
        default
    )]
    declared_availability: Option<f64>,

    #[serde(rename = "MaxAvailability", default)]
    max_availability: Option<f64>,
}

impl RawForecastRecord {
    fn into_point(self, index: usize) -> GridResult<ForecastPoint> {
        let timestamp = parse_feed_timestamp(&self.timestamp)?;
        let color = self.resolve_color(index)?;
        let direction = self.resolve_direction()?;

        Ok(ForecastPoint {
            timestamp,
            color,
            direction,
            load_forecast_mw: non_negative("LoadForecast", self.load_forecast, index),
            declared_availability_mw: non_negative(
                "DeclaredAvailabilty",
                self.declared_availability,
                index,
            ),
            max_availability_mw: non_negative("MaxAvailability", self.max_availability, index),
        })
    }

    fn resolve_color(&self, index: usize) -> GridResult<GridColor> {
        if let Some(name) = self.color.as_deref().filter(|c| !c.trim().is_empty()) {
            return name.parse();
        }
        self.color_id
            .and_then(GridColor::from_color_id)
            .ok_or_else(|| {
                GridError::Parse(format!(
                    "Record {index} has neither a Color nor a known ColorId ({:?})",
                    self.color_id
                ))
            })
    }

    fn resolve_direction(&self) -> GridResult<Direction> {
        match &self.direction {
            Some(Value::String(name)) if !name.trim().is_empty() => name.parse(),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(Direction::from_direction_id)
                .ok_or_else(|| GridError::Parse(format!("Unknown direction id: {n}"))),
            _ => Ok(self
                .direction_id
                .and_then(Direction::from_direction_id)
                .unwrap_or(Direction::Stable)),
        }
    }
}

fn non_negative(field: &str, value: Option<f64>, index: usize) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        Some(v) => {
            warn!("Record {index}: {field} = {v} is not a valid MW figure, using 0");
            0.0
        }
        None => {
            trace!("Record {index}: {field} missing, using 0");
            0.0
        }
    }
}

/// Parse a feed timestamp into the feed's local offset
///
/// Timestamps with an explicit offset are converted; naive ones are taken as local.
pub fn parse_feed_timestamp(raw: &str) -> GridResult<DateTime<FixedOffset>> {
    let offset = feed_offset();
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&offset));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .ok_or_else(|| GridError::Parse(format!("Unrecognized timestamp: '{raw}'")))
}

/// Extract the interior of a `name(...)` callback envelope
///
/// Uses the first `(` and the last `)`; the interior is returned verbatim.
pub fn extract_envelope(raw: &str) -> GridResult<&str> {
    let open = raw
        .find('(')
        .ok_or_else(|| GridError::Parse("Feed envelope has no opening parenthesis".to_owned()))?;
    let close = raw
        .rfind(')')
        .ok_or_else(|| GridError::Parse("Feed envelope has no closing parenthesis".to_owned()))?;

    if close <= open {
        return Err(GridError::Parse(
            "Feed envelope closes before it opens".to_owned(),
        ));
    }

    let interior = raw
        .get(open + 1..close)
        .ok_or_else(|| GridError::Parse("Feed envelope is not valid UTF-8".to_owned()))?;

    if interior.trim().is_empty() {
        return Err(GridError::Parse("Feed envelope is empty".to_owned()));
    }

    Ok(interior)
}

fn parse_envelope_json(raw: &str) -> GridResult<Value> {
    let interior = extract_envelope(raw)?;
    serde_json::from_str(interior)
        .map_err(|e| GridError::Parse(format!("Feed payload is not valid JSON: {e}")))
}

/// Normalize a forecast feed into an ascending sequence of points
pub fn normalize_forecast(raw: &str) -> GridResult<Vec<ForecastPoint>> {
    let Value::Array(records) = parse_envelope_json(raw)? else {
        return Err(GridError::EmptyData(
            "Feed payload is not a forecast sequence".to_owned(),
        ));
    };

    if records.is_empty() {
        return Err(GridError::EmptyData(
            "Feed contained no forecast records".to_owned(),
        ));
    }

    let mut points = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let raw: RawForecastRecord = serde_json::from_value(record)
                .map_err(|e| GridError::Parse(format!("Record {index} is malformed: {e}")))?;
            raw.into_point(index)
        })
        .collect::<GridResult<Vec<_>>>()?;

    // Stable sort keeps feed order for equal timestamps
    points.sort_by_key(|p| p.timestamp);

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        debug!(
            "Normalized {} forecast points ({} .. {})",
            points.len(),
            first.timestamp.format("%Y-%m-%d %H:%M"),
            last.timestamp.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(points)
}

/// Single current-status record (feed shape with legacy `ColorId`)
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentStatus {
    pub point: ForecastPoint,
    /// Raw legacy color id, when the feed supplied one
    pub color_id: Option<i64>,
}

/// Normalize a current-status feed into one record
pub fn normalize_current_status(raw: &str) -> GridResult<CurrentStatus> {
    let value = parse_envelope_json(raw)?;
    if !value.is_object() {
        return Err(GridError::Parse(
            "Current-status payload is not a single record".to_owned(),
        ));
    }

    let record: RawForecastRecord = serde_json::from_value(value)
        .map_err(|e| GridError::Parse(format!("Current-status record is malformed: {e}")))?;
    let color_id = record.color_id;
    let point = record.into_point(0)?;

    debug!(
        "Current status: {} ({}) at {}",
        point.color,
        point.direction,
        point.timestamp.format("%Y-%m-%d %H:%M")
    );

    Ok(CurrentStatus { point, color_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const FORECAST: &str = r#"createChart([
        {"Timestamp":"2025-06-03T19:00:00","Color":"Orange","Direction":"Down","LoadForecast":28500.0,"DeclaredAvailabilty":29000.0,"MaxAvailability":31000.0},
        {"Timestamp":"2025-06-03T18:00:00","Color":"Red","Direction":"Up","LoadForecast":29500.0,"DeclaredAvailabilty":29000.0,"MaxAvailability":31000.0}
    ]);"#;

    #[test]
    fn test_extract_envelope_exact_interior() {
        assert_eq!(extract_envelope(r#"cb({"a":1})"#).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_envelope_uses_last_closing_paren() {
        assert_eq!(
            extract_envelope(r#"cb({"note":"(x)"});"#).unwrap(),
            r#"{"note":"(x)"}"#
        );
    }

    #[test]
    fn test_extract_envelope_missing_closing_paren() {
        assert!(matches!(
            extract_envelope(r#"cb({"a":1}"#),
            Err(GridError::Parse(_))
        ));
    }

    #[test]
    fn test_extract_envelope_missing_opening_paren() {
        assert!(matches!(
            extract_envelope(r#"{"a":1})"#),
            Err(GridError::Parse(_))
        ));
    }

    #[test]
    fn test_extract_envelope_whitespace_interior() {
        assert!(matches!(extract_envelope("cb(   )"), Err(GridError::Parse(_))));
    }

    #[test]
    fn test_normalize_sorts_ascending() {
        let points = normalize_forecast(FORECAST).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.hour(), 18);
        assert_eq!(points[0].color, GridColor::Red);
        assert_eq!(points[1].direction, Direction::Down);
        assert!((points[1].declared_availability_mw - 29000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_rejects_invalid_json() {
        assert!(matches!(
            normalize_forecast("cb([{not json}])"),
            Err(GridError::Parse(_))
        ));
    }

    #[test]
    fn test_normalize_empty_array_is_empty_data() {
        assert!(matches!(
            normalize_forecast("cb([])"),
            Err(GridError::EmptyData(_))
        ));
    }

    #[test]
    fn test_normalize_object_is_empty_data() {
        assert!(matches!(
            normalize_forecast(r#"cb({"a":1})"#),
            Err(GridError::EmptyData(_))
        ));
    }

    #[test]
    fn test_timestamp_with_offset_is_converted_to_feed_zone() {
        let ts = parse_feed_timestamp("2025-06-03T16:00:00Z").unwrap();
        assert_eq!(ts.hour(), 18);
        assert_eq!(ts.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_missing_figures_default_to_zero() {
        let points = normalize_forecast(
            r#"cb([{"Timestamp":"2025-06-03T18:00:00","Color":"Green","Direction":"Stable"}])"#,
        )
        .unwrap();
        assert!(points[0].load_forecast_mw.abs() < f64::EPSILON);
        assert!(points[0].max_availability_mw.abs() < f64::EPSILON);
    }

    #[test]
    fn test_direction_id_fallback() {
        let points = normalize_forecast(
            r#"cb([{"Timestamp":"2025-06-03T18:00:00","Color":"Green","DirectionId":2,"LoadForecast":1.0}])"#,
        )
        .unwrap();
        assert_eq!(points[0].direction, Direction::Down);
    }

    #[test]
    fn test_unknown_color_is_parse_error() {
        assert!(matches!(
            normalize_forecast(r#"cb([{"Timestamp":"2025-06-03T18:00:00","Color":"Purple"}])"#),
            Err(GridError::Parse(_))
        ));
    }

    #[test]
    fn test_current_status_uses_color_id() {
        let status = normalize_current_status(
            r#"maintainCurrentStatus({"Timestamp":"2025-06-03T18:00:00","ColorId":3,"Direction":"Up","LoadForecast":27000,"DeclaredAvailabilty":28000,"MaxAvailability":30000})"#,
        )
        .unwrap();
        assert_eq!(status.point.color, GridColor::Orange);
        assert_eq!(status.color_id, Some(3));
        assert_eq!(status.point.direction, Direction::Up);
    }

    #[test]
    fn test_current_status_rejects_array() {
        assert!(matches!(
            normalize_current_status(r#"cb([{"Timestamp":"2025-06-03T18:00:00","Color":"Red"}])"#),
            Err(GridError::Parse(_))
        ));
    }
}

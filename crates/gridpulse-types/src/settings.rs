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

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::GridError;

const MARGIN_THRESHOLD_RANGE: RangeInclusive<f64> = -10_000.0..=20_000.0;
const DEMAND_THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=60_000.0;
const CAPACITY_THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=60_000.0;
const CRITICAL_MARGIN_RANGE: RangeInclusive<f64> = 0.0..=10_000.0;
const HIGH_UTILIZATION_RANGE: RangeInclusive<f64> = 0.0..=100.0;
const STABLE_MARGIN_RANGE: RangeInclusive<f64> = 0.0..=20_000.0;

/// User-tunable alert settings
///
/// Each field is validated independently. An out-of-range value is replaced by its
/// default and reported as a warning, never as a hard failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Margin levels (MW) that raise threshold crossings, ascending
    pub margin_thresholds: Vec<f64>,

    /// Demand levels (MW), ascending
    pub demand_thresholds: Vec<f64>,

    /// Declared capacity levels (MW), ascending
    pub capacity_thresholds: Vec<f64>,

    /// Margin (MW) below which the grid is considered critical
    pub critical_margin: f64,

    /// Utilization (%) above which the grid is considered highly utilized
    pub high_utilization: f64,

    /// Margin (MW) above which the grid is considered stable
    pub stable_margin: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            margin_thresholds: vec![1000.0, 2000.0, 3000.0],
            demand_thresholds: vec![25_000.0, 28_000.0, 30_000.0],
            capacity_thresholds: vec![26_000.0, 28_000.0, 30_000.0],
            critical_margin: 1000.0,
            high_utilization: 90.0,
            stable_margin: 3000.0,
        }
    }
}

impl Settings {
    /// Replace every invalid field with its default
    ///
    /// Returns the usable settings together with one warning per replaced field.
    #[must_use]
    pub fn sanitized(self) -> (Self, ValidationResult) {
        let defaults = Self::default();
        let mut result = ValidationResult::default();

        let margin_thresholds = sanitize_sequence(
            "margin_thresholds",
            self.margin_thresholds,
            &MARGIN_THRESHOLD_RANGE,
            defaults.margin_thresholds,
            &mut result,
        );
        let demand_thresholds = sanitize_sequence(
            "demand_thresholds",
            self.demand_thresholds,
            &DEMAND_THRESHOLD_RANGE,
            defaults.demand_thresholds,
            &mut result,
        );
        let capacity_thresholds = sanitize_sequence(
            "capacity_thresholds",
            self.capacity_thresholds,
            &CAPACITY_THRESHOLD_RANGE,
            defaults.capacity_thresholds,
            &mut result,
        );
        let critical_margin = sanitize_value(
            "critical_margin",
            self.critical_margin,
            &CRITICAL_MARGIN_RANGE,
            defaults.critical_margin,
            &mut result,
        );
        let high_utilization = sanitize_value(
            "high_utilization",
            self.high_utilization,
            &HIGH_UTILIZATION_RANGE,
            defaults.high_utilization,
            &mut result,
        );
        let stable_margin = sanitize_value(
            "stable_margin",
            self.stable_margin,
            &STABLE_MARGIN_RANGE,
            defaults.stable_margin,
            &mut result,
        );

        (
            Self {
                margin_thresholds,
                demand_thresholds,
                capacity_thresholds,
                critical_margin,
                high_utilization,
                stable_margin,
            },
            result,
        )
    }
}

fn sanitize_value(
    field: &str,
    value: f64,
    range: &RangeInclusive<f64>,
    default: f64,
    result: &mut ValidationResult,
) -> f64 {
    if range.contains(&value) {
        value
    } else {
        result.add_warning(
            field,
            format!(
                "{value} is outside {}..={}, using default {default}",
                range.start(),
                range.end()
            ),
        );
        default
    }
}

fn sanitize_sequence(
    field: &str,
    values: Vec<f64>,
    range: &RangeInclusive<f64>,
    default: Vec<f64>,
    result: &mut ValidationResult,
) -> Vec<f64> {
    let problem = if values.is_empty() {
        Some("must contain at least one value".to_owned())
    } else if let Some(bad) = values.iter().find(|v| !range.contains(*v)) {
        Some(format!(
            "{bad} is outside {}..={}",
            range.start(),
            range.end()
        ))
    } else if values.windows(2).any(|pair| pair[0] >= pair[1]) {
        Some("values must be strictly ascending".to_owned())
    } else {
        None
    };

    match problem {
        None => values,
        Some(reason) => {
            result.add_warning(
                field,
                format!("{values:?} rejected ({reason}), using default {default:?}"),
            );
            default
        }
    }
}

// ============= Validation Reporting =============

/// Fields replaced by their defaults during sanitizing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether every field was accepted as given
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// One rejected settings field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl From<&ValidationIssue> for GridError {
    fn from(issue: &ValidationIssue) -> Self {
        GridError::Validation {
            field: issue.field.clone(),
            message: issue.message.clone(),
        }
    }
}

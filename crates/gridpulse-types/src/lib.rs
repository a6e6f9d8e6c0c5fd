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

pub mod error;
pub mod events;
pub mod forecast;
pub mod query;
pub mod settings;
pub mod snapshot;

// Re-export common types for convenience
pub use error::{GridError, GridResult};
pub use events::{
    ChangeEvent, CrossingDirection, SeverityChange, ThresholdCrossing, ThresholdKind,
};
pub use forecast::{
    Direction, FEED_UTC_OFFSET_HOURS, ForecastPoint, GridColor, feed_offset,
};
pub use query::{ExportFormat, Metric, RiskWeights, Sensitivity, SystemState, TimeOfDay};
pub use settings::{Settings, ValidationIssue, ValidationResult};
pub use snapshot::{DerivedMetrics, FieldRange, ForecastAggregates, StatusSnapshot};

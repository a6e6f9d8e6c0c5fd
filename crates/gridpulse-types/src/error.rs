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

use thiserror::Error;

/// Grid monitoring error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Network failure or non-success HTTP response from the feed
    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    /// Malformed callback envelope or payload
    #[error("Feed parse failed: {0}")]
    Parse(String),

    /// Zero forecast points where at least one is required
    #[error("No forecast data: {0}")]
    EmptyData(String),

    /// Out-of-range setting (recovered locally by defaulting)
    #[error("Invalid setting {field}: {message}")]
    Validation { field: String, message: String },

    /// Serializing export records failed
    #[error("Export encoding failed: {0}")]
    Export(String),

    /// Unrecognized name passed to a query method
    #[error("Unknown {kind} '{value}' (expected one of: {expected})")]
    UnknownArgument {
        kind: &'static str,
        value: String,
        expected: String,
    },
}

impl GridError {
    pub fn unknown_argument(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self::UnknownArgument {
            kind,
            value: value.to_owned(),
            expected: expected.join(", "),
        }
    }

    /// Whether this error abandons only the current refresh cycle.
    #[must_use]
    pub fn is_cycle_abort(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Parse(_) | Self::EmptyData(_))
    }
}

pub type GridResult<T> = Result<T, GridError>;

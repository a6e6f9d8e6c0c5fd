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

//! Composite risk score over color, margin and trend.
//!
//! The bands and the three-valued trend score are fixed heuristics, not a statistical model.

use gridpulse_types::{ForecastPoint, GridColor, GridError, GridResult, Sensitivity};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::trend::{Trend, analyze_trend};

const HIGH_RISK_SCORE: u32 = 75;
const MEDIUM_RISK_SCORE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_RISK_SCORE {
            Self::High
        } else if score >= MEDIUM_RISK_SCORE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::High => "reduce non-essential usage",
            Self::Medium => "consider postponing energy-intensive activities",
            Self::Low => "safe to proceed.",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

/// Individual 0-100 scores before weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskComponents {
    pub color_score: f64,
    pub margin_score: f64,
    pub trend_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub recommendation: String,
    pub components: RiskComponents,
}

#[must_use]
pub fn color_score(color: GridColor) -> f64 {
    match color {
        GridColor::Green => 25.0,
        GridColor::Yellow => 50.0,
        GridColor::Orange => 75.0,
        GridColor::Red => 100.0,
    }
}

/// `100 - margin%` of current availability, clamped to 0..=100
#[must_use]
pub fn margin_score(point: &ForecastPoint) -> f64 {
    let availability = point.declared_availability_mw;
    let margin_pct = if availability > 0.0 {
        point.margin_mw() / availability * 100.0
    } else {
        0.0
    };
    (100.0 - margin_pct).clamp(0.0, 100.0)
}

/// 75 when the margin trend is negative, 25 when positive, 50 otherwise
#[must_use]
pub fn trend_score(trend: &Trend) -> f64 {
    if trend.margin_trend < 0.0 {
        75.0
    } else if trend.margin_trend > 0.0 {
        25.0
    } else {
        50.0
    }
}

/// Score the first point of `points`, using the whole slice for the trend
pub fn score_risk(points: &[ForecastPoint], sensitivity: Sensitivity) -> GridResult<RiskAssessment> {
    let Some(current) = points.first() else {
        return Err(GridError::EmptyData(
            "Cannot score risk of an empty forecast".to_owned(),
        ));
    };
    let trend = analyze_trend(points)?;
    let weights = sensitivity.weights();

    let components = RiskComponents {
        color_score: color_score(current.color),
        margin_score: margin_score(current),
        trend_score: trend_score(&trend),
    };

    let weighted = components.color_score * weights.color
        + components.margin_score * weights.margin
        + components.trend_score * weights.trend;
    let score = weighted.round().clamp(0.0, 100.0) as u32;
    let level = RiskLevel::from_score(score);

    Ok(RiskAssessment {
        score,
        level,
        recommendation: level.recommendation().to_owned(),
        components,
    })
}

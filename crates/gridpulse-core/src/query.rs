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

//! On-demand query surface.
//!
//! Every query fetches its own forecast and computes from the current point onward. Names
//! arrive as strings and are parsed into closed enums; unknown names are rejected with
//! `GridError::UnknownArgument` before anything is fetched.

use chrono::{DateTime, Utc};
use gridpulse_types::{
    ExportFormat, ForecastPoint, GridError, GridResult, Metric, Sensitivity, Settings, SystemState,
    TimeOfDay,
};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::export::{HistoryExport, export_history};
use crate::feed::CurrentStatus;
use crate::metrics::{reserve_margin, utilization};
use crate::risk::{RiskAssessment, score_risk};
use crate::selection::upcoming;
use crate::timeline::{TimelineReport, build_timeline};
use crate::traits::{FeedSource, fetch_current_status, fetch_forecast};
use crate::trend::analyze_trend;
use crate::window::{WindowOutcome, find_optimal_window};

/// Source of "now" for queries
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Value of `metric` at `point`
#[must_use]
pub fn metric_value(metric: Metric, point: &ForecastPoint) -> f64 {
    match metric {
        Metric::Margin => point.margin_mw(),
        Metric::Demand => point.load_forecast_mw,
        Metric::Capacity => point.declared_availability_mw,
        Metric::Utilization => utilization(point.load_forecast_mw, point.declared_availability_mw),
        Metric::ReserveMargin => reserve_margin(point.margin_mw(), point.load_forecast_mw),
    }
}

/// Whether `state` holds for a forecast starting at the current point
pub fn state_holds(
    state: SystemState,
    points: &[ForecastPoint],
    settings: &Settings,
) -> GridResult<bool> {
    let current = points.first().ok_or_else(|| {
        GridError::EmptyData("Cannot evaluate state of an empty forecast".to_owned())
    })?;

    let holds = match state {
        SystemState::Critical => current.margin_mw() < settings.critical_margin,
        SystemState::HighUtilization => {
            utilization(current.load_forecast_mw, current.declared_availability_mw)
                > settings.high_utilization
        }
        SystemState::Stable => current.margin_mw() > settings.stable_margin,
        SystemState::Improving => analyze_trend(points)?.is_improving(),
    };
    Ok(holds)
}

pub struct GridQueryService {
    source: Arc<dyn FeedSource>,
    settings: Arc<RwLock<Settings>>,
    clock: Clock,
}

impl fmt::Debug for GridQueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridQueryService")
            .field("source", &self.source.name())
            .field("settings", &*self.settings.read())
            .finish_non_exhaustive()
    }
}

impl GridQueryService {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self {
            source,
            settings: Arc::new(RwLock::new(Settings::default())),
            clock: Arc::new(Utc::now),
        }
    }

    /// Use fixed settings (sanitized)
    #[must_use]
    pub fn with_settings(self, settings: Settings) -> Self {
        let (sanitized, _) = settings.sanitized();
        self.with_shared_settings(Arc::new(RwLock::new(sanitized)))
    }

    /// Read settings from a handle updated elsewhere
    #[must_use]
    pub fn with_shared_settings(mut self, settings: Arc<RwLock<Settings>>) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Freshly fetched forecast from the current point onward
    pub async fn upcoming_points(&self) -> GridResult<Vec<ForecastPoint>> {
        let points = fetch_forecast(self.source.as_ref()).await?;
        let now = (self.clock)();
        let rest = upcoming(&points, now)?;
        debug!(
            "Query uses {} of {} forecast points",
            rest.len(),
            points.len()
        );
        Ok(rest.to_vec())
    }

    pub async fn get_metric(&self, name: &str) -> GridResult<f64> {
        let metric: Metric = name.parse()?;
        let points = self.upcoming_points().await?;
        Ok(metric_value(metric, &points[0]))
    }

    pub async fn check_state(&self, name: &str) -> GridResult<bool> {
        let state: SystemState = name.parse()?;
        let points = self.upcoming_points().await?;
        let settings = self.settings.read().clone();
        state_holds(state, &points, &settings)
    }

    pub async fn find_optimal_window(
        &self,
        duration_minutes: u32,
        start_time: &str,
        end_time: &str,
    ) -> GridResult<WindowOutcome> {
        let start: TimeOfDay = start_time.parse()?;
        let end: TimeOfDay = end_time.parse()?;
        let points = self.upcoming_points().await?;
        Ok(find_optimal_window(&points, duration_minutes, start, end))
    }

    pub async fn score_risk(&self, sensitivity: &str) -> GridResult<RiskAssessment> {
        let sensitivity: Sensitivity = sensitivity.parse()?;
        let points = self.upcoming_points().await?;
        score_risk(&points, sensitivity)
    }

    pub async fn build_timeline(&self, hours: usize) -> GridResult<TimelineReport> {
        let points = self.upcoming_points().await?;
        Ok(build_timeline(&points, hours)?.to_report())
    }

    pub async fn export_history(&self, hours: usize, format: &str) -> GridResult<HistoryExport> {
        let format: ExportFormat = format.parse()?;
        let points = self.upcoming_points().await?;
        export_history(&points, hours, format, (self.clock)())
    }

    pub async fn current_status(&self) -> GridResult<CurrentStatus> {
        fetch_current_status(self.source.as_ref()).await
    }
}

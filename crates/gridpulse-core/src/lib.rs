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

pub mod aggregation;
pub mod capabilities;
pub mod export;
pub mod feed;
pub mod metrics;
pub mod monitor;
pub mod persistence;
pub mod query;
pub mod risk;
pub mod scheduler;
pub mod selection;
pub mod timeline;
pub mod tracker;
pub mod traits;
pub mod trend;
pub mod window;

#[cfg(test)]
mod test_support;

pub use aggregation::aggregate;
pub use capabilities::{CapabilityValues, format_last_updated};
pub use export::{ExportArchive, ExportSummary, HistoryExport, HistoryRecord, export_history};
pub use feed::{
    CurrentStatus, extract_envelope, normalize_current_status, normalize_forecast,
    parse_feed_timestamp,
};
pub use metrics::{
    build_snapshot, derive, margin, probability, reserve_margin, status_message, utilization,
};
pub use monitor::{CycleOutcome, CycleReport, GridMonitor, MonitorError, MonitorOptions};
pub use persistence::TrackerStore;
pub use query::{Clock, GridQueryService, metric_value, state_holds};
pub use risk::{RiskAssessment, RiskComponents, RiskLevel, score_risk};
pub use scheduler::{RefreshScheduler, RefreshTarget, ScheduleHandle, TokioRefreshScheduler};
pub use selection::{current_index, select_current, target_hour, upcoming};
pub use timeline::{Timeline, TimelineReport, TimelineSegment, WorstPeriod, build_timeline};
pub use tracker::{ChangeTracker, ObservedMetrics, Observation, TrackerState};
pub use traits::{
    CapabilityPublisher, ChangeNotifier, FeedSource, fetch_current_status, fetch_forecast,
};
pub use trend::{Trend, analyze_trend};
pub use window::{OptimalWindow, WindowOutcome, WindowReport, find_optimal_window};

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

use anyhow::Result;
use async_trait::async_trait;
use gridpulse_types::{ChangeEvent, ForecastPoint, GridResult, ThresholdCrossing};

use crate::capabilities::CapabilityValues;
use crate::feed::{CurrentStatus, normalize_current_status, normalize_forecast};

/// Transport for the callback-wrapped grid feeds
///
/// Implementations only move bytes; a non-success response is `GridError::Fetch`.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Raw text of the hourly forecast feed
    async fn fetch_forecast_feed(&self) -> GridResult<String>;

    /// Raw text of the single current-status record
    async fn fetch_current_status_feed(&self) -> GridResult<String>;

    /// Check if the feed is reachable
    async fn health_check(&self) -> GridResult<bool>;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Fetch and normalize the forecast in one step
pub async fn fetch_forecast(source: &dyn FeedSource) -> GridResult<Vec<ForecastPoint>> {
    let raw = source.fetch_forecast_feed().await?;
    normalize_forecast(&raw)
}

/// Fetch and normalize the current-status record
pub async fn fetch_current_status(source: &dyn FeedSource) -> GridResult<CurrentStatus> {
    let raw = source.fetch_current_status_feed().await?;
    normalize_current_status(&raw)
}

/// Delivery of change events to whatever fires rule-engine triggers
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn notify_change(&self, event: &ChangeEvent) -> Result<()>;

    async fn notify_threshold(&self, crossing: &ThresholdCrossing) -> Result<()>;

    fn name(&self) -> &str;
}

/// Publication of snapshot-derived observable properties
#[async_trait]
pub trait CapabilityPublisher: Send + Sync {
    async fn publish(&self, values: &CapabilityValues) -> Result<()>;

    fn name(&self) -> &str;
}

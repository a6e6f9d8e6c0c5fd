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

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use gridpulse_core::ChangeNotifier;
use gridpulse_types::{ChangeEvent, CrossingDirection, SeverityChange, ThresholdCrossing};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const STATUS_CHANGED_EVENT: &str = "grid_status_changed";
pub const THRESHOLD_CROSSED_EVENT: &str = "threshold_crossed";

/// Logs every event
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl ChangeNotifier for TracingNotifier {
    async fn notify_change(&self, event: &ChangeEvent) -> Result<()> {
        match event.severity_change {
            SeverityChange::Worsened => warn!(
                previous = %event.previous_color,
                new = %event.new_color,
                changes_today = event.daily_change_count,
                "⚠️ Grid status worsened"
            ),
            SeverityChange::Improved | SeverityChange::Unchanged => info!(
                previous = %event.previous_color,
                new = %event.new_color,
                changes_today = event.daily_change_count,
                "🟢 Grid status {}",
                event.severity_change
            ),
        }
        Ok(())
    }

    async fn notify_threshold(&self, crossing: &ThresholdCrossing) -> Result<()> {
        let arrow = match crossing.direction {
            CrossingDirection::Rising => "above",
            CrossingDirection::Falling => "below",
        };
        info!(
            kind = crossing.kind.as_str(),
            threshold = crossing.threshold,
            "📈 {} moved {} {:.0} MW ({:.0} → {:.0})",
            crossing.kind.as_str(),
            arrow,
            crossing.threshold,
            crossing.previous,
            crossing.current
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a, T: Serialize> {
    event: &'static str,
    #[serde(flatten)]
    data: &'a T,
}

/// POSTs each event as JSON to a fixed URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    async fn post<T: Serialize + Sync>(&self, event: &'static str, data: &T) -> Result<()> {
        let payload = WebhookPayload { event, data };
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST {event} to {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Webhook {} answered {} for {event}", self.url, status);
        }
        debug!("Delivered {} to webhook", event);
        Ok(())
    }
}

#[async_trait]
impl ChangeNotifier for WebhookNotifier {
    async fn notify_change(&self, event: &ChangeEvent) -> Result<()> {
        self.post(STATUS_CHANGED_EVENT, event).await
    }

    async fn notify_threshold(&self, crossing: &ThresholdCrossing) -> Result<()> {
        self.post(THRESHOLD_CROSSED_EVENT, crossing).await
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

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

use async_trait::async_trait;
use gridpulse_core::FeedSource;
use gridpulse_types::{GridError, GridResult};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, trace};

pub const DEFAULT_FORECAST_URL: &str = "https://www.poweralert.co.za/PowerAlertAPI/api/PowerAlertForecast/PowerAlertForecasts?callback=createChart";
pub const DEFAULT_CURRENT_STATUS_URL: &str = "https://www.poweralert.co.za/PowerAlertAPI/api/PowerAlertForecast/CurrentSystemStatus?callback=maintainCurrentStatus";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the PowerAlert JSONP feeds
///
/// One GET per call and no retries; the refresh cycle decides what a failure means.
#[derive(Debug, Clone)]
pub struct PowerAlertClient {
    forecast_url: String,
    current_status_url: String,
    client: Client,
}

impl PowerAlertClient {
    pub fn new(
        forecast_url: impl Into<String>,
        current_status_url: impl Into<String>,
        timeout: Duration,
    ) -> GridResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gridpulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GridError::Fetch(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            forecast_url: forecast_url.into(),
            current_status_url: current_status_url.into(),
            client,
        })
    }

    /// Client for the public PowerAlert endpoints
    pub fn with_defaults() -> GridResult<Self> {
        Self::new(
            DEFAULT_FORECAST_URL,
            DEFAULT_CURRENT_STATUS_URL,
            DEFAULT_TIMEOUT,
        )
    }

    #[must_use]
    pub fn forecast_url(&self) -> &str {
        &self.forecast_url
    }

    async fn get_text(&self, url: &str) -> GridResult<String> {
        debug!("🔍 [FEED] GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("❌ [FEED] Request to {} failed: {}", url, e);
            GridError::Fetch(format!("Request to {url} failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ [FEED] Status {} from {}", status, url);
            trace!("   Body: {}", body);
            return Err(GridError::Fetch(format!(
                "HTTP {} from {url}",
                status.as_u16()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GridError::Fetch(format!("Failed to read body from {url}: {e}")))?;
        debug!("✅ [FEED] {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

#[async_trait]
impl FeedSource for PowerAlertClient {
    async fn fetch_forecast_feed(&self) -> GridResult<String> {
        self.get_text(&self.forecast_url).await
    }

    async fn fetch_current_status_feed(&self) -> GridResult<String> {
        self.get_text(&self.current_status_url).await
    }

    async fn health_check(&self) -> GridResult<bool> {
        Ok(self.get_text(&self.forecast_url).await.is_ok())
    }

    fn name(&self) -> &str {
        "PowerAlert"
    }
}

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

//! Refresh controller: fetch, normalize, commit a snapshot, detect changes.
//!
//! A cycle either commits a complete new snapshot or leaves the previous one untouched.
//! Only one cycle runs at a time; a cycle that finds another in flight is skipped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gridpulse_types::{GridError, Settings, StatusSnapshot, ValidationResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::capabilities::CapabilityValues;
use crate::metrics::build_snapshot;
use crate::persistence::TrackerStore;
use crate::query::GridQueryService;
use crate::scheduler::RefreshTarget;
use crate::tracker::{ChangeTracker, Observation, TrackerState};
use crate::traits::{CapabilityPublisher, ChangeNotifier, FeedSource, fetch_forecast};

pub const DEFAULT_STARTUP_ATTEMPTS: u32 = 3;
pub const DEFAULT_STARTUP_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum MonitorError {
    /// Every startup attempt failed; the monitor is unusable
    #[error("Startup failed after {attempts} attempt(s): {last}")]
    StartupExhausted { attempts: u32, last: GridError },

    /// A startup attempt failed with an error retrying cannot fix
    #[error("Startup aborted on attempt {attempt}: {error}")]
    StartupAborted { attempt: u32, error: GridError },
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    pub startup_attempts: u32,
    pub startup_retry_delay: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            startup_attempts: DEFAULT_STARTUP_ATTEMPTS,
            startup_retry_delay: DEFAULT_STARTUP_RETRY_DELAY,
        }
    }
}

/// What a committed cycle produced
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: Arc<StatusSnapshot>,
    pub observation: Observation,
}

#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Committed(CycleReport),
    /// Another cycle was in flight
    Skipped,
    /// Abandoned; the previous snapshot stays authoritative
    Failed(GridError),
}

pub struct GridMonitor {
    source: Arc<dyn FeedSource>,
    notifiers: Vec<Arc<dyn ChangeNotifier>>,
    publisher: Option<Arc<dyn CapabilityPublisher>>,
    store: Option<TrackerStore>,
    options: MonitorOptions,

    snapshot: RwLock<Option<Arc<StatusSnapshot>>>,
    settings: Arc<RwLock<Settings>>,
    /// Held for the whole cycle
    tracker: Mutex<ChangeTracker>,
}

impl fmt::Debug for GridMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridMonitor")
            .field("source", &self.source.name())
            .field("notifiers", &self.notifiers.len())
            .field("publisher", &self.publisher.as_ref().map(|p| p.name()))
            .field("store", &self.store)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl GridMonitor {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self {
            source,
            notifiers: Vec::new(),
            publisher: None,
            store: None,
            options: MonitorOptions::default(),
            snapshot: RwLock::new(None),
            settings: Arc::new(RwLock::new(Settings::default())),
            tracker: Mutex::new(ChangeTracker::new()),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn ChangeNotifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn CapabilityPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: MonitorOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_settings(self, settings: Settings) -> Self {
        self.apply_settings(settings);
        self
    }

    /// Persist tracker state in `store`, resuming from what it holds
    ///
    /// An unreadable state file is logged and replaced by fresh state.
    #[must_use]
    pub fn with_store(mut self, store: TrackerStore) -> Self {
        let state = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load tracker state, starting fresh");
            TrackerState::default()
        });
        self.tracker = Mutex::new(ChangeTracker::with_state(state));
        self.store = Some(store);
        self
    }

    /// Last committed snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<StatusSnapshot>> {
        self.snapshot.read().clone()
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Query service sharing this monitor's feed source and live settings
    #[must_use]
    pub fn query_service(&self) -> GridQueryService {
        GridQueryService::new(Arc::clone(&self.source)).with_shared_settings(Arc::clone(
            &self.settings,
        ))
    }

    /// Sanitize and swap in new settings; invalid fields fall back to defaults
    pub fn apply_settings(&self, settings: Settings) -> ValidationResult {
        let (sanitized, result) = settings.sanitized();
        for issue in &result.warnings {
            warn!("{}, using default", GridError::from(issue));
        }
        *self.settings.write() = sanitized;
        info!(
            "⚙️  Settings applied ({} field(s) defaulted)",
            result.warnings.len()
        );
        result
    }

    /// Run initial refreshes until one commits
    ///
    /// Retries with a fixed delay; exhausting the attempts is fatal.
    pub async fn initialize(&self) -> Result<Arc<StatusSnapshot>, MonitorError> {
        let attempts = self.options.startup_attempts.max(1);
        let mut last = GridError::EmptyData("No startup attempt completed".to_owned());

        match self.source.health_check().await {
            Ok(true) => debug!("{} feed reachable", self.source.name()),
            Ok(false) => warn!(
                "{} feed unreachable, attempting startup anyway",
                self.source.name()
            ),
            Err(e) => warn!(error = %e, "{} health check failed", self.source.name()),
        }

        for attempt in 1..=attempts {
            info!(
                "🚀 Initial refresh from {} (attempt {}/{})",
                self.source.name(),
                attempt,
                attempts
            );
            match self.refresh().await {
                CycleOutcome::Committed(report) => return Ok(report.snapshot),
                CycleOutcome::Failed(e) if e.is_cycle_abort() => last = e,
                CycleOutcome::Failed(e) => {
                    error!(error = %e, "❌ Startup aborted, error is not retryable");
                    return Err(MonitorError::StartupAborted {
                        attempt,
                        error: e,
                    });
                }
                CycleOutcome::Skipped => {}
            }
            if attempt < attempts {
                warn!(
                    "Initial refresh failed, retrying in {}s",
                    self.options.startup_retry_delay.as_secs()
                );
                tokio::time::sleep(self.options.startup_retry_delay).await;
            }
        }

        error!(error = %last, "❌ Startup failed after {} attempt(s)", attempts);
        Err(MonitorError::StartupExhausted { attempts, last })
    }

    pub async fn refresh(&self) -> CycleOutcome {
        self.refresh_at(Utc::now()).await
    }

    /// One refresh cycle as of `now`
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> CycleOutcome {
        let Ok(mut tracker) = self.tracker.try_lock() else {
            debug!("Refresh cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        };

        let snapshot = match fetch_forecast(self.source.as_ref())
            .await
            .and_then(|points| build_snapshot(&points, now))
        {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                error!(error = %e, source = self.source.name(), "Refresh cycle failed");
                return CycleOutcome::Failed(e);
            }
        };

        *self.snapshot.write() = Some(Arc::clone(&snapshot));
        info!(
            "✅ Grid status {} ({}), margin {:.0} MW, utilization {:.1}%",
            snapshot.color,
            snapshot.direction,
            snapshot.derived_current.margin_mw,
            snapshot.derived_current.utilization_pct
        );

        let settings = self.settings();
        let observation = tracker.observe(&snapshot, &settings, now);

        if let Some(store) = &self.store
            && let Err(e) = store.save(tracker.state())
        {
            warn!(error = %e, "Failed to persist tracker state");
        }

        self.deliver(&observation).await;
        self.publish(&snapshot).await;

        CycleOutcome::Committed(CycleReport {
            snapshot,
            observation,
        })
    }

    async fn deliver(&self, observation: &Observation) {
        for notifier in &self.notifiers {
            if let Some(event) = &observation.change
                && let Err(e) = notifier.notify_change(event).await
            {
                warn!(error = %e, notifier = notifier.name(), "Failed to deliver change event");
            }
            for crossing in &observation.crossings {
                if let Err(e) = notifier.notify_threshold(crossing).await {
                    warn!(error = %e, notifier = notifier.name(), "Failed to deliver threshold crossing");
                }
            }
        }
    }

    async fn publish(&self, snapshot: &StatusSnapshot) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        let values = CapabilityValues::from_snapshot(snapshot);
        if let Err(e) = publisher.publish(&values).await {
            warn!(error = %e, publisher = publisher.name(), "Failed to publish capabilities");
        }
    }
}

#[async_trait]
impl RefreshTarget for GridMonitor {
    async fn run_cycle(&self) {
        let _ = self.refresh().await;
    }
}

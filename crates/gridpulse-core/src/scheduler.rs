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

//! Cancelable periodic scheduling of refresh cycles.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Something that runs one refresh cycle per tick
#[async_trait]
pub trait RefreshTarget: Send + Sync + 'static {
    async fn run_cycle(&self);
}

/// Opaque identifier of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    /// Handle for a scheduler-assigned id
    #[must_use]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait RefreshScheduler: Send + Sync {
    /// Start a periodic timer; the first cycle runs one `interval` from now
    fn schedule(&self, interval: Duration) -> ScheduleHandle;

    /// Stop a timer, returning whether it was still active
    ///
    /// A cycle already in flight runs to completion.
    fn cancel(&self, handle: ScheduleHandle) -> bool;

    /// Replace a timer with one at a new interval
    fn reschedule(&self, handle: ScheduleHandle, interval: Duration) -> ScheduleHandle {
        self.cancel(handle);
        self.schedule(interval)
    }
}

struct ActiveTimer {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Scheduler backed by tokio intervals, one task per timer
///
/// Ticks of one timer never overlap: each cycle is awaited before the next tick, and
/// missed ticks are skipped. Must be used from within a tokio runtime.
pub struct TokioRefreshScheduler<T: RefreshTarget> {
    target: Arc<T>,
    timers: Mutex<HashMap<ScheduleHandle, ActiveTimer>>,
    next_id: AtomicU64,
}

impl<T: RefreshTarget> fmt::Debug for TokioRefreshScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioRefreshScheduler")
            .field("active", &self.active_count())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T: RefreshTarget> TokioRefreshScheduler<T> {
    pub fn new(target: Arc<T>) -> Self {
        Self {
            target,
            timers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.timers.lock().len()
    }

    /// Cancel every timer
    pub fn shutdown(&self) {
        let timers: Vec<_> = self.timers.lock().drain().collect();
        for (_, timer) in timers {
            let _ = timer.cancel_tx.send(true);
        }
        debug!("Refresh scheduler shut down");
    }
}

impl<T: RefreshTarget> RefreshScheduler for TokioRefreshScheduler<T> {
    fn schedule(&self, interval: Duration) -> ScheduleHandle {
        let handle = ScheduleHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let target = Arc::clone(&self.target);

        let task = tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => target.run_cycle().await,
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("Refresh timer {} stopped", handle.0);
        });

        info!(
            "⏱️  Refresh timer {} scheduled every {}s",
            handle.0,
            interval.as_secs()
        );
        self.timers
            .lock()
            .insert(handle, ActiveTimer { cancel_tx, task });
        handle
    }

    fn cancel(&self, handle: ScheduleHandle) -> bool {
        let Some(timer) = self.timers.lock().remove(&handle) else {
            return false;
        };
        if timer.cancel_tx.send(true).is_err() {
            // Task already gone
            timer.task.abort();
        }
        debug!("Refresh timer {} cancelled", handle.0);
        true
    }
}

impl<T: RefreshTarget> Drop for TokioRefreshScheduler<T> {
    fn drop(&mut self) {
        for (_, timer) in self.timers.get_mut().drain() {
            timer.task.abort();
        }
    }
}

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

//! Outside-world adapters: the PowerAlert HTTP feed, change notifiers and capability
//! publishers.

pub mod notifiers;
pub mod poweralert;
pub mod publisher;

pub use notifiers::{TracingNotifier, WebhookNotifier};
pub use poweralert::{
    DEFAULT_CURRENT_STATUS_URL, DEFAULT_FORECAST_URL, DEFAULT_TIMEOUT, PowerAlertClient,
};
pub use publisher::{JsonFilePublisher, LoggingCapabilityPublisher};

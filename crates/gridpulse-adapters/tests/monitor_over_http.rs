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

//! Refresh cycles against a mock PowerAlert server with a webhook receiver.

use chrono::{TimeZone, Utc};
use gridpulse_adapters::{PowerAlertClient, WebhookNotifier};
use gridpulse_core::{CycleOutcome, GridMonitor};
use gridpulse_types::GridColor;
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn chart(color: &str, load: u32) -> String {
    let records: Vec<String> = (16..22)
        .map(|hour| {
            format!(
                r#"{{"Timestamp":"2025-06-03T{hour:02}:00:00","Color":"{color}","Direction":"Up","LoadForecast":{load},"DeclaredAvailabilty":29000,"MaxAvailability":31000}}"#
            )
        })
        .collect();
    format!("createChart([{}]);", records.join(","))
}

#[tokio::test]
async fn test_color_change_reaches_webhook() {
    let mut server = Server::new_async().await;
    let green = server
        .mock("GET", "/forecast")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(chart("Green", 25_000))
        .expect(1)
        .create_async()
        .await;

    let client = PowerAlertClient::new(
        format!("{}/forecast?callback=createChart", server.url()),
        format!("{}/current", server.url()),
        Duration::from_secs(5),
    )
    .unwrap();
    let notifier = WebhookNotifier::new(format!("{}/hook", server.url())).unwrap();
    let monitor = GridMonitor::new(Arc::new(client)).with_notifier(Arc::new(notifier));

    // 16:00 UTC is 18:00 in Johannesburg
    let now = Utc.with_ymd_and_hms(2025, 6, 3, 16, 0, 0).unwrap();
    assert!(matches!(
        monitor.refresh_at(now).await,
        CycleOutcome::Committed(_)
    ));
    green.assert_async().await;
    green.remove_async().await;

    let _red = server
        .mock("GET", "/forecast")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(chart("Red", 29_500))
        .create_async()
        .await;
    let status_hook = server
        .mock("POST", "/hook")
        .match_body(Matcher::PartialJson(json!({
            "event": "grid_status_changed",
            "previous_color": "Green",
            "new_color": "Red"
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let threshold_hook = server
        .mock("POST", "/hook")
        .match_body(Matcher::PartialJson(json!({ "event": "threshold_crossed" })))
        .with_status(200)
        .expect_at_least(1)
        .create_async()
        .await;

    let outcome = monitor
        .refresh_at(now + chrono::Duration::minutes(10))
        .await;
    let CycleOutcome::Committed(report) = outcome else {
        panic!("second cycle should commit");
    };
    assert_eq!(report.snapshot.color, GridColor::Red);

    status_hook.assert_async().await;
    threshold_hook.assert_async().await;
}

#[tokio::test]
async fn test_server_error_keeps_previous_snapshot() {
    let mut server = Server::new_async().await;
    let ok = server
        .mock("GET", "/forecast")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(chart("Orange", 27_000))
        .create_async()
        .await;

    let client = PowerAlertClient::new(
        format!("{}/forecast", server.url()),
        format!("{}/current", server.url()),
        Duration::from_secs(5),
    )
    .unwrap();
    let monitor = GridMonitor::new(Arc::new(client));
    let now = Utc.with_ymd_and_hms(2025, 6, 3, 16, 0, 0).unwrap();
    monitor.refresh_at(now).await;
    let before = monitor.snapshot().unwrap();
    ok.remove_async().await;

    let _down = server
        .mock("GET", "/forecast")
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;
    assert!(matches!(
        monitor.refresh_at(now + chrono::Duration::minutes(10)).await,
        CycleOutcome::Failed(_)
    ));
    assert!(Arc::ptr_eq(&before, &monitor.snapshot().unwrap()));
    assert_eq!(before.color, GridColor::Orange);
}

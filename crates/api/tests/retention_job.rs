//! Reading retention job against a real database.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use museum_api::background::reading_retention::{self, PurgeError};
use museum_core::anomaly::evaluate;
use museum_core::sensor::SensorReading;
use museum_core::thresholds::DEFAULT_THRESHOLDS;
use museum_db::models::sensor_reading::CreateSensorReading;
use museum_db::repositories::SensorReadingRepo;
use serde_json::json;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

async fn store(pool: &SqlitePool, exhibit_id: i64, hours_ago: i64) {
    let taken_at = Utc::now() - chrono::Duration::hours(hours_ago);
    let reading = SensorReading::at(21.0, 50.0, 0.1, taken_at);
    let verdict = evaluate(&reading, &DEFAULT_THRESHOLDS);
    let row = CreateSensorReading::from_evaluation(exhibit_id, &reading, &verdict, "mock");
    SensorReadingRepo::insert(pool, &row).await.unwrap();
}

#[sqlx::test(migrations = "../db/migrations")]
async fn purge_keeps_readings_inside_window(pool: SqlitePool) {
    let id = common::create_exhibit(&pool, json!({"name": "Print Room"})).await;
    store(&pool, id, 200).await;
    store(&pool, id, 170).await;
    store(&pool, id, 2).await;

    let deleted = reading_retention::purge_once(&pool, 168).await.unwrap();
    assert_eq!(deleted, 2);

    let left = SensorReadingRepo::list_for_exhibit(&pool, id, None).await.unwrap();
    assert_eq!(left.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn oversized_window_is_an_error_not_a_panic(pool: SqlitePool) {
    let id = common::create_exhibit(&pool, json!({"name": "Print Room"})).await;
    store(&pool, id, 2).await;

    let result = reading_retention::purge_once(&pool, 3_000_000_000).await;
    assert_matches!(result, Err(PurgeError::WindowOutOfRange(3_000_000_000)));

    let result = reading_retention::purge_once(&pool, i64::MIN).await;
    assert_matches!(result, Err(PurgeError::WindowOutOfRange(_)));

    let left = SensorReadingRepo::list_for_exhibit(&pool, id, None).await.unwrap();
    assert_eq!(left.len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn job_purges_on_start_and_stops_on_cancel(pool: SqlitePool) {
    let id = common::create_exhibit(&pool, json!({"name": "Print Room"})).await;
    store(&pool, id, 48).await;

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(reading_retention::run(pool.clone(), 24, cancel.clone()));

    // The first tick fires immediately.
    let mut purged = false;
    for _ in 0..50 {
        let latest = SensorReadingRepo::latest_for_exhibit(&pool, id).await.unwrap();
        if latest.is_none() {
            purged = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(purged, "old reading should be purged on start-up");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("job stops after cancel")
        .unwrap();
}

//! HTTP-level tests for live monitoring and the background poll.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, create_exhibit, get, test_config, test_state};
use museum_api::background::monitor_poll::poll_once;
use museum_db::repositories::SensorReadingRepo;
use serde_json::json;
use sqlx::SqlitePool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[sqlx::test(migrations = "../db/migrations")]
async fn monitor_returns_sample_and_persists_it(pool: SqlitePool) {
    let id = create_exhibit(&pool, json!({"name": "Live"})).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/exhibits/{id}/monitor"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["exhibit_id"], id);
    assert_eq!(data["sensor_data"]["data_source"], "mock");
    assert_eq!(data["sensor_data"]["is_real_data"], false);
    assert!(data["sensor_data"]["temperature"].is_number());
    assert!(data["anomaly_status"]["explanation"].is_string());
    assert!(data["anomaly_status"]["anomaly_score"].as_f64().unwrap() <= 1.0);
    assert_eq!(data["thresholds"]["vibration"]["min"], 0.0);
    assert_eq!(data["camera_available"], false);

    let stored = SensorReadingRepo::list_for_exhibit(&pool, id, None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].is_anomaly, data["anomaly_status"]["is_anomaly"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn monitor_unknown_exhibit_returns_404(pool: SqlitePool) {
    let response = get(common::build_test_app(pool), "/api/v1/exhibits/4242/monitor").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn real_exhibit_reads_board_and_falls_back(pool: SqlitePool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sensors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "temperature": 30.0, "humidity": 50.0, "vibration_value": 0.1
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let address = server.address();
    let mut config = test_config();
    config.esp32.mock_sensors = false;
    config.esp32.ip = address.ip().to_string();
    config.esp32.port = address.port();

    let id = create_exhibit(&pool, json!({"name": "ESP32 Real Sensors"})).await;
    assert_eq!(id, config.esp32.real_data_exhibit_id);
    let state = test_state(pool.clone(), config);

    let response = get(
        common::build_app_with(state.clone()),
        &format!("/api/v1/exhibits/{id}/monitor"),
    )
    .await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["sensor_data"]["data_source"], "esp32");
    assert_eq!(data["sensor_data"]["is_real_data"], true);
    assert_eq!(data["sensor_data"]["temperature"], 30.0);
    assert_eq!(data["anomaly_status"]["anomalies"], json!(["temperature_high"]));
    assert_eq!(
        data["anomaly_status"]["explanation"],
        "Temperature (30.0°C) is above safe levels."
    );

    // The mock responds only once; the next read fails and falls back.
    let response = get(
        common::build_app_with(state),
        &format!("/api/v1/exhibits/{id}/monitor"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["sensor_data"]["data_source"], "mock_fallback");
    assert_eq!(data["sensor_data"]["is_real_data"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn poll_samples_every_exhibit(pool: SqlitePool) {
    museum_db::seed_sample_exhibits(&pool).await.unwrap();
    let state = test_state(pool.clone(), test_config());

    let stored = poll_once(&pool, &state.monitor).await;
    assert_eq!(stored, 4);

    for id in 1..=4 {
        let rows = SensorReadingRepo::list_for_exhibit(&pool, id, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1, "exhibit {id} sampled once");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn poll_job_stops_on_cancel(pool: SqlitePool) {
    let state = test_state(pool.clone(), test_config());
    let cancel = state.shutdown.clone();

    let handle = tokio::spawn(museum_api::background::monitor_poll::run(
        pool,
        state.monitor.clone(),
        Duration::from_millis(10),
        cancel.clone(),
    ));
    tokio::time::sleep(Duration::from_millis(30)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("job stops promptly")
        .unwrap();
}

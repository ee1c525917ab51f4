//! HTTP-level tests for camera snapshots, streams and frame analysis.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_bytes, body_json, get, post_empty, test_config, test_state};
use http_body_util::BodyExt;
use museum_devices::camera::FrameSource;
use museum_devices::DeviceError;
use serde_json::json;
use sqlx::SqlitePool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIVE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01, 0xFF, 0xD9];

struct StillCamera;

#[async_trait]
impl FrameSource for StillCamera {
    async fn capture(&self) -> Result<Vec<u8>, DeviceError> {
        Ok(LIVE_JPEG.to_vec())
    }
}

fn frame_source(response: &axum::http::Response<axum::body::Body>) -> String {
    response.headers()["x-frame-source"]
        .to_str()
        .unwrap()
        .to_string()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn snapshot_placeholders(pool: SqlitePool) {
    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/camera/snapshot/2",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(frame_source(&response), "mock-camera");
    assert!(body_bytes(response).await.starts_with(&[0xFF, 0xD8]));

    let response = get(common::build_test_app(pool), "/api/v1/camera/snapshot/1").await;
    assert_eq!(frame_source(&response), "camera-offline");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn snapshot_serves_live_frame(pool: SqlitePool) {
    let mut state = test_state(pool, test_config());
    state.camera = Some(Arc::new(StillCamera) as Arc<dyn FrameSource>);

    // Camera configured but nothing captured yet.
    let response = get(
        common::build_app_with(state.clone()),
        "/api/v1/camera/snapshot/1",
    )
    .await;
    assert_eq!(frame_source(&response), "no-signal");

    state.frames.store(LIVE_JPEG.to_vec()).await;
    let response = get(common::build_app_with(state), "/api/v1/camera/snapshot/1").await;
    assert_eq!(frame_source(&response), "live");
    assert_eq!(body_bytes(response).await, LIVE_JPEG);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stream_emits_multipart_parts(pool: SqlitePool) {
    let state = test_state(pool, test_config());
    let response = get(
        common::build_app_with(state.clone()),
        "/api/v1/camera/stream/3",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "multipart/x-mixed-replace; boundary=frame"
    );

    let mut body = response.into_body();
    let first = body
        .frame()
        .await
        .expect("stream yields a part")
        .unwrap()
        .into_data()
        .unwrap();
    let text = String::from_utf8_lossy(&first);
    assert!(text.starts_with("--frame\r\n"));
    assert!(text.contains("x-frame-source: mock-camera"));

    // Shutdown ends the stream.
    state.shutdown.cancel();
    assert!(body.frame().await.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn analyze_requires_detector(pool: SqlitePool) {
    let response = post_empty(common::build_test_app(pool), "/api/v1/camera/analyze/1").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "SERVICE_UNAVAILABLE");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn analyze_flags_person_in_live_frame(pool: SqlitePool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "detections": [
                {"label": "person", "confidence": 0.91, "bbox": [10.0, 20.0, 110.0, 220.0]},
                {"label": "chair", "confidence": 0.75, "bbox": [0.0, 0.0, 50.0, 50.0]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.assistant.detector_url = Some(format!("{}/detect", server.uri()));
    let mut state = test_state(pool, config);
    state.camera = Some(Arc::new(StillCamera) as Arc<dyn FrameSource>);

    // No frame yet.
    let response = post_empty(
        common::build_app_with(state.clone()),
        "/api/v1/camera/analyze/1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Other exhibits have no camera at all.
    state.frames.store(LIVE_JPEG.to_vec()).await;
    let response = post_empty(
        common::build_app_with(state.clone()),
        "/api/v1/camera/analyze/2",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = post_empty(common::build_app_with(state), "/api/v1/camera/analyze/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["exhibit_id"], 1);
    assert_eq!(data["is_anomaly"], true);
    assert_eq!(data["flagged"].as_array().unwrap().len(), 1);
    assert_eq!(data["flagged"][0]["label"], "person");
    assert_eq!(data["detections"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn analyze_reports_detector_failure(pool: SqlitePool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.assistant.detector_url = Some(server.uri());
    let mut state = test_state(pool, config);
    state.camera = Some(Arc::new(StillCamera) as Arc<dyn FrameSource>);
    state.frames.store(LIVE_JPEG.to_vec()).await;

    let response = post_empty(common::build_app_with(state), "/api/v1/camera/analyze/1").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

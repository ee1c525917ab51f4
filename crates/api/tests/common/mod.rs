#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use museum_api::config::{AssistantConfig, CameraConfig, Esp32Config, JobsConfig, ServerConfig};
use museum_api::router::build_app_router;
use museum_api::state::AppState;

/// Test configuration: mock sensors, no camera, no LLM, no detector.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        seed_sample_exhibits: false,
        esp32: Esp32Config {
            mock_sensors: true,
            ip: "127.0.0.1".to_string(),
            port: 80,
            timeout_secs: 1,
            real_data_exhibit_id: 1,
        },
        camera: CameraConfig {
            snapshot_url: None,
            fps: 15,
        },
        assistant: AssistantConfig {
            openai_api_key: None,
            llm_endpoint: "http://127.0.0.1:9/v1".to_string(),
            llm_model: "test-model".to_string(),
            llm_timeout_secs: 2,
            detector_url: None,
            detector_min_confidence: 0.5,
            detector_alert_labels: vec!["person".to_string()],
        },
        jobs: JobsConfig {
            monitor_poll_interval_secs: 0,
            reading_retention_hours: 0,
        },
    }
}

pub fn test_state(pool: SqlitePool, config: ServerConfig) -> AppState {
    AppState::from_config(pool, config).expect("state builds")
}

/// Full router with the production middleware stack and default test config.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_app_with(test_state(pool, test_config()))
}

pub fn build_app_with(state: AppState) -> Router {
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Create an exhibit through the API and return its id.
pub async fn create_exhibit(pool: &SqlitePool, body: serde_json::Value) -> i64 {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/exhibits", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

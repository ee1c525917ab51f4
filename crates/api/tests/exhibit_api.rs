//! HTTP-level integration tests for exhibit CRUD and reading history.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_exhibit, delete, get, post_json, put_json};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_returns_201_with_default_thresholds(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/exhibits",
        json!({"name": "Tapestries", "location": "Gallery Z"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["name"], "Tapestries");
    assert_eq!(data["temperature_min"], 18.0);
    assert_eq!(data["temperature_max"], 24.0);
    assert_eq!(data["humidity_min"], 40.0);
    assert_eq!(data["humidity_max"], 60.0);
    assert_eq!(data["vibration_max"], 0.5);
    assert!(data["id"].is_number());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_rejects_blank_name_and_inverted_band(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/exhibits",
        json!({"name": "   "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/exhibits",
        json!({"name": "Bad", "temperature_min": 30.0, "temperature_max": 20.0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_and_list(pool: SqlitePool) {
    let id = create_exhibit(&pool, json!({"name": "Get Me"})).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/exhibits/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Get Me");

    let response = get(common::build_test_app(pool), "/api/v1/exhibits").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_unknown_exhibit_returns_404(pool: SqlitePool) {
    let response = get(common::build_test_app(pool), "/api/v1/exhibits/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_validates_against_merged_record(pool: SqlitePool) {
    let id = create_exhibit(&pool, json!({"name": "Ceramics"})).await;
    let uri = format!("/api/v1/exhibits/{id}");

    // Stored temperature_min is 18; a lone max below it must be rejected.
    let response = put_json(
        common::build_test_app(pool.clone()),
        &uri,
        json!({"temperature_max": 10.0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json(
        common::build_test_app(pool.clone()),
        &uri,
        json!({"temperature_max": 21.0, "description": "Stoneware"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["temperature_max"], 21.0);
    assert_eq!(json["data"]["temperature_min"], 18.0);
    assert_eq!(json["data"]["description"], "Stoneware");
    assert_eq!(json["data"]["name"], "Ceramics");

    let response = put_json(
        common::build_test_app(pool),
        "/api/v1/exhibits/4242",
        json!({"name": "Ghost"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_returns_204_then_404(pool: SqlitePool) {
    let id = create_exhibit(&pool, json!({"name": "Temporary"})).await;
    let uri = format!("/api/v1/exhibits/{id}");

    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn readings_history_follows_monitor_calls(pool: SqlitePool) {
    let id = create_exhibit(&pool, json!({"name": "History"})).await;

    for _ in 0..3 {
        let response = get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/exhibits/{id}/monitor"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/exhibits/{id}/readings?limit=2"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let readings = json["data"].as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["exhibit_id"], id);
    assert_eq!(readings[0]["data_source"], "mock");

    let response = get(
        common::build_test_app(pool),
        "/api/v1/exhibits/777/readings",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

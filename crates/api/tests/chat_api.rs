//! HTTP-level tests for the assistant endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_exhibit, get, post_json, test_config, test_state};
use serde_json::json;
use sqlx::SqlitePool;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[sqlx::test(migrations = "../db/migrations")]
async fn keyword_reply_without_llm(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/chat",
        json!({"message": "What humidity is safe?"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["source"], "fallback");
    assert_eq!(
        data["response"],
        "Museum humidity should be maintained between 40-60% RH."
    );
    assert!(data["timestamp"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn empty_message_is_rejected(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/chat",
        json!({"message": "   "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn llm_reply_is_grounded_in_exhibit(pool: SqlitePool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Archive Room"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Conditions look stable."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = create_exhibit(&pool, json!({"name": "Archive Room"})).await;
    // Give the exhibit a stored reading to ground the prompt.
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/exhibits/{id}/monitor"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut config = test_config();
    config.assistant.openai_api_key = Some("sk-test".into());
    config.assistant.llm_endpoint = format!("{}/v1", server.uri());
    let app = common::build_app_with(test_state(pool, config));

    let response = post_json(
        app,
        "/api/v1/chat",
        json!({"message": "Is the room okay?", "exhibit_id": id}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["source"], "llm");
    assert_eq!(data["response"], "Conditions look stable.");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn llm_failure_degrades_to_keywords(pool: SqlitePool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.assistant.openai_api_key = Some("sk-test".into());
    config.assistant.llm_endpoint = server.uri();
    let app = common::build_app_with(test_state(pool, config));

    let response = post_json(
        app,
        "/api/v1/chat",
        json!({"message": "the floor started to shake"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["source"], "fallback");
    assert!(data["response"].as_str().unwrap().starts_with("Vibrations"));
}

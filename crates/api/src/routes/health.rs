use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// `SELECT 1` succeeded.
    pub db_healthy: bool,
    /// True when no ESP32 board is configured.
    pub mock_mode: bool,
    /// Whether the last board read succeeded.
    pub esp32_connected: bool,
    /// Whether a live camera frame is available.
    pub camera_available: bool,
    pub assistant_configured: bool,
    pub detector_configured: bool,
    /// Board address, `null` in mock mode.
    pub esp32_address: Option<String>,
}

/// GET /health -- returns service, database and device health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = museum_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    let esp32_connected = match &state.esp32 {
        Some(client) => client.status().await.connected,
        None => false,
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        mock_mode: state.monitor.sensors().is_mock_mode(),
        esp32_connected,
        camera_available: state.camera_available().await,
        assistant_configured: state.chat.is_some(),
        detector_configured: state.detector.is_some(),
        esp32_address: state.esp32.as_ref().map(|c| c.base_url().to_string()),
    })
}

/// `GET /health`, mounted outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

//! ESP32 board diagnostics.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use museum_core::types::Timestamp;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Esp32StatusResponse {
    /// Board base URL, `null` in mock mode.
    pub address: Option<String>,
    pub mock_mode: bool,
    pub connected: bool,
    pub last_successful_read: Option<Timestamp>,
    pub connection_errors: u32,
}

/// GET /api/v1/esp32/status
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let data = match &state.esp32 {
        Some(client) => {
            let status = client.status().await;
            Esp32StatusResponse {
                address: Some(status.address),
                mock_mode: false,
                connected: status.connected,
                last_successful_read: status.last_successful_read,
                connection_errors: status.connection_errors,
            }
        }
        None => Esp32StatusResponse {
            address: None,
            mock_mode: true,
            connected: false,
            last_successful_read: None,
            connection_errors: 0,
        },
    };
    Json(DataResponse { data })
}

/// GET /api/v1/esp32/raw
///
/// Pass the board's full `/json` document through unchanged.
pub async fn raw_data(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let client = state.esp32.as_ref().ok_or_else(|| {
        AppError::BadRequest("ESP32 access is disabled while MOCK_SENSORS is on".into())
    })?;

    let document = client.get_full_data().await.map_err(|e| {
        tracing::error!(error = %e, "Error reading ESP32 full data");
        AppError::Upstream(format!("ESP32 did not respond: {e}"))
    })?;

    Ok(Json(DataResponse { data: document }))
}

use axum::routing::get;
use axum::Router;

use crate::handlers::esp32;
use crate::state::AppState;

/// ESP32 routes mounted at `/esp32`.
///
/// ```text
/// GET /status   -> status
/// GET /raw      -> raw_data
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(esp32::status))
        .route("/raw", get(esp32::raw_data))
}

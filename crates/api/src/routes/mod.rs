pub mod anomaly;
pub mod camera;
pub mod chat;
pub mod esp32;
pub mod exhibits;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /exhibits                              list, create
/// /exhibits/{id}                         get, update, delete
/// /exhibits/{id}/monitor                 live sample (GET)
/// /exhibits/{id}/readings                stored history (GET)
///
/// /anomaly/detect                        evaluate a reading (POST)
/// /anomaly/thresholds/default            default thresholds (GET)
///
/// /chat                                  assistant reply (POST)
///
/// /camera/stream/{exhibit_id}            MJPEG stream (GET)
/// /camera/snapshot/{exhibit_id}          single JPEG (GET)
/// /camera/analyze/{exhibit_id}           object detection (POST)
///
/// /esp32/status                          board connection status (GET)
/// /esp32/raw                             board diagnostic document (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/exhibits", exhibits::router())
        .nest("/anomaly", anomaly::router())
        .merge(chat::router())
        .nest("/camera", camera::router())
        .nest("/esp32", esp32::router())
}

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::camera;
use crate::state::AppState;

/// Camera routes mounted at `/camera`.
///
/// ```text
/// GET  /stream/{exhibit_id}     -> stream (multipart/x-mixed-replace)
/// GET  /snapshot/{exhibit_id}   -> snapshot (image/jpeg)
/// POST /analyze/{exhibit_id}    -> analyze
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stream/{exhibit_id}", get(camera::stream))
        .route("/snapshot/{exhibit_id}", get(camera::snapshot))
        .route("/analyze/{exhibit_id}", post(camera::analyze))
}

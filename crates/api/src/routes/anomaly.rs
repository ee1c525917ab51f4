use axum::routing::{get, post};
use axum::Router;

use crate::handlers::anomaly;
use crate::state::AppState;

/// Anomaly routes mounted at `/anomaly`.
///
/// ```text
/// POST /detect                -> detect_anomaly
/// GET  /thresholds/default    -> default_thresholds
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/detect", post(anomaly::detect_anomaly))
        .route("/thresholds/default", get(anomaly::default_thresholds))
}

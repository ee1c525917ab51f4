use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use museum_core::types::DbId;

use super::require_exhibit;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/exhibits/{id}/monitor
///
/// Take a fresh reading for the exhibit, evaluate it against the exhibit's
/// thresholds, store it and return the full picture.
pub async fn monitor_exhibit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let exhibit = require_exhibit(&state, id).await?;

    let mut sample = state.monitor.sample(&exhibit).await?;
    sample.camera_available = exhibit.id == state.config.esp32.real_data_exhibit_id
        && state.camera_available().await;

    Ok(Json(DataResponse { data: sample }))
}

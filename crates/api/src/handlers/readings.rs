use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use museum_core::types::DbId;
use museum_db::repositories::SensorReadingRepo;

use super::require_exhibit;
use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/exhibits/{id}/readings?limit=
///
/// Stored readings, newest first.
pub async fn list_readings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    require_exhibit(&state, id).await?;
    let readings = SensorReadingRepo::list_for_exhibit(&state.pool, id, params.limit).await?;
    Ok(Json(DataResponse { data: readings }))
}

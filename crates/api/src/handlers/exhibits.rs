//! Handlers for exhibit CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use museum_core::error::CoreError;
use museum_core::types::DbId;
use museum_db::models::exhibit::{CreateExhibit, UpdateExhibit};
use museum_db::repositories::ExhibitRepo;

use super::require_exhibit;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/exhibits
///
/// Newest first.
pub async fn list_exhibits(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let exhibits = ExhibitRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: exhibits }))
}

/// POST /api/v1/exhibits
///
/// Omitted thresholds take the defaults. Returns 201.
pub async fn create_exhibit(
    State(state): State<AppState>,
    Json(input): Json<CreateExhibit>,
) -> AppResult<impl IntoResponse> {
    validate_name(&input.name)?;
    input.thresholds().validate()?;

    let exhibit = ExhibitRepo::create(&state.pool, &input).await?;
    tracing::info!(exhibit_id = exhibit.id, name = %exhibit.name, "Exhibit created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: exhibit })))
}

/// GET /api/v1/exhibits/{id}
pub async fn get_exhibit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let exhibit = require_exhibit(&state, id).await?;
    Ok(Json(DataResponse { data: exhibit }))
}

/// PUT /api/v1/exhibits/{id}
///
/// Partial update. Threshold ordering is checked on the merged record so a
/// lone `temperature_max` below the stored minimum is rejected.
pub async fn update_exhibit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateExhibit>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }

    let current = require_exhibit(&state, id).await?;
    input.merged_thresholds(&current).validate()?;

    let exhibit = ExhibitRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Exhibit",
            id,
        }))?;

    tracing::info!(exhibit_id = id, "Exhibit updated");

    Ok(Json(DataResponse { data: exhibit }))
}

/// DELETE /api/v1/exhibits/{id}
///
/// Stored readings are removed with the exhibit.
pub async fn delete_exhibit(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = ExhibitRepo::delete(&state.pool, id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Exhibit",
            id,
        }));
    }

    tracing::info!(exhibit_id = id, "Exhibit deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Exhibit name must not be empty".into(),
        )));
    }
    Ok(())
}

//! Handlers for ad hoc anomaly evaluation.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use museum_core::anomaly::{evaluate, AnomalyTag};
use museum_core::explanation::explain_verdict;
use museum_core::sensor::SensorReading;
use museum_core::thresholds::{
    resolve_with_source, ThresholdSet, ThresholdSource, DEFAULT_THRESHOLDS,
};
use museum_core::types::{DbId, Timestamp};
use museum_db::repositories::ExhibitRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub sensor_data: SensorReading,
    pub exhibit_id: Option<DbId>,
    pub threshold_config: Option<ThresholdSet>,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub anomalies: Vec<AnomalyTag>,
    pub affected_sensors: Vec<String>,
    pub explanation: String,
    pub thresholds: ThresholdSet,
    pub threshold_source: ThresholdSource,
    pub timestamp: Timestamp,
}

/// POST /api/v1/anomaly/detect
///
/// Evaluate a caller-supplied reading. Thresholds come from the exhibit when
/// it exists, else from `threshold_config`, else the defaults. Nothing is
/// stored.
pub async fn detect_anomaly(
    State(state): State<AppState>,
    Json(input): Json<DetectRequest>,
) -> AppResult<impl IntoResponse> {
    let reading = input.sensor_data;
    reading.validate()?;
    if let Some(config) = &input.threshold_config {
        config.validate()?;
    }

    let exhibit_thresholds = match input.exhibit_id {
        Some(id) => ExhibitRepo::find_thresholds(&state.pool, id).await?,
        None => None,
    };
    let resolved = resolve_with_source(
        exhibit_thresholds,
        input.threshold_config,
        DEFAULT_THRESHOLDS,
    );

    let verdict = evaluate(&reading, &resolved.thresholds);
    let explanation = explain_verdict(&verdict, &reading);

    tracing::debug!(
        exhibit_id = ?input.exhibit_id,
        source = ?resolved.source,
        is_anomaly = verdict.is_anomaly,
        "Ad hoc anomaly evaluation"
    );

    Ok(Json(DataResponse {
        data: DetectResponse {
            is_anomaly: verdict.is_anomaly,
            anomaly_score: verdict.anomaly_score,
            anomalies: verdict.anomalies,
            affected_sensors: verdict.affected_sensors,
            explanation,
            thresholds: resolved.thresholds,
            threshold_source: resolved.source,
            timestamp: Utc::now(),
        },
    }))
}

/// GET /api/v1/anomaly/thresholds/default
pub async fn default_thresholds() -> impl IntoResponse {
    Json(DataResponse {
        data: DEFAULT_THRESHOLDS,
    })
}

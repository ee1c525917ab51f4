//! Stored sensor reading model and DTO.

use museum_core::anomaly::AnomalyVerdict;
use museum_core::sensor::SensorReading;
use museum_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `sensor_readings` table (append-only).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredReading {
    pub id: DbId,
    pub exhibit_id: DbId,
    pub temperature: f64,
    pub humidity: f64,
    pub vibration: f64,
    /// `esp32`, `mock` or `mock_fallback`.
    pub data_source: String,
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub anomalies: Json<Vec<String>>,
    pub recorded_at: Timestamp,
}

impl StoredReading {
    /// Rebuild the in-memory reading this row was created from.
    pub fn reading(&self) -> SensorReading {
        SensorReading::at(
            self.temperature,
            self.humidity,
            self.vibration,
            self.recorded_at,
        )
    }
}

/// DTO for inserting one evaluated reading.
#[derive(Debug, Clone)]
pub struct CreateSensorReading {
    pub exhibit_id: DbId,
    pub temperature: f64,
    pub humidity: f64,
    pub vibration: f64,
    pub data_source: String,
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub anomalies: Vec<String>,
    pub recorded_at: Timestamp,
}

impl CreateSensorReading {
    /// Build the insert DTO from a reading and the verdict computed for it.
    pub fn from_evaluation(
        exhibit_id: DbId,
        reading: &SensorReading,
        verdict: &AnomalyVerdict,
        data_source: &str,
    ) -> Self {
        Self {
            exhibit_id,
            temperature: reading.temperature,
            humidity: reading.humidity,
            vibration: reading.vibration,
            data_source: data_source.to_string(),
            is_anomaly: verdict.is_anomaly,
            anomaly_score: verdict.anomaly_score,
            anomalies: verdict.tag_names().into_iter().map(String::from).collect(),
            recorded_at: reading.timestamp,
        }
    }
}

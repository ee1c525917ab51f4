//! One monitoring step for an exhibit: acquire, evaluate, explain, persist.
//!
//! Shared by the `/exhibits/{id}/monitor` handler and the background poll job
//! so both produce identical rows.

use chrono::Utc;
use museum_assistant::llm::ExhibitSnapshot;
use museum_core::anomaly::{evaluate, AnomalyTag};
use museum_core::explanation::explain_verdict;
use museum_core::sensor::SensorReading;
use museum_core::thresholds::ThresholdSet;
use museum_core::types::{DbId, Timestamp};
use museum_db::models::exhibit::Exhibit;
use museum_db::models::sensor_reading::CreateSensorReading;
use museum_db::repositories::SensorReadingRepo;
use museum_db::DbPool;
use museum_devices::source::{DataSource, SensorHub};
use museum_devices::DeviceError;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<MonitorError> for AppError {
    fn from(err: MonitorError) -> Self {
        match err {
            MonitorError::Device(e) => AppError::Upstream(e.to_string()),
            MonitorError::Database(e) => AppError::Database(e),
        }
    }
}

/// A reading plus its provenance, as reported to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SensorDataView {
    #[serde(flatten)]
    pub reading: SensorReading,
    pub data_source: DataSource,
    pub is_real_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyStatus {
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub explanation: String,
    pub affected_sensors: Vec<String>,
    pub anomalies: Vec<AnomalyTag>,
}

/// Result of one monitoring step.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSample {
    pub exhibit_id: DbId,
    pub sensor_data: SensorDataView,
    pub anomaly_status: AnomalyStatus,
    pub thresholds: ThresholdSet,
    pub camera_available: bool,
    pub timestamp: Timestamp,
}

#[derive(Clone)]
pub struct Monitor {
    pool: DbPool,
    sensors: SensorHub,
}

impl Monitor {
    pub fn new(pool: DbPool, sensors: SensorHub) -> Self {
        Self { pool, sensors }
    }

    pub fn sensors(&self) -> &SensorHub {
        &self.sensors
    }

    /// Sample `exhibit` against its own thresholds and store the result.
    ///
    /// `camera_available` is left false; the caller knows about cameras.
    pub async fn sample(&self, exhibit: &Exhibit) -> Result<MonitorSample, MonitorError> {
        let acquired = self.sensors.acquire(exhibit.id).await?;
        let reading = acquired.reading;
        let thresholds = exhibit.thresholds();

        let verdict = evaluate(&reading, &thresholds);
        let explanation = explain_verdict(&verdict, &reading);

        let row = CreateSensorReading::from_evaluation(
            exhibit.id,
            &reading,
            &verdict,
            acquired.source.as_str(),
        );
        SensorReadingRepo::insert(&self.pool, &row).await?;

        if verdict.is_anomaly {
            tracing::warn!(
                exhibit_id = exhibit.id,
                score = verdict.anomaly_score,
                anomalies = ?verdict.tag_names(),
                source = acquired.source.as_str(),
                "Anomaly detected"
            );
        }

        Ok(MonitorSample {
            exhibit_id: exhibit.id,
            sensor_data: SensorDataView {
                reading,
                data_source: acquired.source,
                is_real_data: acquired.source.is_real(),
            },
            anomaly_status: AnomalyStatus {
                is_anomaly: verdict.is_anomaly,
                anomaly_score: verdict.anomaly_score,
                explanation,
                affected_sensors: verdict.affected_sensors,
                anomalies: verdict.anomalies,
            },
            thresholds,
            camera_available: false,
            timestamp: Utc::now(),
        })
    }

    /// Conditions for `exhibit` from its most recent stored reading,
    /// re-evaluated against its current thresholds. Nothing is written.
    pub async fn latest_snapshot(
        &self,
        exhibit: &Exhibit,
    ) -> Result<Option<ExhibitSnapshot>, MonitorError> {
        let Some(stored) = SensorReadingRepo::latest_for_exhibit(&self.pool, exhibit.id).await?
        else {
            return Ok(None);
        };

        let reading = stored.reading();
        let thresholds = exhibit.thresholds();
        let verdict = evaluate(&reading, &thresholds);
        let explanation = explain_verdict(&verdict, &reading);

        Ok(Some(ExhibitSnapshot {
            name: exhibit.name.clone(),
            reading,
            thresholds,
            verdict,
            explanation,
        }))
    }
}

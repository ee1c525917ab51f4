//! Repository for the `sensor_readings` table (append-only time-series).

use museum_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::sensor_reading::{CreateSensorReading, StoredReading};

/// Column list for `sensor_readings` SELECT queries.
const COLUMNS: &str = "\
    id, exhibit_id, temperature, humidity, vibration, \
    data_source, is_anomaly, anomaly_score, anomalies, recorded_at";

/// Default page size for history queries.
pub const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on page size for history queries.
pub const MAX_LIMIT: i64 = 500;

/// Provides query operations for stored sensor readings.
pub struct SensorReadingRepo;

impl SensorReadingRepo {
    /// Insert a single evaluated reading.
    pub async fn insert(
        pool: &SqlitePool,
        input: &CreateSensorReading,
    ) -> Result<StoredReading, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensor_readings (exhibit_id, temperature, humidity, vibration, \
                data_source, is_anomaly, anomaly_score, anomalies, recorded_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredReading>(&query)
            .bind(input.exhibit_id)
            .bind(input.temperature)
            .bind(input.humidity)
            .bind(input.vibration)
            .bind(&input.data_source)
            .bind(input.is_anomaly)
            .bind(input.anomaly_score)
            .bind(Json(&input.anomalies))
            .bind(input.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Most recent readings for an exhibit, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_LIMIT`] and is clamped to `1..=MAX_LIMIT`.
    pub async fn list_for_exhibit(
        pool: &SqlitePool,
        exhibit_id: DbId,
        limit: Option<i64>,
    ) -> Result<Vec<StoredReading>, sqlx::Error> {
        let limit = clamp_limit(limit);
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_readings \
             WHERE exhibit_id = ? \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT ?"
        );
        sqlx::query_as::<_, StoredReading>(&query)
            .bind(exhibit_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The latest reading for an exhibit, if any.
    pub async fn latest_for_exhibit(
        pool: &SqlitePool,
        exhibit_id: DbId,
    ) -> Result<Option<StoredReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_readings \
             WHERE exhibit_id = ? \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, StoredReading>(&query)
            .bind(exhibit_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete readings older than the given cutoff timestamp.
    ///
    /// Yields the deleted row count.
    pub async fn delete_older_than(pool: &SqlitePool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sensor_readings WHERE recorded_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Clamp a user-provided limit to `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

//! Repository for the `exhibits` table.

use chrono::Utc;
use museum_core::thresholds::{Bound, ThresholdSet, VibrationBound};
use museum_core::types::DbId;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::exhibit::{CreateExhibit, Exhibit, UpdateExhibit};

/// Column list for `exhibits` queries.
const COLUMNS: &str = "\
    id, name, description, location, \
    temperature_min, temperature_max, humidity_min, humidity_max, vibration_max, \
    created_at, updated_at";

/// Provides CRUD operations for exhibits.
pub struct ExhibitRepo;

impl ExhibitRepo {
    /// Insert a new exhibit, filling omitted thresholds with the defaults.
    ///
    /// Accepts the pool or an open transaction.
    pub async fn create<'e, E>(executor: E, input: &CreateExhibit) -> Result<Exhibit, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let thresholds = input.thresholds();
        let now = Utc::now();
        let query = format!(
            "INSERT INTO exhibits (name, description, location, \
                temperature_min, temperature_max, humidity_min, humidity_max, vibration_max, \
                created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exhibit>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(thresholds.temperature.min)
            .bind(thresholds.temperature.max)
            .bind(thresholds.humidity.min)
            .bind(thresholds.humidity.max)
            .bind(thresholds.vibration.max)
            .bind(now)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Find an exhibit by id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Exhibit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exhibits WHERE id = ?");
        sqlx::query_as::<_, Exhibit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all exhibits, newest first.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Exhibit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM exhibits ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Exhibit>(&query).fetch_all(pool).await
    }

    /// Apply a partial update. Returns `None` if the exhibit does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateExhibit,
    ) -> Result<Option<Exhibit>, sqlx::Error> {
        let query = format!(
            "UPDATE exhibits SET \
                name = COALESCE(?, name), \
                description = COALESCE(?, description), \
                location = COALESCE(?, location), \
                temperature_min = COALESCE(?, temperature_min), \
                temperature_max = COALESCE(?, temperature_max), \
                humidity_min = COALESCE(?, humidity_min), \
                humidity_max = COALESCE(?, humidity_max), \
                vibration_max = COALESCE(?, vibration_max), \
                updated_at = ? \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Exhibit>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.temperature_min)
            .bind(input.temperature_max)
            .bind(input.humidity_min)
            .bind(input.humidity_max)
            .bind(input.vibration_max)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an exhibit (its readings cascade). Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM exhibits WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all exhibits.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM exhibits")
            .fetch_one(pool)
            .await
    }

    /// Fetch only the threshold columns for an exhibit.
    ///
    /// Returns `None` for an unknown exhibit so the resolver can fall through
    /// to the next level.
    pub async fn find_thresholds(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<ThresholdSet>, sqlx::Error> {
        let row: Option<(f64, f64, f64, f64, f64)> = sqlx::query_as(
            "SELECT temperature_min, temperature_max, humidity_min, humidity_max, vibration_max \
             FROM exhibits WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(t_min, t_max, h_min, h_max, v_max)| ThresholdSet {
            temperature: Bound {
                min: t_min,
                max: t_max,
            },
            humidity: Bound {
                min: h_min,
                max: h_max,
            },
            vibration: VibrationBound { max: v_max },
        }))
    }
}

//! Hourly pruning of stored sensor readings past `READING_RETENTION_HOURS`.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use museum_db::repositories::SensorReadingRepo;
use museum_db::DbPool;
use tokio_util::sync::CancellationToken;

const PURGE_EVERY: Duration = Duration::from_secs(60 * 60);

/// Purge on start-up, then every hour, until `cancel` fires.
pub async fn run(pool: DbPool, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(retention_hours, "Reading retention job started");

    let mut ticks = tokio::time::interval(PURGE_EVERY);
    while cancel
        .run_until_cancelled(ticks.tick())
        .await
        .is_some()
    {
        match purge_once(&pool, retention_hours).await {
            Ok(0) => tracing::debug!("Reading retention: nothing to purge"),
            Ok(deleted) => tracing::info!(deleted, "Reading retention: purged readings"),
            Err(e) => tracing::error!(error = %e, "Reading retention: purge failed"),
        }
    }

    tracing::info!("Reading retention job stopped");
}

#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error("retention of {0} hours does not fit a timestamp")]
    WindowOutOfRange(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Delete readings recorded more than `retention_hours` ago.
pub async fn purge_once(pool: &DbPool, retention_hours: i64) -> Result<u64, PurgeError> {
    let cutoff = TimeDelta::try_hours(retention_hours)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .ok_or(PurgeError::WindowOutOfRange(retention_hours))?;
    Ok(SensorReadingRepo::delete_older_than(pool, cutoff).await?)
}

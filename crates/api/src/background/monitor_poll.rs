//! Periodic sampling of every exhibit.
//!
//! Keeps the reading history populated when no dashboard is polling
//! `/monitor`. Each tick samples all exhibits through the same [`Monitor`]
//! the HTTP handler uses.

use std::time::Duration;

use museum_db::repositories::ExhibitRepo;
use museum_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::monitoring::Monitor;

/// Run the poll loop until `cancel` is triggered.
pub async fn run(pool: DbPool, monitor: Monitor, period: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = period.as_secs(), "Monitor poll job started");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Monitor poll job stopping");
                break;
            }
            _ = interval.tick() => {
                poll_once(&pool, &monitor).await;
            }
        }
    }
}

/// Sample every exhibit once. Returns how many samples were stored.
pub async fn poll_once(pool: &DbPool, monitor: &Monitor) -> usize {
    let exhibits = match ExhibitRepo::list(pool).await {
        Ok(exhibits) => exhibits,
        Err(e) => {
            tracing::error!(error = %e, "Monitor poll: failed to list exhibits");
            return 0;
        }
    };

    let mut stored = 0;
    let mut anomalies = 0;
    for exhibit in &exhibits {
        match monitor.sample(exhibit).await {
            Ok(sample) => {
                stored += 1;
                if sample.anomaly_status.is_anomaly {
                    anomalies += 1;
                }
            }
            Err(e) => {
                tracing::error!(exhibit_id = exhibit.id, error = %e, "Monitor poll: sample failed");
            }
        }
    }

    tracing::debug!(
        exhibits = exhibits.len(),
        stored,
        anomalies,
        "Monitor poll complete"
    );
    stored
}

//! Sensor acquisition: where a reading for an exhibit comes from.

use std::sync::Arc;

use async_trait::async_trait;
use museum_core::sensor::{mock_reading, SensorReading};
use museum_core::types::DbId;
use serde::Serialize;

use crate::error::DeviceError;

/// Anything that can produce a sensor reading on demand.
#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn read(&self) -> Result<SensorReading, DeviceError>;
}

/// Randomised readings for exhibits without hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSensorSource;

#[async_trait]
impl SensorSource for MockSensorSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn read(&self) -> Result<SensorReading, DeviceError> {
        Ok(mock_reading())
    }
}

/// Provenance of a reading, persisted alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Read from the live board.
    Esp32,
    /// Generated for an exhibit that has no hardware.
    Mock,
    /// Generated because the live board failed.
    MockFallback,
}

impl DataSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            DataSource::Esp32 => "esp32",
            DataSource::Mock => "mock",
            DataSource::MockFallback => "mock_fallback",
        }
    }

    /// Whether the values came from real hardware.
    pub fn is_real(self) -> bool {
        self == DataSource::Esp32
    }
}

/// A reading together with where it came from.
#[derive(Debug, Clone, Copy)]
pub struct AcquiredReading {
    pub reading: SensorReading,
    pub source: DataSource,
}

/// Routes reading requests to the live board or the mock generator.
///
/// Only the exhibit configured as `real_data_exhibit_id` is wired to the
/// board; every other exhibit, and the real one when no board is configured,
/// receives mock data. A failing board degrades to mock data with a warning.
#[derive(Clone)]
pub struct SensorHub {
    mock: Arc<dyn SensorSource>,
    live: Option<Arc<dyn SensorSource>>,
    real_data_exhibit_id: DbId,
}

impl SensorHub {
    pub fn new(
        mock: Arc<dyn SensorSource>,
        live: Option<Arc<dyn SensorSource>>,
        real_data_exhibit_id: DbId,
    ) -> Self {
        Self {
            mock,
            live,
            real_data_exhibit_id,
        }
    }

    /// Hub with no live board at all.
    pub fn mock_only(real_data_exhibit_id: DbId) -> Self {
        Self::new(Arc::new(MockSensorSource), None, real_data_exhibit_id)
    }

    /// True when no live board is configured.
    pub fn is_mock_mode(&self) -> bool {
        self.live.is_none()
    }

    pub fn real_data_exhibit_id(&self) -> DbId {
        self.real_data_exhibit_id
    }

    /// Acquire a reading for `exhibit_id`.
    ///
    /// Errors only if the mock source itself fails.
    pub async fn acquire(&self, exhibit_id: DbId) -> Result<AcquiredReading, DeviceError> {
        if exhibit_id == self.real_data_exhibit_id {
            if let Some(live) = &self.live {
                match live.read().await {
                    Ok(reading) => {
                        return Ok(AcquiredReading {
                            reading,
                            source: DataSource::Esp32,
                        })
                    }
                    Err(e) => {
                        tracing::warn!(
                            exhibit_id,
                            source = live.name(),
                            error = %e,
                            "Live sensor read failed, falling back to mock data"
                        );
                        let reading = self.mock.read().await?;
                        return Ok(AcquiredReading {
                            reading,
                            source: DataSource::MockFallback,
                        });
                    }
                }
            }
        }

        let reading = self.mock.read().await?;
        Ok(AcquiredReading {
            reading,
            source: DataSource::Mock,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixedSource(SensorReading);

    #[async_trait]
    impl SensorSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn read(&self) -> Result<SensorReading, DeviceError> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct BrokenSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SensorSource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn read(&self) -> Result<SensorReading, DeviceError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(DeviceError::InvalidPayload("offline".into()))
        }
    }

    fn fixed(t: f64) -> Arc<dyn SensorSource> {
        Arc::new(FixedSource(SensorReading::new(t, 50.0, 0.1)))
    }

    #[tokio::test]
    async fn real_exhibit_reads_live_board() {
        let hub = SensorHub::new(fixed(10.0), Some(fixed(99.0)), 1);
        let acquired = hub.acquire(1).await.unwrap();
        assert_eq!(acquired.source, DataSource::Esp32);
        assert_eq!(acquired.reading.temperature, 99.0);
        assert!(acquired.source.is_real());
        assert!(!hub.is_mock_mode());
    }

    #[tokio::test]
    async fn other_exhibits_get_mock_data() {
        let live = Arc::new(BrokenSource::default());
        let hub = SensorHub::new(fixed(10.0), Some(live.clone()), 1);
        let acquired = hub.acquire(2).await.unwrap();
        assert_eq!(acquired.source, DataSource::Mock);
        assert_eq!(acquired.reading.temperature, 10.0);
        assert_eq!(live.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn failing_board_falls_back_to_mock() {
        let live = Arc::new(BrokenSource::default());
        let hub = SensorHub::new(fixed(10.0), Some(live.clone()), 1);
        let acquired = hub.acquire(1).await.unwrap();
        assert_eq!(acquired.source, DataSource::MockFallback);
        assert_eq!(acquired.reading.temperature, 10.0);
        assert_eq!(live.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn mock_mode_never_reports_real_data() {
        let hub = SensorHub::mock_only(1);
        assert!(hub.is_mock_mode());
        let acquired = hub.acquire(1).await.unwrap();
        assert_eq!(acquired.source, DataSource::Mock);
        acquired.reading.validate().unwrap();
    }

    #[test]
    fn data_source_names() {
        assert_eq!(DataSource::MockFallback.as_str(), "mock_fallback");
        assert_eq!(
            serde_json::to_string(&DataSource::MockFallback).unwrap(),
            "\"mock_fallback\""
        );
    }
}

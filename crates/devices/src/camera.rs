//! Camera frames: fetching JPEG snapshots and keeping the latest one around.
//!
//! A [`FrameSource`] produces single JPEG frames. The capture loop polls it at
//! a fixed rate and stores the most recent frame in a [`FrameBuffer`], which
//! the streaming endpoints read from. Readers never block on the camera.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use museum_core::types::Timestamp;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::DeviceError;
use crate::esp32::ensure_success;

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Anything that can produce a single JPEG frame.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn capture(&self) -> Result<Vec<u8>, DeviceError>;
}

/// Camera exposing a still-image URL that returns one JPEG per request.
pub struct HttpSnapshotCamera {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotCamera {
    pub fn new(url: String, timeout: Duration) -> Result<Self, DeviceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FrameSource for HttpSnapshotCamera {
    async fn capture(&self) -> Result<Vec<u8>, DeviceError> {
        let response = self.client.get(&self.url).send().await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        if !bytes.starts_with(&JPEG_SOI) {
            return Err(DeviceError::InvalidPayload(format!(
                "snapshot is not a JPEG ({} bytes)",
                bytes.len()
            )));
        }
        Ok(bytes.to_vec())
    }
}

/// A captured JPEG frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Arc<Vec<u8>>,
    pub captured_at: Timestamp,
}

/// Holds the most recently captured frame.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    latest: RwLock<Option<Frame>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, data: Vec<u8>) {
        *self.latest.write().await = Some(Frame {
            data: Arc::new(data),
            captured_at: Utc::now(),
        });
    }

    pub async fn latest(&self) -> Option<Frame> {
        self.latest.read().await.clone()
    }

    /// Latest frame, unless it is older than `max_age`.
    pub async fn latest_fresh(&self, max_age: Duration) -> Option<Frame> {
        let frame = self.latest().await?;
        let age = Utc::now().signed_duration_since(frame.captured_at);
        match age.to_std() {
            Ok(age) if age > max_age => None,
            _ => Some(frame),
        }
    }

    pub async fn clear(&self) {
        *self.latest.write().await = None;
    }
}

/// Poll `source` every `interval` and keep `buffer` up to date.
///
/// Consecutive failures are logged once at warn level and then at debug until
/// the camera recovers. The buffer is cleared on failure so stale frames are
/// not served as live. Runs until `cancel` is triggered.
pub async fn run_capture_loop(
    source: Arc<dyn FrameSource>,
    buffer: Arc<FrameBuffer>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_ms = interval.as_millis() as u64,
        "Camera capture loop started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut failing = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Camera capture loop stopping");
                break;
            }
            _ = ticker.tick() => {
                match source.capture().await {
                    Ok(frame) => {
                        if failing {
                            tracing::info!("Camera recovered");
                            failing = false;
                        }
                        buffer.store(frame).await;
                    }
                    Err(e) => {
                        if failing {
                            tracing::debug!(error = %e, "Camera capture still failing");
                        } else {
                            tracing::warn!(error = %e, "Camera capture failed");
                            failing = true;
                        }
                        buffer.clear().await;
                    }
                }
            }
        }
    }
}

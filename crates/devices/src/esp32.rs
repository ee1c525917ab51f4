//! HTTP client for the ESP32 environmental sensor board.
//!
//! The board exposes two JSON endpoints:
//! - `GET /api/sensors`: compact `{temperature, humidity, vibration_value}`
//! - `GET /json`: the full diagnostic document, passed through as-is

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use museum_core::sensor::SensorReading;
use museum_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::DeviceError;
use crate::source::SensorSource;

/// Default request timeout for the board.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Payload of `GET /api/sensors`. Missing fields read as 0.0.
#[derive(Debug, Clone, Deserialize)]
pub struct Esp32SensorPayload {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub vibration_value: f64,
}

impl Esp32SensorPayload {
    /// Convert to a reading stamped with `at` (the board sends no clock).
    pub fn into_reading(self, at: Timestamp) -> SensorReading {
        SensorReading::at(self.temperature, self.humidity, self.vibration_value, at)
    }
}

/// Connection bookkeeping reported by `/esp32/status`.
#[derive(Debug, Clone, Serialize)]
pub struct Esp32Status {
    pub address: String,
    pub connected: bool,
    pub last_successful_read: Option<Timestamp>,
    pub connection_errors: u32,
}

/// Client for a single ESP32 board.
pub struct Esp32Client {
    client: reqwest::Client,
    base_url: String,
    connection_errors: AtomicU32,
    last_successful_read: RwLock<Option<Timestamp>>,
}

impl Esp32Client {
    /// Create a client for `http://{ip}:{port}`.
    pub fn new(ip: &str, port: u16, timeout: Duration) -> Result<Self, DeviceError> {
        Self::with_base_url(format!("http://{ip}:{port}"), timeout)
    }

    /// Create a client for an explicit base URL (no trailing slash).
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, DeviceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            connection_errors: AtomicU32::new(0),
            last_successful_read: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the compact sensor document and convert it to a reading.
    ///
    /// Success resets the consecutive error counter; any failure bumps it.
    pub async fn get_sensor_data(&self) -> Result<SensorReading, DeviceError> {
        match self.fetch_sensor_data().await {
            Ok(reading) => {
                self.connection_errors.store(0, Ordering::Relaxed);
                *self.last_successful_read.write().await = Some(reading.timestamp);
                Ok(reading)
            }
            Err(e) => {
                let attempts = self.connection_errors.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::error!(
                    error = %e,
                    attempt = attempts,
                    base_url = %self.base_url,
                    "Error reading ESP32 sensor data"
                );
                Err(e)
            }
        }
    }

    /// Fetch the full diagnostic document from `/json`.
    pub async fn get_full_data(&self) -> Result<serde_json::Value, DeviceError> {
        let response = self
            .client
            .get(format!("{}/json", self.base_url))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Snapshot of the connection bookkeeping.
    pub async fn status(&self) -> Esp32Status {
        let last_successful_read = *self.last_successful_read.read().await;
        let connection_errors = self.connection_errors.load(Ordering::Relaxed);
        Esp32Status {
            address: self.base_url.clone(),
            connected: last_successful_read.is_some() && connection_errors == 0,
            last_successful_read,
            connection_errors,
        }
    }

    async fn fetch_sensor_data(&self) -> Result<SensorReading, DeviceError> {
        let response = self
            .client
            .get(format!("{}/api/sensors", self.base_url))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let payload: Esp32SensorPayload = response.json().await?;
        tracing::debug!(?payload, "ESP32 sensor data");

        let reading = payload.into_reading(Utc::now());
        reading
            .validate()
            .map_err(|e| DeviceError::InvalidPayload(e.to_string()))?;
        Ok(reading)
    }
}

#[async_trait]
impl SensorSource for Esp32Client {
    fn name(&self) -> &'static str {
        "esp32"
    }

    async fn read(&self) -> Result<SensorReading, DeviceError> {
        self.get_sensor_data().await
    }
}

/// Turn a non-2xx response into [`DeviceError::Status`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, DeviceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(DeviceError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

//! Environmental sensor readings and the mock reading generator.
//!
//! A [`SensorReading`] is immutable once built. Readings come from three
//! places: the mock generator in this module, a polled ESP32 device (see the
//! `museum-devices` crate), or a payload supplied by an API caller.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Quantity name for air temperature (°C).
pub const QUANTITY_TEMPERATURE: &str = "temperature";

/// Quantity name for relative humidity (%).
pub const QUANTITY_HUMIDITY: &str = "humidity";

/// Quantity name for vibration magnitude (unitless).
pub const QUANTITY_VIBRATION: &str = "vibration";

/// Probability that a mock reading carries an injected excursion.
const MOCK_ANOMALY_PROBABILITY: f64 = 0.1;

/// A single environmental sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Air temperature in °C.
    pub temperature: f64,
    /// Relative humidity in %.
    pub humidity: f64,
    /// Vibration magnitude, unitless.
    pub vibration: f64,
    /// When the sample was taken. Callers may omit it; it then defaults to now.
    #[serde(default = "Utc::now")]
    pub timestamp: Timestamp,
}

impl SensorReading {
    /// Build a reading stamped with the current time.
    pub fn new(temperature: f64, humidity: f64, vibration: f64) -> Self {
        Self::at(temperature, humidity, vibration, Utc::now())
    }

    /// Build a reading with an explicit timestamp.
    pub fn at(temperature: f64, humidity: f64, vibration: f64, timestamp: Timestamp) -> Self {
        Self {
            temperature,
            humidity,
            vibration,
            timestamp,
        }
    }

    /// Reject readings carrying NaN or infinite values.
    ///
    /// The evaluator assumes finite inputs, so boundaries (HTTP payloads,
    /// device responses) call this before evaluating.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            (QUANTITY_TEMPERATURE, self.temperature),
            (QUANTITY_HUMIDITY, self.humidity),
            (QUANTITY_VIBRATION, self.vibration),
        ] {
            if !value.is_finite() {
                return Err(CoreError::Validation(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Generate a plausible gallery reading using the thread-local RNG.
pub fn mock_reading() -> SensorReading {
    mock_reading_with(&mut rand::rng())
}

/// Generate a plausible gallery reading from the given RNG.
///
/// Baselines sit around 21 °C / 50 % RH with light vibration. Roughly one
/// reading in ten gets a heat spike (+5..10 °C) or a vibration burst
/// (+2..5) so dashboards have something to show.
pub fn mock_reading_with<R: Rng + ?Sized>(rng: &mut R) -> SensorReading {
    let mut temperature = 21.0 + rng.random_range(-2.0..3.0);
    let humidity = 50.0 + rng.random_range(-10.0..15.0);
    let mut vibration = rng.random_range(0.0..1.0);

    if rng.random_bool(MOCK_ANOMALY_PROBABILITY) {
        if rng.random_bool(0.5) {
            temperature += rng.random_range(5.0..10.0);
        } else {
            vibration += rng.random_range(2.0..5.0);
        }
    }

    SensorReading::new(
        round_to(temperature, 1),
        round_to(humidity, 1),
        round_to(vibration, 2),
    )
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

//! Rule-based anomaly evaluation for a single sensor reading.
//!
//! Pure logic, no database access. Given a reading and the threshold set
//! picked by [`crate::thresholds::resolve`], produce an [`AnomalyVerdict`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sensor::SensorReading;
use crate::thresholds::{Bound, ThresholdSet};

/// Which quantity left its band, and in which direction.
///
/// Declaration order matches evaluation order: temperature, humidity,
/// vibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyTag {
    TemperatureLow,
    TemperatureHigh,
    HumidityLow,
    HumidityHigh,
    VibrationHigh,
}

impl AnomalyTag {
    pub const ALL: [AnomalyTag; 5] = [
        AnomalyTag::TemperatureLow,
        AnomalyTag::TemperatureHigh,
        AnomalyTag::HumidityLow,
        AnomalyTag::HumidityHigh,
        AnomalyTag::VibrationHigh,
    ];

    /// Wire name, e.g. `"temperature_high"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            AnomalyTag::TemperatureLow => "temperature_low",
            AnomalyTag::TemperatureHigh => "temperature_high",
            AnomalyTag::HumidityLow => "humidity_low",
            AnomalyTag::HumidityHigh => "humidity_high",
            AnomalyTag::VibrationHigh => "vibration_high",
        }
    }

    /// Quantity name: the wire name up to its first underscore.
    pub fn quantity(self) -> &'static str {
        let name = self.as_str();
        name.split_once('_').map_or(name, |(quantity, _)| quantity)
    }

    /// Parse a wire name. Returns `None` for anything outside the vocabulary.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == name)
    }
}

impl fmt::Display for AnomalyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one reading. Computed fresh every time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyVerdict {
    /// `true` iff `anomalies` is non-empty.
    pub is_anomaly: bool,
    /// Largest normalized deviation, clamped to `[0, 1]`.
    pub anomaly_score: f64,
    /// Triggered tags in evaluation order.
    pub anomalies: Vec<AnomalyTag>,
    /// Quantities behind `anomalies`, deduplicated, first occurrence wins.
    pub affected_sensors: Vec<String>,
}

impl AnomalyVerdict {
    /// Wire names of the triggered tags.
    pub fn tag_names(&self) -> Vec<&'static str> {
        self.anomalies.iter().map(|tag| tag.as_str()).collect()
    }
}

/// Evaluate a reading against a threshold set.
///
/// Each quantity is checked independently. A deviation is the distance from
/// the violated bound divided by that bound; the score is the largest
/// deviation, clamped to `[0, 1]`. A zero-valued bound makes the ratio
/// infinite, which the clamp turns into a score of 1.0.
pub fn evaluate(reading: &SensorReading, thresholds: &ThresholdSet) -> AnomalyVerdict {
    let mut triggered: Vec<(AnomalyTag, f64)> = Vec::with_capacity(3);

    triggered.extend(check_band(
        reading.temperature,
        &thresholds.temperature,
        AnomalyTag::TemperatureLow,
        AnomalyTag::TemperatureHigh,
    ));
    triggered.extend(check_band(
        reading.humidity,
        &thresholds.humidity,
        AnomalyTag::HumidityLow,
        AnomalyTag::HumidityHigh,
    ));
    // No low-vibration rule.
    if reading.vibration > thresholds.vibration.max {
        triggered.push((
            AnomalyTag::VibrationHigh,
            deviation(reading.vibration, thresholds.vibration.max),
        ));
    }

    let anomaly_score = triggered
        .iter()
        .map(|(_, d)| *d)
        .fold(0.0, f64::max)
        .clamp(0.0, 1.0);

    let anomalies: Vec<AnomalyTag> = triggered.into_iter().map(|(tag, _)| tag).collect();

    let mut affected_sensors: Vec<String> = Vec::with_capacity(anomalies.len());
    for tag in &anomalies {
        let quantity = tag.quantity();
        if !affected_sensors.iter().any(|q| q == quantity) {
            affected_sensors.push(quantity.to_string());
        }
    }

    AnomalyVerdict {
        is_anomaly: !anomalies.is_empty(),
        anomaly_score,
        anomalies,
        affected_sensors,
    }
}

/// Check a two-sided band. At most one of low/high fires.
fn check_band(
    value: f64,
    bound: &Bound,
    low: AnomalyTag,
    high: AnomalyTag,
) -> Option<(AnomalyTag, f64)> {
    if value < bound.min {
        Some((low, deviation(value, bound.min)))
    } else if value > bound.max {
        Some((high, deviation(value, bound.max)))
    } else {
        None
    }
}

fn deviation(value: f64, bound: f64) -> f64 {
    (value - bound).abs() / bound
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

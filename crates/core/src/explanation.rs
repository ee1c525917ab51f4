//! Human-readable explanations for anomaly tags.

use crate::anomaly::{AnomalyTag, AnomalyVerdict};
use crate::sensor::SensorReading;

/// Text returned when nothing is out of range.
pub const NORMAL_EXPLANATION: &str = "All sensor readings are within normal parameters.";

/// Prefix used when two or more tags fired.
pub const MULTIPLE_ISSUES_PREFIX: &str = "Multiple issues detected: ";

/// Separator between sentences in a multi-issue explanation.
pub const ISSUE_SEPARATOR: &str = " | ";

/// Turn an ordered list of tag names into one explanation string.
///
/// Tags outside the known vocabulary get a generic sentence instead of
/// being dropped.
pub fn explain<S: AsRef<str>>(tags: &[S], reading: &SensorReading) -> String {
    let sentences: Vec<String> = tags
        .iter()
        .map(|tag| describe(tag.as_ref(), reading))
        .collect();

    match sentences.as_slice() {
        [] => NORMAL_EXPLANATION.to_string(),
        [only] => only.clone(),
        many => format!("{MULTIPLE_ISSUES_PREFIX}{}", many.join(ISSUE_SEPARATOR)),
    }
}

/// Explain a verdict computed for `reading`.
pub fn explain_verdict(verdict: &AnomalyVerdict, reading: &SensorReading) -> String {
    explain(&verdict.tag_names(), reading)
}

fn describe(tag: &str, reading: &SensorReading) -> String {
    match AnomalyTag::parse(tag) {
        Some(AnomalyTag::TemperatureHigh) => format!(
            "Temperature ({}°C) is above safe levels.",
            number(reading.temperature)
        ),
        Some(AnomalyTag::TemperatureLow) => format!(
            "Temperature ({}°C) is below recommended levels.",
            number(reading.temperature)
        ),
        Some(AnomalyTag::HumidityHigh) => {
            format!("Humidity ({}%) is too high.", number(reading.humidity))
        }
        Some(AnomalyTag::HumidityLow) => {
            format!("Humidity ({}%) is too low.", number(reading.humidity))
        }
        Some(AnomalyTag::VibrationHigh) => format!(
            "Vibration levels ({}) are excessive.",
            number(reading.vibration)
        ),
        None => format!("Anomaly detected: {tag}"),
    }
}

/// Format a measurement so whole numbers keep one decimal (`30.0`, not `30`).
fn number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

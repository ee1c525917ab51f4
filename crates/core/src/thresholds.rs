//! Threshold sets and the resolver that picks one for an evaluation.
//!
//! Pure logic, no database access. The caller fetches the exhibit override
//! (if any) and hands it in alongside the request payload and the default.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CoreError;
use crate::sensor::{QUANTITY_HUMIDITY, QUANTITY_TEMPERATURE, QUANTITY_VIBRATION};

/// Vibration has no lower bound; negative magnitudes are not meaningful.
pub const VIBRATION_MIN: f64 = 0.0;

/// Process-wide default thresholds used when nothing more specific exists.
pub const DEFAULT_THRESHOLDS: ThresholdSet = ThresholdSet {
    temperature: Bound {
        min: 18.0,
        max: 24.0,
    },
    humidity: Bound {
        min: 40.0,
        max: 60.0,
    },
    vibration: VibrationBound { max: 0.5 },
};

/// Inclusive `[min, max]` band for a two-sided quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

/// Upper bound for vibration.
///
/// Serialized as `{"min": 0.0, "max": ..}` so consumers see the same shape
/// for every quantity; any incoming `min` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VibrationBound {
    pub max: f64,
}

impl Serialize for VibrationBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("VibrationBound", 2)?;
        state.serialize_field("min", &VIBRATION_MIN)?;
        state.serialize_field("max", &self.max)?;
        state.end()
    }
}

/// Per-quantity bounds used to judge one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub temperature: Bound,
    pub humidity: Bound,
    pub vibration: VibrationBound,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        DEFAULT_THRESHOLDS
    }
}

impl ThresholdSet {
    /// Check that every bound is finite, ordered, and non-negative where it
    /// has to be.
    ///
    /// Zero-valued bounds are accepted; the evaluator saturates their
    /// deviation at the maximum score.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_band(&self.temperature, QUANTITY_TEMPERATURE)?;
        validate_band(&self.humidity, QUANTITY_HUMIDITY)?;
        let vibration_max = format!("{QUANTITY_VIBRATION}_max");
        validate_finite(self.vibration.max, &vibration_max)?;
        if self.vibration.max < VIBRATION_MIN {
            return Err(CoreError::Validation(format!(
                "{vibration_max} must be >= {VIBRATION_MIN}, got {}",
                self.vibration.max
            )));
        }
        Ok(())
    }
}

/// Where the thresholds used for an evaluation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdSource {
    /// The exhibit's stored configuration.
    Exhibit,
    /// An ad hoc set supplied with the request.
    Request,
    /// The process-wide default.
    Default,
}

/// A resolved threshold set together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedThresholds {
    pub thresholds: ThresholdSet,
    pub source: ThresholdSource,
}

/// Pick the threshold set for one evaluation.
///
/// Precedence, highest first: exhibit override, request override, default.
/// The winner is used wholesale; sets are never merged field by field.
pub fn resolve(
    exhibit_override: Option<ThresholdSet>,
    request_override: Option<ThresholdSet>,
    default: ThresholdSet,
) -> ThresholdSet {
    resolve_with_source(exhibit_override, request_override, default).thresholds
}

/// Same as [`resolve`], also reporting which level supplied the set.
pub fn resolve_with_source(
    exhibit_override: Option<ThresholdSet>,
    request_override: Option<ThresholdSet>,
    default: ThresholdSet,
) -> ResolvedThresholds {
    match (exhibit_override, request_override) {
        (Some(thresholds), _) => ResolvedThresholds {
            thresholds,
            source: ThresholdSource::Exhibit,
        },
        (None, Some(thresholds)) => ResolvedThresholds {
            thresholds,
            source: ThresholdSource::Request,
        },
        (None, None) => ResolvedThresholds {
            thresholds: default,
            source: ThresholdSource::Default,
        },
    }
}

fn validate_band(bound: &Bound, name: &str) -> Result<(), CoreError> {
    validate_finite(bound.min, &format!("{name}_min"))?;
    validate_finite(bound.max, &format!("{name}_max"))?;
    if bound.min > bound.max {
        return Err(CoreError::Validation(format!(
            "{name}_min ({}) must not exceed {name}_max ({})",
            bound.min, bound.max
        )));
    }
    Ok(())
}

fn validate_finite(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{name} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

//! Exhibit entity model and DTOs.
//!
//! An exhibit owns its threshold overrides; they change only through
//! [`UpdateExhibit`].

use museum_core::thresholds::{Bound, ThresholdSet, VibrationBound, DEFAULT_THRESHOLDS};
use museum_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `exhibits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exhibit {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
    pub vibration_max: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Exhibit {
    /// The exhibit's stored threshold set.
    pub fn thresholds(&self) -> ThresholdSet {
        ThresholdSet {
            temperature: Bound {
                min: self.temperature_min,
                max: self.temperature_max,
            },
            humidity: Bound {
                min: self.humidity_min,
                max: self.humidity_max,
            },
            vibration: VibrationBound {
                max: self.vibration_max,
            },
        }
    }
}

/// DTO for creating an exhibit. Omitted thresholds take the defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExhibit {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub vibration_max: Option<f64>,
}

impl CreateExhibit {
    /// Threshold set the new exhibit will be stored with.
    pub fn thresholds(&self) -> ThresholdSet {
        let d = DEFAULT_THRESHOLDS;
        ThresholdSet {
            temperature: Bound {
                min: self.temperature_min.unwrap_or(d.temperature.min),
                max: self.temperature_max.unwrap_or(d.temperature.max),
            },
            humidity: Bound {
                min: self.humidity_min.unwrap_or(d.humidity.min),
                max: self.humidity_max.unwrap_or(d.humidity.max),
            },
            vibration: VibrationBound {
                max: self.vibration_max.unwrap_or(d.vibration.max),
            },
        }
    }
}

/// DTO for a partial exhibit update. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExhibit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    pub vibration_max: Option<f64>,
}

impl UpdateExhibit {
    /// Thresholds the exhibit would have after applying this update.
    ///
    /// Used to validate min/max ordering against the stored values before
    /// writing.
    pub fn merged_thresholds(&self, current: &Exhibit) -> ThresholdSet {
        ThresholdSet {
            temperature: Bound {
                min: self.temperature_min.unwrap_or(current.temperature_min),
                max: self.temperature_max.unwrap_or(current.temperature_max),
            },
            humidity: Bound {
                min: self.humidity_min.unwrap_or(current.humidity_min),
                max: self.humidity_max.unwrap_or(current.humidity_max),
            },
            vibration: VibrationBound {
                max: self.vibration_max.unwrap_or(current.vibration_max),
            },
        }
    }
}

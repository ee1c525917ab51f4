//! Object detection on camera frames.
//!
//! The detector is an external HTTP service taking a JPEG upload and returning
//! labelled bounding boxes. Deciding whether a detection warrants an alert is
//! local policy, kept separate from the client so it can be tested without I/O.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_success, AssistantError};

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// One labelled bounding box. `bbox` is `[x1, y1, x2, y2]` in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
    #[serde(default)]
    pub bbox: [f64; 4],
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Which detections count as an anomaly.
#[derive(Debug, Clone)]
pub struct DetectionPolicy {
    min_confidence: f64,
    alert_labels: HashSet<String>,
}

impl DetectionPolicy {
    /// Labels are matched case-insensitively; blanks are ignored.
    pub fn new<I, S>(min_confidence: f64, alert_labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alert_labels = alert_labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        Self {
            min_confidence,
            alert_labels,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn flags(&self, detection: &Detection) -> bool {
        detection.confidence >= self.min_confidence
            && self
                .alert_labels
                .contains(&detection.label.trim().to_lowercase())
    }
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE, ["person"])
    }
}

/// Outcome of running the policy over a detector response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageAssessment {
    pub is_anomaly: bool,
    pub flagged: Vec<Detection>,
    pub detections: Vec<Detection>,
}

pub fn assess_detections(detections: Vec<Detection>, policy: &DetectionPolicy) -> ImageAssessment {
    let flagged: Vec<Detection> = detections
        .iter()
        .filter(|d| policy.flags(d))
        .cloned()
        .collect();
    ImageAssessment {
        is_anomaly: !flagged.is_empty(),
        flagged,
        detections,
    }
}

/// Client for the detection service.
pub struct DetectorClient {
    client: reqwest::Client,
    url: String,
}

impl DetectorClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, AssistantError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Upload a JPEG frame and return the raw detections.
    pub async fn detect(&self, jpeg: Vec<u8>) -> Result<Vec<Detection>, AssistantError> {
        let part = Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("image", part);

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let response = ensure_success(response).await?;
        let body: DetectionResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;

        tracing::debug!(count = body.detections.len(), "Detector response");
        Ok(body.detections)
    }
}

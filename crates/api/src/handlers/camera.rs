//! Camera endpoints: MJPEG streaming, snapshots and frame analysis.
//!
//! Only the real-data exhibit has a camera. Its stream serves the latest
//! captured frame, or a placeholder naming why none is available. Every
//! other exhibit gets the mock-camera placeholder at a low frame rate.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use futures::stream::{self, Stream};
use museum_assistant::detector::{assess_detections, ImageAssessment};
use museum_core::placeholder::PlaceholderKind;
use museum_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::config::MAX_CAMERA_FPS;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart boundary used by the MJPEG stream.
pub const BOUNDARY: &str = "frame";

/// Per-part header naming where the frame came from.
pub const FRAME_SOURCE_HEADER: &str = "x-frame-source";

/// Frame rate for placeholder-only streams.
const PLACEHOLDER_FPS: u32 = 5;

const LIVE_SOURCE: &str = "live";

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub exhibit_id: DbId,
    #[serde(flatten)]
    pub assessment: ImageAssessment,
    pub frame_captured_at: Timestamp,
    pub analyzed_at: Timestamp,
}

/// GET /api/v1/camera/stream/{exhibit_id}
///
/// `multipart/x-mixed-replace` stream that runs until the client disconnects
/// or the server shuts down.
pub async fn stream(State(state): State<AppState>, Path(exhibit_id): Path<DbId>) -> Response {
    let fps = if exhibit_id == state.config.esp32.real_data_exhibit_id {
        state.config.camera.fps
    } else {
        PLACEHOLDER_FPS
    };
    let period = frame_period(fps);

    tracing::debug!(exhibit_id, fps, "Camera stream opened");

    let body = Body::from_stream(mjpeg_stream(state, exhibit_id, period));

    (
        [
            (
                header::CONTENT_TYPE,
                format!("multipart/x-mixed-replace; boundary={BOUNDARY}"),
            ),
            (header::CACHE_CONTROL, "no-cache, no-store".to_string()),
        ],
        body,
    )
        .into_response()
}

/// GET /api/v1/camera/snapshot/{exhibit_id}
///
/// A single JPEG; the `x-frame-source` header says whether it is live.
pub async fn snapshot(State(state): State<AppState>, Path(exhibit_id): Path<DbId>) -> Response {
    let (jpeg, source) = current_frame(&state, exhibit_id).await;
    (
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-store"),
            (header::HeaderName::from_static(FRAME_SOURCE_HEADER), source),
        ],
        jpeg,
    )
        .into_response()
}

/// POST /api/v1/camera/analyze/{exhibit_id}
///
/// Run the object detector over the current live frame and apply the alert
/// policy. 503 when there is no detector or no live frame, 502 when the
/// detector call fails.
pub async fn analyze(
    State(state): State<AppState>,
    Path(exhibit_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let detector = state
        .detector
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("No object detector is configured".into()))?;

    if exhibit_id != state.config.esp32.real_data_exhibit_id {
        return Err(AppError::Unavailable(format!(
            "Exhibit {exhibit_id} has no live camera"
        )));
    }

    let frame = state
        .live_frame()
        .await
        .ok_or_else(|| AppError::Unavailable("No live camera frame is available".into()))?;

    let detections = detector
        .detect(frame.data.as_ref().clone())
        .await
        .map_err(|e| AppError::Upstream(format!("Object detector failed: {e}")))?;

    let assessment = assess_detections(detections, &state.detection_policy);
    if assessment.is_anomaly {
        tracing::warn!(
            exhibit_id,
            flagged = assessment.flagged.len(),
            "Camera analysis flagged detections"
        );
    }

    Ok((
        StatusCode::OK,
        Json(DataResponse {
            data: AnalysisResponse {
                exhibit_id,
                assessment,
                frame_captured_at: frame.captured_at,
                analyzed_at: Utc::now(),
            },
        }),
    ))
}

/// The frame to show for `exhibit_id` right now, and its source label.
async fn current_frame(state: &AppState, exhibit_id: DbId) -> (Bytes, &'static str) {
    let kind = if exhibit_id != state.config.esp32.real_data_exhibit_id {
        PlaceholderKind::MockCamera
    } else if state.camera.is_none() {
        PlaceholderKind::CameraOffline
    } else {
        match state.live_frame().await {
            Some(frame) => return (Bytes::from(frame.data.as_ref().clone()), LIVE_SOURCE),
            None => PlaceholderKind::NoSignal,
        }
    };
    (
        Bytes::copy_from_slice(state.placeholders.get(kind)),
        kind.label(),
    )
}

/// Interval between frames at `fps`, clamped to 1..=[`MAX_CAMERA_FPS`] so the
/// period is never zero.
pub fn frame_period(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(fps.clamp(1, MAX_CAMERA_FPS)))
}

/// Encode one multipart part.
pub fn mjpeg_part(jpeg: &[u8], source: &str) -> Bytes {
    let head = format!(
        "--{BOUNDARY}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n{FRAME_SOURCE_HEADER}: {source}\r\n\r\n",
        jpeg.len()
    );
    let mut part = Vec::with_capacity(head.len() + jpeg.len() + 2);
    part.extend_from_slice(head.as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    Bytes::from(part)
}

fn mjpeg_stream(
    state: AppState,
    exhibit_id: DbId,
    period: Duration,
) -> impl Stream<Item = Result<Bytes, Infallible>> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    stream::unfold((state, ticker), move |(state, mut ticker)| async move {
        tokio::select! {
            biased;
            _ = state.shutdown.cancelled() => return None,
            _ = ticker.tick() => {}
        }
        let (jpeg, source) = current_frame(&state, exhibit_id).await;
        Some((Ok(mjpeg_part(&jpeg, source)), (state, ticker)))
    })
}

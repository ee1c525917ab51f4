use std::sync::Arc;
use std::time::Duration;

use museum_assistant::detector::{DetectionPolicy, DetectorClient};
use museum_assistant::llm::ChatClient;
use museum_core::placeholder::PlaceholderFrames;
use museum_devices::camera::{Frame, FrameBuffer, FrameSource, HttpSnapshotCamera};
use museum_devices::esp32::Esp32Client;
use museum_devices::source::{MockSensorSource, SensorHub, SensorSource};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::monitoring::Monitor;

/// Frames older than this are treated as a dead camera.
pub const LIVE_FRAME_MAX_AGE: Duration = Duration::from_secs(5);

/// Everything a handler may touch. Collaborators that depend on optional
/// hardware or services are `None` when not configured.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: museum_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Reading acquisition, evaluation and persistence for one exhibit.
    pub monitor: Monitor,
    /// Live board client; `None` in mock mode.
    pub esp32: Option<Arc<Esp32Client>>,
    /// Camera polled by the capture job; `None` when no camera is configured.
    pub camera: Option<Arc<dyn FrameSource>>,
    /// Latest frame written by the capture job.
    pub frames: Arc<FrameBuffer>,
    /// Pre-rendered JPEGs served when no live frame exists.
    pub placeholders: Arc<PlaceholderFrames>,
    /// LLM client; `None` means keyword replies only.
    pub chat: Option<Arc<ChatClient>>,
    /// Object detector; `None` disables frame analysis.
    pub detector: Option<Arc<DetectorClient>>,
    pub detection_policy: Arc<DetectionPolicy>,
    /// Cancelled on shutdown; ends open camera streams.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build the state and all optional collaborators from configuration.
    pub fn from_config(pool: museum_db::DbPool, config: ServerConfig) -> Result<Self, AppError> {
        let esp32 = match config.esp32_address() {
            Some(address) => {
                let client = Esp32Client::with_base_url(
                    address,
                    Duration::from_secs(config.esp32.timeout_secs),
                )
                .map_err(|e| AppError::InternalError(e.to_string()))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let live = esp32
            .clone()
            .map(|client| client as Arc<dyn SensorSource>);
        let sensors = SensorHub::new(
            Arc::new(MockSensorSource),
            live,
            config.esp32.real_data_exhibit_id,
        );

        let camera = match &config.camera.snapshot_url {
            Some(url) => {
                let camera = HttpSnapshotCamera::new(url.clone(), Duration::from_secs(2))
                    .map_err(|e| AppError::InternalError(e.to_string()))?;
                Some(Arc::new(camera) as Arc<dyn FrameSource>)
            }
            None => None,
        };

        let chat = match &config.assistant.openai_api_key {
            Some(key) => {
                let client = ChatClient::new(
                    &config.assistant.llm_endpoint,
                    key.clone(),
                    config.assistant.llm_model.clone(),
                    Duration::from_secs(config.assistant.llm_timeout_secs),
                )
                .map_err(|e| AppError::InternalError(e.to_string()))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let detector = match &config.assistant.detector_url {
            Some(url) => {
                let client = DetectorClient::new(url.clone(), Duration::from_secs(10))
                    .map_err(|e| AppError::InternalError(e.to_string()))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let detection_policy = DetectionPolicy::new(
            config.assistant.detector_min_confidence,
            &config.assistant.detector_alert_labels,
        );

        let placeholders = PlaceholderFrames::render()?;

        Ok(Self {
            monitor: Monitor::new(pool.clone(), sensors),
            pool,
            config: Arc::new(config),
            esp32,
            camera,
            frames: Arc::new(FrameBuffer::new()),
            placeholders: Arc::new(placeholders),
            chat,
            detector,
            detection_policy: Arc::new(detection_policy),
            shutdown: CancellationToken::new(),
        })
    }

    /// The latest camera frame, if a camera is configured and still delivering.
    pub async fn live_frame(&self) -> Option<Frame> {
        if self.camera.is_none() {
            return None;
        }
        self.frames.latest_fresh(LIVE_FRAME_MAX_AGE).await
    }

    pub async fn camera_available(&self) -> bool {
        self.live_frame().await.is_some()
    }
}

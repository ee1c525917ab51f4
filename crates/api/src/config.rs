use std::fmt::Debug;
use std::str::FromStr;

use museum_core::types::DbId;

/// Upper bound for `CAMERA_FPS`.
pub const MAX_CAMERA_FPS: u32 = 60;

/// Upper bound for `READING_RETENTION_HOURS` (ten years).
pub const MAX_RETENTION_HOURS: i64 = 24 * 365 * 10;

/// Process configuration, read once from the environment at startup.
///
/// Defaults run the whole service against mock sensors with no camera or
/// assistant.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen IP.
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Dashboard origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Seconds a handler may take before 408.
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://museum.db`).
    pub database_url: String,
    /// Insert the sample exhibits into an empty database on startup.
    pub seed_sample_exhibits: bool,
    pub esp32: Esp32Config,
    pub camera: CameraConfig,
    pub assistant: AssistantConfig,
    pub jobs: JobsConfig,
}

/// ESP32 sensor board settings.
#[derive(Debug, Clone)]
pub struct Esp32Config {
    /// When true no board is contacted and every exhibit gets mock data.
    pub mock_sensors: bool,
    pub ip: String,
    pub port: u16,
    pub timeout_secs: u64,
    /// The single exhibit wired to the live board and camera.
    pub real_data_exhibit_id: DbId,
}

/// Camera settings. The camera is disabled when `snapshot_url` is unset.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub snapshot_url: Option<String>,
    pub fps: u32,
}

/// LLM and object detector settings. Each is disabled when its key/URL is unset.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub openai_api_key: Option<String>,
    pub llm_endpoint: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub detector_url: Option<String>,
    pub detector_min_confidence: f64,
    pub detector_alert_labels: Vec<String>,
}

/// Background job settings. A value of `0` disables the job.
#[derive(Debug, Clone)]
pub struct JobsConfig {
    pub monitor_poll_interval_secs: u64,
    pub reading_retention_hours: i64,
}

impl ServerConfig {
    /// Read every setting, falling back to the defaults below.
    ///
    /// | Env Var                       | Default                      |
    /// |-------------------------------|------------------------------|
    /// | `HOST`                        | `0.0.0.0`                    |
    /// | `PORT`                        | `8000`                       |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`      |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                         |
    /// | `DATABASE_URL`                | `sqlite://museum.db`         |
    /// | `SEED_SAMPLE_EXHIBITS`        | `true`                       |
    /// | `MOCK_SENSORS`                | `true`                       |
    /// | `ESP32_IP`                    | `10.174.95.69`               |
    /// | `ESP32_PORT`                  | `80`                         |
    /// | `ESP32_TIMEOUT_SECS`          | `5`                          |
    /// | `REAL_DATA_EXHIBIT_ID`        | `1`                          |
    /// | `CAMERA_SNAPSHOT_URL`         | unset (camera disabled)      |
    /// | `CAMERA_FPS`                  | `15`                         |
    /// | `OPENAI_API_KEY`              | unset (keyword replies only) |
    /// | `LLM_ENDPOINT`                | `https://api.openai.com/v1`  |
    /// | `LLM_MODEL`                   | `gpt-4o-mini`                |
    /// | `LLM_TIMEOUT_SECS`            | `30`                         |
    /// | `DETECTOR_URL`                | unset (analysis disabled)    |
    /// | `DETECTOR_MIN_CONFIDENCE`     | `0.5`                        |
    /// | `DETECTOR_ALERT_LABELS`       | `person`                     |
    /// | `MONITOR_POLL_INTERVAL_SECS`  | `30`                         |
    /// | `READING_RETENTION_HOURS`     | `168`                        |
    ///
    /// Panics on values that fail to parse or fall outside [`Self::validate`]'s
    /// ranges; misconfiguration should stop startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", 8000);
        let cors_origins = list_env("CORS_ORIGINS", "http://localhost:5173");
        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 30);
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://museum.db".into());
        let seed_sample_exhibits = bool_env("SEED_SAMPLE_EXHIBITS", true);

        let esp32 = Esp32Config {
            mock_sensors: bool_env("MOCK_SENSORS", true),
            ip: std::env::var("ESP32_IP").unwrap_or_else(|_| "10.174.95.69".into()),
            port: parse_env("ESP32_PORT", 80),
            timeout_secs: parse_env("ESP32_TIMEOUT_SECS", 5),
            real_data_exhibit_id: parse_env("REAL_DATA_EXHIBIT_ID", 1),
        };

        let camera = CameraConfig {
            snapshot_url: optional_env("CAMERA_SNAPSHOT_URL"),
            fps: parse_env("CAMERA_FPS", 15),
        };

        let assistant = AssistantConfig {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            llm_endpoint: std::env::var("LLM_ENDPOINT")
                .unwrap_or_else(|_| museum_assistant::llm::DEFAULT_ENDPOINT.into()),
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| museum_assistant::llm::DEFAULT_MODEL.into()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30),
            detector_url: optional_env("DETECTOR_URL"),
            detector_min_confidence: parse_env(
                "DETECTOR_MIN_CONFIDENCE",
                museum_assistant::detector::DEFAULT_MIN_CONFIDENCE,
            ),
            detector_alert_labels: list_env("DETECTOR_ALERT_LABELS", "person"),
        };

        let jobs = JobsConfig {
            monitor_poll_interval_secs: parse_env("MONITOR_POLL_INTERVAL_SECS", 30),
            reading_retention_hours: parse_env("READING_RETENTION_HOURS", 168),
        };

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            seed_sample_exhibits,
            esp32,
            camera,
            assistant,
            jobs,
        };
        if let Err(e) = config.validate() {
            panic!("Invalid configuration: {e}");
        }
        config
    }

    /// Range checks for values that parse but would break a job or stream
    /// later on.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_CAMERA_FPS).contains(&self.camera.fps) {
            return Err(format!(
                "CAMERA_FPS must be between 1 and {MAX_CAMERA_FPS}, got {}",
                self.camera.fps
            ));
        }
        if !(0..=MAX_RETENTION_HOURS).contains(&self.jobs.reading_retention_hours) {
            return Err(format!(
                "READING_RETENTION_HOURS must be between 0 and {MAX_RETENTION_HOURS}, got {}",
                self.jobs.reading_retention_hours
            ));
        }
        if !(0.0..=1.0).contains(&self.assistant.detector_min_confidence) {
            return Err(format!(
                "DETECTOR_MIN_CONFIDENCE must be between 0 and 1, got {}",
                self.assistant.detector_min_confidence
            ));
        }
        Ok(())
    }

    /// `http://{ip}:{port}` of the board, or `None` in mock mode.
    pub fn esp32_address(&self) -> Option<String> {
        (!self.esp32.mock_sensors).then(|| format!("http://{}:{}", self.esp32.ip, self.esp32.port))
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be valid: {e:?}")),
        Err(_) => default,
    }
}

fn bool_env(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => panic!("{key} must be a boolean, got '{other}'"),
        },
        Err(_) => default,
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn list_env(key: &str, default: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_else(|_| default.into())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use museum_api::background;
use museum_api::config::ServerConfig;
use museum_api::handlers::camera::frame_period;
use museum_api::router::build_app_router;
use museum_api::state::AppState;
use museum_db::DbPool;

/// How long each background job gets to notice cancellation on shutdown.
const JOB_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        mock_sensors = config.esp32.mock_sensors,
        real_data_exhibit_id = config.esp32.real_data_exhibit_id,
        "Configuration loaded"
    );

    let pool = open_database(&config).await;

    let state =
        AppState::from_config(pool.clone(), config.clone()).expect("Failed to build app state");
    match config.esp32_address() {
        Some(address) => tracing::info!(%address, "Polling ESP32 board for the real-data exhibit"),
        None => tracing::info!("MOCK_SENSORS is on, all exhibits use mock readings"),
    }
    tracing::info!(
        camera = state.camera.is_some(),
        llm = state.chat.is_some(),
        detector = state.detector.is_some(),
        "Optional integrations"
    );

    // Cancelling this token stops the jobs and ends open camera streams.
    let shutdown = state.shutdown.clone();
    let jobs = spawn_jobs(&state, &config);

    let host: IpAddr = config.host.parse().expect("HOST is not an IP address");
    let addr = SocketAddr::new(host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Museum monitor listening");

    let app = build_app_router(state, &config);
    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                shutdown.cancel();
            }
        })
        .await
        .expect("Server error");

    tracing::info!(jobs = jobs.len(), "Listener closed, draining background jobs");
    for job in jobs {
        if tokio::time::timeout(JOB_DRAIN_TIMEOUT, job).await.is_err() {
            tracing::warn!("Background job did not stop in time");
        }
    }

    pool.close().await;
    tracing::info!("Shutdown complete");
}

/// `RUST_LOG` filters; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "museum_api=debug,museum_devices=info,museum_assistant=info,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, verify, migrate and optionally seed. Any failure aborts startup.
async fn open_database(config: &ServerConfig) -> DbPool {
    let pool = museum_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open database");
    museum_db::health_check(&pool)
        .await
        .expect("Database is not answering queries");
    museum_db::run_migrations(&pool)
        .await
        .expect("Failed to apply migrations");
    tracing::info!(url = %config.database_url, "Database ready");

    if config.seed_sample_exhibits {
        museum_db::seed_sample_exhibits(&pool)
            .await
            .expect("Failed to seed sample exhibits");
    }
    pool
}

/// Start the poll, retention and camera capture loops that are enabled.
fn spawn_jobs(state: &AppState, config: &ServerConfig) -> Vec<JoinHandle<()>> {
    let mut jobs = Vec::new();

    if config.jobs.monitor_poll_interval_secs > 0 {
        jobs.push(tokio::spawn(background::monitor_poll::run(
            state.pool.clone(),
            state.monitor.clone(),
            Duration::from_secs(config.jobs.monitor_poll_interval_secs),
            state.shutdown.clone(),
        )));
    }

    if config.jobs.reading_retention_hours > 0 {
        jobs.push(tokio::spawn(background::reading_retention::run(
            state.pool.clone(),
            config.jobs.reading_retention_hours,
            state.shutdown.clone(),
        )));
    }

    if let Some(camera) = &state.camera {
        jobs.push(tokio::spawn(museum_devices::camera::run_capture_loop(
            Arc::clone(camera),
            Arc::clone(&state.frames),
            frame_period(config.camera.fps),
            state.shutdown.clone(),
        )));
    }

    jobs
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}

// File: services/gactivity_backend/src/main.rs
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use gactivity_backend::routes;
use gactivity_backend::service_factory::build_app_state;
use gactivity_common::logging;
use gactivity_config::load_config;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// How often expired sessions are dropped.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("Failed to load config: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = logging::init(&config.logging);

    let state = match build_app_state(config.clone()).await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to initialize services: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired sessions", purged);
            }
        }
    });

    let app = routes(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {}", addr, err);
            return ExitCode::FAILURE;
        }
    };
    info!("Starting server at http://{}", addr);

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

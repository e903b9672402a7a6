//! Logging setup for the gactivity services.
//!
//! The subscriber always writes to stdout. A daily rolling file and the
//! systemd journal can be added through [`LoggingConfig`].

use gactivity_config::LoggingConfig;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Noisy dependency targets kept at `warn` unless RUST_LOG says otherwise.
const QUIET_TARGETS: &str = "hyper=warn,hyper_util=warn,rustls=warn,reqwest=warn,h2=warn";

/// Initialize the tracing subscriber from the logging configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. The returned guard must be
/// held for the lifetime of the process when file logging is enabled,
/// otherwise buffered lines are lost on shutdown.
///
/// # Examples
///
/// ```
/// use gactivity_config::LoggingConfig;
///
/// let _guard = gactivity_common::logging::init(&LoggingConfig::default());
/// ```
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", config.level, QUIET_TARGETS)));

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(file_layer);

    #[cfg(target_os = "linux")]
    let result = {
        let journald_layer = if config.journald {
            tracing_journald::layer()
                .map_err(|e| eprintln!("journald unavailable: {e}"))
                .ok()
        } else {
            None
        };
        registry.with(journald_layer).try_init()
    };
    #[cfg(not(target_os = "linux"))]
    let result = registry.try_init();

    // try_init fails when a global subscriber is already set (tests)
    if result.is_ok() {
        info!("Logging initialized at level: {}", config.level);
    }

    guard
}

/// Log a result, with different messages for success and error cases.
///
/// Returns the original result so it can be used in a chain.
pub fn log_result<T, E: std::fmt::Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => error!("{}: {}", error_context, e),
    }
    result
}

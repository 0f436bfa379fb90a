//! Structured logging for Orrery.
//!
//! Console output with uptime timestamps and module paths, plus a JSON log
//! file in debug builds. `RUST_LOG` wins over the configured filter. Records
//! emitted through the `log` facade (the render and space crates) are
//! forwarded into the same subscriber.

use std::path::Path;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "orrery.log";

/// Install the global tracing subscriber.
///
/// * `log_dir` - directory for the JSON log file (debug builds only)
/// * `debug_build` - whether to write the JSON log file at all
/// * `filter` - configured filter directives; empty or `None` means the default
///
/// Fails only if a global subscriber is already installed. A log directory
/// that cannot be created is skipped silently and console logging still runs.
///
/// ```no_run
/// orrery_log::init_logging(None, false, Some("debug")).ok();
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    filter: Option<&str>,
) -> Result<(), TryInitError> {
    let filter_str = resolve_filter(filter);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // the atlas builder runs on its own named thread
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init();
    }

    subscriber.try_init()
}

/// The filter string to use for a configured level.
pub fn resolve_filter(configured: Option<&str>) -> String {
    match configured.map(str::trim) {
        Some(level) if !level.is_empty() => level.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// An `EnvFilter` with [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

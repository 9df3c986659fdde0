use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes console logging, plus daily-rotated JSON file logging when a
/// log directory is configured.
///
/// Console output goes to stderr; stdout carries the integration document in
/// one-shot mode. The returned guard must be held until exit so buffered file
/// logs are flushed.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match config.dir.as_deref().filter(|dir| prepare_log_dir(dir)) {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "feed_integrator.log");
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise info for everything
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed_integrator=info,info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

/// Creates the log directory. On failure file logging is skipped and the
/// reason goes to stderr, since no subscriber is installed yet.
fn prepare_log_dir(dir: &Path) -> bool {
    match fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!(
                "warning: cannot create log directory {}: {}; file logging disabled",
                dir.display(),
                e
            );
            false
        }
    }
}

//! Logging configuration module for the dashboard
//!
//! While the dashboard owns the terminal, nothing may log to stdout: a
//! stray line would land in the middle of a frame. Events are therefore
//! captured into the bot store (shown on the logs screen) and optionally
//! mirrored to a file.
//!
//! # Environment Variables
//! - `RUST_LOG`: Log level filter (default: `hft_dashboard=info`)
//! - `LOG_FORMAT`: File output format - `json` (default) or `pretty`
//! - `LOG_FILE`: Optional path for file output

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{prelude::*, EnvFilter, Layer};

use crate::core::BotStore;
use crate::error::AppError;
use crate::tui::logging::DashboardLogLayer;

/// Flag to track if logging has been initialized (prevents double-init)
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "hft_dashboard=info";

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level filter string (e.g., "hft_dashboard=debug")
    pub level_filter: String,
    /// Use pretty format instead of JSON for the file output
    pub use_pretty_format: bool,
    /// Optional file receiving formatted output
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
            log_file: None,
        }
    }
}

impl LoggingConfig {
    /// Create a LoggingConfig from `RUST_LOG`, `LOG_FORMAT` and `LOG_FILE`
    pub fn from_env() -> Self {
        let level_filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "pretty")
            .unwrap_or(false);
        let log_file = std::env::var("LOG_FILE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            level_filter,
            use_pretty_format,
            log_file,
        }
    }
}

/// Initialize logging.
///
/// `capture` receives every event for the logs screen. Subsequent calls
/// are no-ops.
pub fn init_logging(config: LoggingConfig, capture: Option<Arc<BotStore>>) -> Result<(), AppError> {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = if config.use_pretty_format {
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed()
            } else {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .boxed()
            };
            Some(layer)
        }
        None => None,
    };

    let capture_layer = capture.map(DashboardLogLayer::new);

    // Another subscriber may already be installed (e.g. by a test harness)
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(capture_layer)
        .with(env_filter)
        .try_init();

    Ok(())
}

/// Log a fatal startup error before `init_logging` has run.
///
/// The event goes through a short-lived subscriber writing to `writer`
/// (stderr in the binary); the global subscriber is left untouched.
pub fn log_startup_error<W>(err: &AppError, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        error!(event_type = "CONFIG_FAILED", error = %err, "Configuration failed");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_startup_error_writes_event() {
        let buf = SharedBuf::default();
        let sink = buf.clone();
        let err = AppError::Config("FPS cannot be higher than 14 (got 15)".into());

        log_startup_error(&err, move || sink.clone());

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("ERROR"), "Got: {}", output);
        assert!(output.contains("CONFIG_FAILED"), "Got: {}", output);
        assert!(output.contains("FPS cannot be higher than 14"), "Got: {}", output);
    }

    #[test]
    #[serial]
    fn test_logging_config_defaults() {
        std::env::remove_var("RUST_LOG");
        std::env::remove_var("LOG_FORMAT");
        std::env::remove_var("LOG_FILE");

        let config = LoggingConfig::from_env();
        assert_eq!(config, LoggingConfig::default());
    }

    #[test]
    #[serial]
    fn test_logging_config_from_env() {
        std::env::set_var("RUST_LOG", "hft_dashboard=debug");
        std::env::set_var("LOG_FORMAT", "Pretty");
        std::env::set_var("LOG_FILE", "/tmp/dashboard.log");

        let config = LoggingConfig::from_env();

        std::env::remove_var("RUST_LOG");
        std::env::remove_var("LOG_FORMAT");
        std::env::remove_var("LOG_FILE");

        assert_eq!(config.level_filter, "hft_dashboard=debug");
        assert!(config.use_pretty_format);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/dashboard.log")));
    }
}

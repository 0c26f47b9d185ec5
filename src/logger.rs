//! Logging setup.

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::Result;
use crate::setting::Settings;
use crate::utility::get_folder_path;

/// Log level constants on the 10/20/30/40/50 scale
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;
pub const CRITICAL: i32 = 50;

/// Convert integer log level to tracing Level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=10 => Level::DEBUG,
        11..=20 => Level::INFO,
        21..=30 => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Convert integer log level to string
pub fn level_to_string(level: i32) -> &'static str {
    match level {
        i32::MIN..=10 => "DEBUG",
        11..=20 => "INFO",
        21..=30 => "WARNING",
        31..=40 => "ERROR",
        _ => "CRITICAL",
    }
}

/// Initialize the global subscriber from settings.
///
/// Returns early without touching the subscriber when `log.active` is off.
/// Calling this twice fails inside `tracing_subscriber`; the second call is
/// reported as a warning and ignored.
pub fn init_logger(settings: &Settings) -> Result<()> {
    if !settings.get_bool("log.active").unwrap_or(true) {
        return Ok(());
    }

    let log_level = settings.get_int("log.level").unwrap_or(INFO as i64) as i32;
    let log_console = settings.get_bool("log.console").unwrap_or(true);
    let log_file = settings.get_bool("log.file").unwrap_or(false);

    let level = level_from_int(log_level);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let console_layer = log_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(true)
    });

    let file_layer = if log_file {
        let log_path = get_log_file_path();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        Some(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        )
    } else {
        None
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        tracing::warn!("logger already initialized: {}", e);
    } else {
        tracing::debug!("logging at {} level", level_to_string(log_level));
    }

    Ok(())
}

/// Get the log file path for today
fn get_log_file_path() -> PathBuf {
    let log_folder = get_folder_path("log");
    let today = Local::now().format("%Y%m%d").to_string();
    log_folder.join(format!("figkit_{}.log", today))
}

/// Named logger, used to tag messages from one figure or callback
#[derive(Debug, Clone)]
pub struct Logger {
    pub name: String,
}

impl Logger {
    /// Create a new logger with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Log a debug message
    pub fn debug(&self, msg: &str) {
        tracing::debug!(logger = %self.name, "{}", msg);
    }

    /// Log an info message
    pub fn info(&self, msg: &str) {
        tracing::info!(logger = %self.name, "{}", msg);
    }

    /// Log a warning message
    pub fn warn(&self, msg: &str) {
        tracing::warn!(logger = %self.name, "{}", msg);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("figkit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_int() {
        assert_eq!(level_from_int(DEBUG), Level::DEBUG);
        assert_eq!(level_from_int(INFO), Level::INFO);
        assert_eq!(level_from_int(WARNING), Level::WARN);
        assert_eq!(level_from_int(ERROR), Level::ERROR);
        assert_eq!(level_from_int(CRITICAL), Level::ERROR);
    }

    #[test]
    fn test_level_to_string() {
        assert_eq!(level_to_string(DEBUG), "DEBUG");
        assert_eq!(level_to_string(INFO), "INFO");
        assert_eq!(level_to_string(WARNING), "WARNING");
        assert_eq!(level_to_string(ERROR), "ERROR");
        assert_eq!(level_to_string(CRITICAL), "CRITICAL");
    }

    #[test]
    fn test_logger_new() {
        let logger = Logger::new("HistoryPlotter");
        assert_eq!(logger.name, "HistoryPlotter");
        logger.warn("no subscriber installed, message is dropped");
    }

    #[test]
    fn test_init_logger_inactive_is_noop() {
        let settings = Settings::with_defaults();
        settings.set("log.active", crate::setting::SettingValue::Bool(false));
        assert!(init_logger(&settings).is_ok());
    }
}

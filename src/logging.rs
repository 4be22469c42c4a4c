//! Logging setup with rotation support

use crate::error::{AppError, Result};
use crate::settings::config::LoggingConfig as LoggingSettings;
use log::LevelFilter;
use simplelog::{CombinedLogger, ConfigBuilder, SharedLogger, WriteLogger};
#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Default log filename
const LOG_FILENAME: &str = "status_tray.log";

/// Resolved logging setup
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
    pub max_file_size: u64,
    pub max_files: u32,
}

impl LoggingConfig {
    /// Combine the `[logging]` config section with the log directory
    pub fn from_settings(settings: &LoggingSettings, log_dir: PathBuf) -> Self {
        Self {
            level: parse_log_level(&settings.level),
            log_dir,
            max_file_size: settings.max_file_size,
            max_files: settings.max_files,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(LOG_FILENAME)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default(), PathBuf::from("."))
    }
}

/// Initialize the logging system: rotated log file, plus the terminal in debug builds
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    fs::create_dir_all(&config.log_dir)?;

    let log_path = config.log_path();
    rotate_logs(&log_path, config.max_file_size, config.max_files)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_location_level(LevelFilter::Debug)
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    #[cfg(debug_assertions)]
    {
        loggers.push(TermLogger::new(
            config.level,
            log_config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    loggers.push(WriteLogger::new(config.level, log_config, log_file));

    CombinedLogger::init(loggers)
        .map_err(|e| AppError::ConfigError(format!("Logger init failed: {}", e)))?;

    log::info!("Logging initialized at level {:?}", config.level);
    log::info!("Log file: {:?}", log_path);

    Ok(())
}

/// Path of the `index`-th rotated file (`status_tray.log.1`, ...)
fn rotated_path(log_path: &Path, index: u32) -> PathBuf {
    log_path.with_extension(format!("log.{}", index))
}

/// Shift `.log` to `.log.1`, `.log.1` to `.log.2`, ... once the log exceeds `max_size`.
/// At most `max_files` rotated files are kept.
pub fn rotate_logs(log_path: &Path, max_size: u64, max_files: u32) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let size = fs::metadata(log_path)?.len();
    if size < max_size {
        return Ok(());
    }

    log::debug!("Rotating logs, current size: {} bytes", size);

    let oldest = rotated_path(log_path, max_files);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }

    for i in (1..max_files).rev() {
        let from = rotated_path(log_path, i);
        if from.exists() {
            fs::rename(&from, rotated_path(log_path, i + 1))?;
        }
    }

    fs::rename(log_path, rotated_path(log_path, 1))?;
    Ok(())
}

/// Parse log level from string, defaulting to info
pub fn parse_log_level(level_str: &str) -> LevelFilter {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("info"), LevelFilter::Info);
        assert_eq!(parse_log_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_log_level(" Warning "), LevelFilter::Warn);
        assert_eq!(parse_log_level("invalid"), LevelFilter::Info);
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            max_file_size: 1024,
            max_files: 2,
        };
        let config = LoggingConfig::from_settings(&settings, PathBuf::from("logs"));
        assert_eq!(config.level, LevelFilter::Debug);
        assert_eq!(config.log_path(), PathBuf::from("logs").join(LOG_FILENAME));
    }

    #[test]
    fn test_rotation_shifts_and_caps_files() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join(LOG_FILENAME);

        for round in 0..4 {
            fs::write(&log_path, format!("round {}", round)).unwrap();
            rotate_logs(&log_path, 1, 2).unwrap();
        }

        assert!(!log_path.exists());
        assert_eq!(
            fs::read_to_string(rotated_path(&log_path, 1)).unwrap(),
            "round 3"
        );
        assert_eq!(
            fs::read_to_string(rotated_path(&log_path, 2)).unwrap(),
            "round 2"
        );
        assert!(!rotated_path(&log_path, 3).exists());
    }

    #[test]
    fn test_small_log_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join(LOG_FILENAME);
        fs::write(&log_path, "short").unwrap();

        rotate_logs(&log_path, 1024, 3).unwrap();
        assert!(log_path.exists());
        assert!(!rotated_path(&log_path, 1).exists());
    }
}

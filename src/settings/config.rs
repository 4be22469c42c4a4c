//! Configuration loading, validation, and saving

use crate::error::{AppError, Result};
use crate::tray::icon::IconSet;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current configuration version
pub const CONFIG_VERSION: u32 = 1;

/// Portable mode marker filename
const PORTABLE_MARKER: &str = "portable.txt";

/// Configuration filename
const CONFIG_FILENAME: &str = "config.toml";

/// Directory name under the user config dir
const APP_DIR_NAME: &str = "status-tray";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub config_version: u32,

    /// Tray item behavior
    #[serde(default)]
    pub tray: TrayConfig,

    /// Icon files per state
    #[serde(default)]
    pub icons: IconSet,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrayConfig {
    /// Hover text; empty shows no tooltip
    #[serde(default = "default_tooltip")]
    pub tooltip: String,

    /// Let the platform open the context menu on left click too
    #[serde(default)]
    pub menu_on_left_click: bool,

    /// UI loop tick in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u32,

    /// Click handlers running longer than this are logged
    #[serde(default = "default_handler_budget")]
    pub handler_budget_ms: u32,
}

fn default_tooltip() -> String {
    "Status Tray".to_string()
}

fn default_poll_interval() -> u32 {
    50
}

fn default_handler_budget() -> u32 {
    100
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            tooltip: default_tooltip(),
            menu_on_left_click: false,
            poll_interval_ms: default_poll_interval(),
            handler_budget_ms: default_handler_budget(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum log file size in bytes
    #[serde(default = "default_max_log_size")]
    pub max_file_size: u64,

    /// Number of rotated log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_log_files() -> u32 {
    3
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_file_size: default_max_log_size(),
            max_files: default_max_log_files(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            tray: TrayConfig::default(),
            icons: IconSet::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TrayConfig {
    pub fn tooltip(&self) -> Option<String> {
        Some(self.tooltip.clone()).filter(|t| !t.is_empty())
    }
}

impl AppConfig {
    /// Reject values the tray loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tray.poll_interval_ms == 0 {
            return Err(AppError::ConfigError(
                "tray.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        for (name, path) in [
            ("idle", &self.icons.idle),
            ("busy", &self.icons.busy),
            ("disabled", &self.icons.disabled),
        ] {
            if path.as_os_str().is_empty() {
                return Err(AppError::ConfigError(format!("icons.{} is empty", name)));
            }
        }

        if self.logging.max_files == 0 {
            return Err(AppError::ConfigError(
                "logging.max_files must be at least 1".to_string(),
            ));
        }

        if self.config_version > CONFIG_VERSION {
            warn!(
                "Config version {} is newer than supported version {}",
                self.config_version, CONFIG_VERSION
            );
        }

        Ok(())
    }
}

/// Manages configuration loading and saving
pub struct ConfigManager {
    config_path: PathBuf,
    is_portable: bool,
}

impl ConfigManager {
    /// Create a new config manager, detecting portable vs installed mode
    pub fn new() -> Result<Self> {
        let (config_path, is_portable) = Self::detect_config_path()?;
        Ok(Self {
            config_path,
            is_portable,
        })
    }

    /// Use an explicit config file; logs go next to it
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            is_portable: true,
        }
    }

    /// Portable when a marker file sits next to the executable, else the user config dir
    fn detect_config_path() -> Result<(PathBuf, bool)> {
        let exe_path = std::env::current_exe()
            .map_err(|e| AppError::ConfigError(format!("Could not get exe path: {}", e)))?;
        let exe_dir = exe_path.parent().ok_or_else(|| {
            AppError::ConfigError("Could not get exe directory".to_string())
        })?;

        if exe_dir.join(PORTABLE_MARKER).exists() {
            debug!("Portable mode detected via marker file");
            return Ok((exe_dir.join(CONFIG_FILENAME), true));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::ConfigError("No user config directory".to_string()))?
            .join(APP_DIR_NAME);
        Ok((config_dir.join(CONFIG_FILENAME), false))
    }

    pub fn is_portable(&self) -> bool {
        self.is_portable
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the log directory
    pub fn log_dir(&self) -> PathBuf {
        let base = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        if self.is_portable {
            base.join("logs")
        } else {
            base
        }
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| AppError::ConfigError(format!("Could not read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Could not parse config: {}", e)))?;
        config.validate()?;

        info!("Loaded config from {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| AppError::ConfigError(format!("Could not serialize config: {}", e)))?;

        fs::write(&self.config_path, content)
            .map_err(|e| AppError::ConfigError(format!("Could not write config: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }
}

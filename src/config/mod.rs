//! Configuration module for kinetic-stage
//!
//! This module handles runtime configuration including:
//! - Calibration thresholds for the metric extractor
//! - Per-channel smoothing factors
//! - Preview and stage canvas dimensions
//! - Scheduler pacing and logging
//!
//! # Config Location
//!
//! The default config file lives in the platform-appropriate config
//! directory under `dev.kinetic-stage`:
//! - **Linux**: `~/.config/dev.kinetic-stage/stage.toml`
//! - **macOS**: `~/Library/Application Support/dev.kinetic-stage/stage.toml`
//! - **Windows**: `%APPDATA%\dev.kinetic-stage\stage.toml`
//!
//! Both TOML and JSON are accepted; the format is picked from the file
//! extension (anything other than `.json` is read as TOML).
//!
//! # Example
//!
//! ```ignore
//! use kinetic_stage::config::StageConfig;
//!
//! let mut config = StageConfig::load_or_default(StageConfig::default_path()?);
//! config.smoothing.presence_alpha = 0.2;
//! config.validate()?;
//! config.save("my_stage.toml")?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{Result, StageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config/data directories
pub const APP_ID: &str = "dev.kinetic-stage";

/// Default config filename
pub const CONFIG_FILE: &str = "stage.toml";

/// Default display refresh rate in Hz
pub const DEFAULT_REFRESH_HZ: u32 = 60;

// ==================== Directories ====================

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the application data directory path (log files)
pub fn data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// On-disk format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

// ==================== Stage Config ====================

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StageConfig {
    /// Metric extractor calibration
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Control smoother factors
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Preview image settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Stage renderer settings
    #[serde(default)]
    pub stage: StageRenderConfig,

    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl StageConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the default config file.
    pub fn default_path() -> Result<PathBuf> {
        config_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .ok_or_else(|| StageError::Config("Could not determine config directory".to_string()))
    }

    /// Parse a config from text in the given format.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: StageConfig = match format {
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| StageError::Config(format!("Failed to parse TOML config: {}", e)))?,
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| StageError::Config(format!("Failed to parse JSON config: {}", e)))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StageError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_str_with_format(&content, ConfigFormat::from_path(path))
    }

    /// Load a config file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Serialize to text in the given format.
    pub fn to_string_with_format(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| StageError::Serialization(format!("Failed to serialize config: {}", e))),
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| StageError::Serialization(format!("Failed to serialize config: {}", e))),
        }
    }

    /// Save config to disk, creating the parent directory if needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StageError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = self.to_string_with_format(ConfigFormat::from_path(path))?;
        std::fs::write(path, content).map_err(|e| {
            StageError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check every section for values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.calibration.validate()?;
        self.smoothing.validate()?;
        self.preview.validate()?;
        self.stage.validate()?;
        if self.scheduler.refresh_hz == 0 {
            return Err(StageError::Config(
                "scheduler.refresh_hz must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== Preview Config ====================

/// Shared dimensions for every node preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 90,
        }
    }
}

impl PreviewConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StageError::Config(format!(
                "preview size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

// ==================== Stage Render Config ====================

/// Stage canvas settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageRenderConfig {
    pub width: u32,
    pub height: u32,
    /// Neutral background shown when no frame is available (RGBA)
    pub background: [u8; 4],
    /// Orb color at zero pinch (RGBA)
    pub orb_color: [u8; 4],
}

impl Default for StageRenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            background: [12, 12, 16, 255],
            orb_color: [90, 170, 255, 255],
        }
    }
}

impl StageRenderConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StageError::Config(format!(
                "stage size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

// ==================== Scheduler Config ====================

/// Frame scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Display refresh rate used to pace ticks
    pub refresh_hz: u32,

    /// Write logs to a rolling file in the data directory
    pub log_to_file: bool,

    /// Log file directory override
    pub log_dir: Option<PathBuf>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_hz: DEFAULT_REFRESH_HZ,
            log_to_file: false,
            log_dir: None,
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = StageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.refresh_hz, DEFAULT_REFRESH_HZ);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/stage.json")),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/stage.toml")),
            ConfigFormat::Toml
        );
        assert_eq!(ConfigFormat::from_path(Path::new("stage")), ConfigFormat::Toml);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = StageConfig::from_str_with_format(
            "[smoothing]\npresence_alpha = 0.3\n",
            ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(config.smoothing.presence_alpha, 0.3);
        assert_eq!(config.calibration, CalibrationConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = StageConfig::from_str_with_format(
            r#"{"smoothing": {"jaw_alpha": 1.5}}"#,
            ConfigFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("jaw_alpha"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StageConfig::default();
        config.calibration.jaw_max = 0.12;
        config.preview.width = 320;

        for name in ["stage.toml", "nested/stage.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            let loaded = StageConfig::load(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_load_or_default_on_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(StageConfig::load_or_default(&missing), StageConfig::default());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(StageConfig::load_or_default(&corrupt), StageConfig::default());
    }

    #[test]
    fn test_zero_refresh_rate_rejected() {
        let mut config = StageConfig::default();
        config.scheduler.refresh_hz = 0;
        assert!(config.validate().is_err());
    }
}

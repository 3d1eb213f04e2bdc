//! Configuration file support for the flyer view.
//!
//! This module provides serialization and deserialization of viewer settings
//! (zoom limits, animation timing, gesture thresholds, logging), so hosts can
//! ship a JSON file instead of hard-coding them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Log level setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Zoom applied when a flyer finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InitialZoom {
    /// Smallest scale that still fills the viewport with content
    #[default]
    Fill,
    /// Content width matches the viewport width
    FitWidth,
    /// Content height matches the viewport height
    FitHeight,
    /// Explicit scale
    Scale(f64),
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Viewer configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Smallest zoom scale
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,

    /// Largest zoom scale
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Zoom applied after loading
    #[serde(default)]
    pub initial_zoom: InitialZoom,

    /// Duration of animated zooms in milliseconds
    #[serde(default = "default_zoom_animation_ms")]
    pub zoom_animation_ms: u64,

    /// Side of the square zoomed into by a double tap, in content units
    #[serde(default = "default_double_tap_zoom_size")]
    pub double_tap_zoom_size: f64,

    /// Tap classification thresholds
    #[serde(default)]
    pub gestures: GestureConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_min_scale() -> f64 {
    constants::DEFAULT_MIN_SCALE
}

fn default_max_scale() -> f64 {
    constants::DEFAULT_MAX_SCALE
}

fn default_zoom_animation_ms() -> u64 {
    constants::DEFAULT_ZOOM_ANIMATION_MS
}

fn default_double_tap_zoom_size() -> f64 {
    constants::DEFAULT_DOUBLE_TAP_ZOOM_SIZE
}

/// Thresholds used by the tap classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Maximum gap between two taps of a double tap
    #[serde(default = "default_double_tap_interval_ms")]
    pub double_tap_interval_ms: u64,

    /// Hold time before a press becomes a long press
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,

    /// Movement in device pixels that cancels a tap
    #[serde(default = "default_tap_slop")]
    pub tap_slop: f64,
}

fn default_double_tap_interval_ms() -> u64 {
    constants::DEFAULT_DOUBLE_TAP_INTERVAL_MS
}

fn default_long_press_ms() -> u64 {
    constants::DEFAULT_LONG_PRESS_MS
}

fn default_tap_slop() -> f64 {
    constants::DEFAULT_TAP_SLOP
}

impl GestureConfig {
    pub fn double_tap_interval(&self) -> Duration {
        Duration::from_millis(self.double_tap_interval_ms)
    }

    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            double_tap_interval_ms: default_double_tap_interval_ms(),
            long_press_ms: default_long_press_ms(),
            tap_slop: default_tap_slop(),
        }
    }
}

impl ViewerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            initial_zoom: InitialZoom::default(),
            zoom_animation_ms: default_zoom_animation_ms(),
            double_tap_zoom_size: default_double_tap_zoom_size(),
            gestures: GestureConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    pub fn with_scale_limits(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn with_initial_zoom(mut self, initial_zoom: InitialZoom) -> Self {
        self.initial_zoom = initial_zoom;
        self
    }

    pub fn zoom_animation_duration(&self) -> Duration {
        Duration::from_millis(self.zoom_animation_ms)
    }

    /// Check that the values describe a usable viewer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.min_scale) || !positive(self.max_scale) {
            return Err(ConfigError::invalid(format!(
                "scale limits must be positive (min {}, max {})",
                self.min_scale, self.max_scale
            )));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::invalid(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if let InitialZoom::Scale(scale) = self.initial_zoom {
            if !positive(scale) {
                return Err(ConfigError::invalid(format!("initial scale {scale} must be positive")));
            }
        }
        if !positive(self.double_tap_zoom_size) {
            return Err(ConfigError::invalid("double_tap_zoom_size must be positive"));
        }
        if !self.gestures.tap_slop.is_finite() || self.gestures.tap_slop < 0.0 {
            return Err(ConfigError::invalid("tap_slop must be zero or positive"));
        }
        Ok(())
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write configuration to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "flyerkit.json"
    }

    /// Get the default config file path.
    /// Returns None on WASM (no filesystem access).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("flyerkit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("flyerkit")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Values parse but cannot be used
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Create an invalid configuration error with a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ViewerConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.validate().is_ok());
        assert_eq!(config.zoom_animation_duration(), Duration::from_millis(300));
    }

    #[test]
    fn test_rejects_inverted_scale_limits() {
        let config = ViewerConfig::new().with_scale_limits(2.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let config = ViewerConfig::new().with_scale_limits(0.0, 1.0);
        assert!(config.validate().is_err());

        let config = ViewerConfig::new().with_initial_zoom(InitialZoom::Scale(-1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = ViewerConfig::from_json(r#"{"version": 1, "max_scale": 8.0}"#)
            .expect("Failed to parse config");
        assert_eq!(config.max_scale, 8.0);
        assert_eq!(config.min_scale, constants::DEFAULT_MIN_SCALE);
        assert_eq!(config.initial_zoom, InitialZoom::Fill);
        assert_eq!(config.gestures, GestureConfig::default());
    }

    #[test]
    fn test_initial_zoom_json_shape() {
        let config = ViewerConfig::new().with_initial_zoom(InitialZoom::Scale(1.5));
        let json = config.to_json().expect("Failed to export JSON");
        assert!(json.contains("\"scale\": 1.5"));

        let parsed = ViewerConfig::from_json(&json).expect("Failed to import JSON");
        assert_eq!(parsed.initial_zoom, InitialZoom::Scale(1.5));

        let parsed = ViewerConfig::from_json(r#"{"version": 1, "initial_zoom": "fit_height"}"#)
            .expect("Failed to import JSON");
        assert_eq!(parsed.initial_zoom, InitialZoom::FitHeight);
    }

    #[test]
    fn test_version_too_new() {
        let result = ViewerConfig::from_json(r#"{"version": 99}"#);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew {
                file_version: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_values_rejected_on_import() {
        let result = ViewerConfig::from_json(r#"{"version": 1, "min_scale": 5.0, "max_scale": 1.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}

//! Configuration loading
//!
//! Face tunables live in a TOML file under the platform config directory.
//! The file is optional and only ever read; every field has a default.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::style::Color;

/// Muted hands stay visible and still differ from unmuted ones
pub const MUTED_ALPHA_RANGE: std::ops::RangeInclusive<u8> = 1..=254;

/// Error type for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("muted_hand_alpha must be between 1 and 254, got {0}")]
    InvalidMutedAlpha(u8),
}

/// Tunables for the face engine and its host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    /// IANA timezone name; `None` follows the system zone
    pub timezone: Option<String>,
    /// Directory holding `bg.png` and `hour.png`
    pub asset_dir: Option<PathBuf>,
    /// Interactive redraw interval in milliseconds
    pub redraw_interval_ms: u64,
    /// Taps needed inside one window to fire the trigger action
    pub tap_threshold: u32,
    /// Length of the tap window in milliseconds, measured from its first tap
    pub tap_window_ms: u64,
    /// Hand alpha while muted; dimmed but never hidden, so `1..=254`
    pub muted_hand_alpha: u8,
    pub show_second_hand: bool,
    pub hand_color: Color,
    pub accent_color: Color,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            asset_dir: None,
            redraw_interval_ms: 1000,
            tap_threshold: 12,
            tap_window_ms: 3000,
            muted_hand_alpha: 100,
            show_second_hand: true,
            hand_color: Color::WHITE,
            accent_color: Color::rgb(102, 204, 255),
        }
    }
}

impl FaceConfig {
    /// Parse a config from TOML text, filling gaps with defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: FaceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but break the face
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MUTED_ALPHA_RANGE.contains(&self.muted_hand_alpha) {
            return Err(ConfigError::InvalidMutedAlpha(self.muted_hand_alpha));
        }
        Ok(())
    }
}

/// Get the base configuration directory for all faces
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "clock-series", "faces").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the configuration file path for a specific face
pub fn config_path(face_name: &str) -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(format!("{}.toml", face_name)))
}

/// Load configuration for a specific face
///
/// Returns `None` if the config file doesn't exist yet.
/// Returns an error if the file exists but can't be parsed.
pub fn load_config(face_name: &str) -> Result<Option<FaceConfig>, ConfigError> {
    let path = config_path(face_name).ok_or(ConfigError::NoConfigDir)?;

    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&path)?;
    FaceConfig::from_toml_str(&contents).map(Some)
}

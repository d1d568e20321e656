//! Simulation settings
//!
//! Two viewport presets (phone vs. tablet) pick sprite size and speed range;
//! everything else is a tunable constant with the defaults from `consts`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Viewport size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewportPreset {
    #[default]
    Compact,
    Large,
}

impl ViewportPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewportPreset::Compact => "Compact",
            ViewportPreset::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" | "phone" => Some(ViewportPreset::Compact),
            "large" | "tablet" => Some(ViewportPreset::Large),
            _ => None,
        }
    }

    /// Pick the preset for a viewport width in density-independent pixels
    pub fn for_width(width_dp: f32) -> Self {
        if width_dp >= LARGE_VIEWPORT_MIN_WIDTH {
            ViewportPreset::Large
        } else {
            ViewportPreset::Compact
        }
    }

    /// Sprite side length in px
    pub fn sprite_size(&self) -> f32 {
        match self {
            ViewportPreset::Compact => COMPACT_SPRITE_SIZE,
            ViewportPreset::Large => LARGE_SPRITE_SIZE,
        }
    }

    /// Per-axis speed range in px/tick
    pub fn speed_range(&self) -> (f32, f32) {
        match self {
            ViewportPreset::Compact => (COMPACT_SPEED_MIN, COMPACT_SPEED_MAX),
            ViewportPreset::Large => (LARGE_SPEED_MIN, LARGE_SPEED_MAX),
        }
    }
}

/// Rejected configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("population size must be at least 1")]
    EmptyPopulation,
    #[error("invalid speed range [{min}, {max}]")]
    InvalidSpeedRange { min: f32, max: f32 },
    #[error("sprite size must be positive, got {0}")]
    InvalidSpriteSize(f32),
    #[error("{0} duration must be non-zero")]
    ZeroDuration(&'static str),
    #[error("escape distance multiplier must be at least 1, got {0}")]
    InvalidEscapeMultiplier(f32),
}

/// Settings file I/O failure
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunable simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Preset the sprite size and speeds were taken from
    pub preset: ViewportPreset,
    /// Animals on screen at once
    pub population_size: usize,
    /// Per-axis speed magnitude range (px/tick)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Sprite side length (px); also the collision diameter
    pub sprite_size: f32,
    pub shake_duration_ms: u64,
    pub escape_duration_ms: u64,
    /// Escape travel distance as a multiple of max(width, height)
    pub escape_distance_multiplier: f32,
    /// Single-display variant: only one animal may react at a time
    pub exclusive_reaction: bool,
    /// Motion ticks allowed per advance call
    pub max_substeps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_preset(ViewportPreset::Compact)
    }
}

impl SimConfig {
    /// Create a config with the preset's sprite size and speed range
    pub fn from_preset(preset: ViewportPreset) -> Self {
        let (speed_min, speed_max) = preset.speed_range();
        Self {
            preset,
            population_size: DEFAULT_POPULATION,
            speed_min,
            speed_max,
            sprite_size: preset.sprite_size(),
            shake_duration_ms: SHAKE_DURATION_MS,
            escape_duration_ms: ESCAPE_DURATION_MS,
            escape_distance_multiplier: ESCAPE_DISTANCE_MULTIPLIER,
            exclusive_reaction: false,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    /// Apply a preset (updates preset-dependent settings only)
    pub fn apply_preset(&mut self, preset: ViewportPreset) {
        let (speed_min, speed_max) = preset.speed_range();
        self.preset = preset;
        self.sprite_size = preset.sprite_size();
        self.speed_min = speed_min;
        self.speed_max = speed_max;
    }

    pub fn shake_duration(&self) -> Duration {
        Duration::from_millis(self.shake_duration_ms)
    }

    pub fn escape_duration(&self) -> Duration {
        Duration::from_millis(self.escape_duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        let speeds_ok = self.speed_min.is_finite()
            && self.speed_max.is_finite()
            && self.speed_min >= 0.0
            && self.speed_min <= self.speed_max;
        if !speeds_ok {
            return Err(ConfigError::InvalidSpeedRange {
                min: self.speed_min,
                max: self.speed_max,
            });
        }
        if !(self.sprite_size.is_finite() && self.sprite_size > 0.0) {
            return Err(ConfigError::InvalidSpriteSize(self.sprite_size));
        }
        if self.shake_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("shake"));
        }
        if self.escape_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("escape"));
        }
        if !(self.escape_distance_multiplier >= 1.0) {
            return Err(ConfigError::InvalidEscapeMultiplier(
                self.escape_distance_multiplier,
            ));
        }
        Ok(())
    }

    /// Read a config file
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load from a JSON file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_width() {
        assert_eq!(ViewportPreset::for_width(360.0), ViewportPreset::Compact);
        assert_eq!(ViewportPreset::for_width(600.0), ViewportPreset::Large);
        assert_eq!(ViewportPreset::from_str("Tablet"), Some(ViewportPreset::Large));
        assert_eq!(ViewportPreset::from_str("huge"), None);
    }

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.population_size, 3);
        assert_eq!(config.shake_duration(), Duration::from_millis(1500));
        assert_eq!(config.escape_duration(), Duration::from_millis(700));
        assert_eq!((config.speed_min, config.speed_max), (3.0, 6.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_preset_keeps_timings() {
        let mut config = SimConfig::default();
        config.shake_duration_ms = 900;
        config.apply_preset(ViewportPreset::Large);
        assert_eq!(config.sprite_size, LARGE_SPRITE_SIZE);
        assert_eq!((config.speed_min, config.speed_max), (1.5, 3.0));
        assert_eq!(config.shake_duration_ms, 900);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SimConfig::default();
        config.speed_min = 7.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSpeedRange { .. })
        ));

        let mut config = SimConfig::default();
        config.population_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyPopulation));

        let mut config = SimConfig::default();
        config.escape_duration_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDuration("escape")));

        let mut config = SimConfig::default();
        config.escape_distance_multiplier = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"population_size": 5}"#).unwrap();
        assert_eq!(config.population_size, 5);
        assert_eq!(config.shake_duration_ms, SHAKE_DURATION_MS);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("animal_tap_settings_{}.json", std::process::id()));
        let mut config = SimConfig::from_preset(ViewportPreset::Large);
        config.exclusive_reaction = true;
        config.save_to(&path).unwrap();

        let loaded = SimConfig::load_from(&path);
        assert_eq!(loaded, config);
        std::fs::remove_file(&path).ok();

        let missing = SimConfig::load_from(&path);
        assert_eq!(missing, SimConfig::default());
    }
}

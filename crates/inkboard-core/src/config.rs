//! Engine configuration.

use crate::path::InkColor;
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for the drawing engine. Every field falls back to its default
/// when omitted from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest allowed zoom scale.
    pub min_scale: f64,
    /// Largest allowed zoom scale.
    pub max_scale: f64,
    /// Smoothing tolerance in screen pixels; divided by the scale at stroke end.
    pub smoothing_constant: f64,
    /// Eraser width in screen pixels.
    pub eraser_width: f64,
    /// Spacing of eraser motion samples (world units).
    pub eraser_step: f64,
    /// Spacing of polyline samples for hit testing (world units).
    pub polyline_sample_spacing: f64,
    /// Lassos shorter than this many screen pixels are discarded.
    pub lasso_min_length: f64,
    /// Zoom factor per wheel notch.
    pub wheel_zoom_factor: f64,
    /// Zoom factor for zoom-in/zoom-out commands.
    pub button_zoom_factor: f64,
    /// Maximum undo depth; `None` keeps everything.
    pub max_history: Option<usize>,
    pub default_color: InkColor,
    /// Default pen width (world units).
    pub default_width: f64,
    /// Shift applied to pasted paths (world units).
    pub paste_offset: f64,
    /// Frames the scrollbars take to fade out.
    pub scrollbar_fade_frames: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            smoothing_constant: 5.0,
            eraser_width: 10.0,
            eraser_step: 2.0,
            polyline_sample_spacing: 1.0,
            lasso_min_length: 50.0,
            wheel_zoom_factor: 1.1,
            button_zoom_factor: 1.25,
            max_history: Some(100),
            default_color: InkColor::black(),
            default_width: 3.0,
            paste_offset: 20.0,
            scrollbar_fade_frames: 30,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<FsPath>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(ConfigError::Invalid(format!(
                "scale range [{}, {}]",
                self.min_scale, self.max_scale
            )));
        }
        let positive = [
            ("smoothing_constant", self.smoothing_constant),
            ("eraser_step", self.eraser_step),
            ("polyline_sample_spacing", self.polyline_sample_spacing),
            ("wheel_zoom_factor", self.wheel_zoom_factor),
            ("button_zoom_factor", self.button_zoom_factor),
            ("default_width", self.default_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.eraser_width.is_finite() && self.eraser_width >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "eraser_width must be non-negative, got {}",
                self.eraser_width
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!((config.smoothing_constant - 5.0).abs() < f64::EPSILON);
        assert!((config.lasso_min_length - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.max_history, Some(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "max_scale": 4.0, "max_history": null }"#).unwrap();
        assert!((config.max_scale - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.max_history, None);
        assert!((config.eraser_step - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "min_scale": 0.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "eraser_step": -1.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(EngineConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "paste_offset": 5.0 }}"#).unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!((config.paste_offset - 5.0).abs() < f64::EPSILON);

        let missing = EngineConfig::from_file("/nonexistent/inkboard.json");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig {
            wheel_zoom_factor: 1.2,
            ..EngineConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}

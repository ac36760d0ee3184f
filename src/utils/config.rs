use crate::core::{
    Viewport, DEFAULT_CAMERA_RESOLUTION, DEFAULT_TRIM_RADIUS_M, SPEED_WINDOW_POINTS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Base map style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Terrain,
    Road,
    Hybrid,
    Satellite,
}

/// Numeric parameters of the track engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dwell radius trimmed from both ends of the track (meters)
    pub trim_radius_m: f64,
    /// Fraction of the track length between anchor candidates
    pub camera_resolution: f64,
    /// Points in the moving-average speed window
    pub speed_window_points: usize,
    /// Map viewport used for the initial zoom level
    pub viewport: Viewport,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trim_radius_m: DEFAULT_TRIM_RADIUS_M,
            camera_resolution: DEFAULT_CAMERA_RESOLUTION,
            speed_window_points: SPEED_WINDOW_POINTS,
            viewport: Viewport::default(),
        }
    }
}

/// Per-field display settings supplied by the formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Track polyline colour, `#RRGGBB`
    pub track_color: String,
    /// Elevation profile colour, `#RRGGBB`
    pub elevation_color: String,
    /// Track polyline width (px)
    pub track_stroke_width: u32,
    pub map_type: MapType,
    pub show_elevation_chart: bool,
    pub animate_track: bool,
    pub show_info_pane: bool,
    pub engine: EngineConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            track_color: "#006CAB".to_string(),
            elevation_color: "#006CAA".to_string(),
            track_stroke_width: 2,
            map_type: MapType::Terrain,
            show_elevation_chart: true,
            animate_track: false,
            show_info_pane: false,
            engine: EngineConfig::default(),
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid {parameter} {value:?}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("config I/O error: {message}")]
    IoError { message: String },
    #[error("config serialization error: {message}")]
    SerializationError { message: String },
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::SerializationError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;
        Self::from_json_str(&content)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializationError {
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (parameter, value) in [
            ("track_color", &self.track_color),
            ("elevation_color", &self.elevation_color),
        ] {
            if !is_hex_color(value) {
                return Err(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: value.clone(),
                    reason: "expected #RRGGBB".to_string(),
                });
            }
        }

        if self.track_stroke_width == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "track_stroke_width".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1 px".to_string(),
            });
        }

        let engine = &self.engine;
        if !(engine.trim_radius_m.is_finite() && engine.trim_radius_m >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "engine.trim_radius_m".to_string(),
                value: engine.trim_radius_m.to_string(),
                reason: "must be a finite, non-negative distance".to_string(),
            });
        }
        if !(engine.camera_resolution > 0.0 && engine.camera_resolution <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "engine.camera_resolution".to_string(),
                value: engine.camera_resolution.to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if engine.speed_window_points < 2 {
            return Err(ConfigError::InvalidParameter {
                parameter: "engine.speed_window_points".to_string(),
                value: engine.speed_window_points.to_string(),
                reason: "a speed needs at least 2 points".to_string(),
            });
        }
        if engine.viewport.width_px == 0 || engine.viewport.height_px == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "engine.viewport".to_string(),
                value: format!("{}x{}", engine.viewport.width_px, engine.viewport.height_px),
                reason: "viewport must have a non-zero size".to_string(),
            });
        }

        Ok(())
    }
}

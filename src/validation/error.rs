use crate::utils::config::ConfigError;
use thiserror::Error;

/// Result type for track engine operations
pub type TrackResult<T> = Result<T, TrackError>;

/// Input rejected before any derived data is produced
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("track needs at least {required} points, {available} supplied")]
    InsufficientPoints { available: usize, required: usize },

    #[error("point {index}: {field} value {value:?} is not a number")]
    NotANumber {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("point {index}: {field} {value} outside [{min}, {max}]")]
    CoordinateOutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("point {index}: timestamp {value:?} is not whole epoch seconds")]
    InvalidTimestamp { index: usize, value: String },

    #[error("malformed track input: {details}")]
    MalformedInput { details: String },

    #[error("invalid {parameter} {value}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    #[error("spline knots must be strictly increasing (knot {index})")]
    NonIncreasingKnots { index: usize },

    #[error("spline needs matching knot arrays with at least 2 entries ({xs} x, {ys} y)")]
    InvalidKnots { xs: usize, ys: usize },

    #[error("camera path has {path} positions for a track of {track} points")]
    CameraPathLength { path: usize, track: usize },
}

/// Top-level error for the track engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Scrub index outside `0..len`; always a caller bug
    #[error("position {index} outside track of {len} points")]
    Range { index: i64, len: usize },

    #[error("{operation} failed: {details}")]
    Computation { operation: String, details: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TrackError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TrackError::Validation(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, TrackError::Range { .. })
    }
}

//! GPX Track Engine
//!
//! Prepares recorded GPS tracks for animated map display: dwell trimming,
//! a smoothed spline camera path, scrub position state with moving-average
//! speed, and photo alignment along the track.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{Bounds, CameraAnchor, LatLng, PhotoMarker, PositionState, Track, TrackPoint, Viewport};
pub use algorithms::{bounds_zoom_level, great_circle_distance, CameraPath, NaturalCubicSpline};
pub use processing::{align, Photo, PhotoGallery, RawTrackPoint, TrackPreparer};
pub use validation::{DataValidator, TrackError, TrackResult, ValidationError};
pub use utils::{EngineConfig, MapType, RenderConfig};
pub use api::{
    format_distance, format_speed, InfoPane, ListenerHandle, TrackInstance, TrackPositionController,
    TrackView,
};

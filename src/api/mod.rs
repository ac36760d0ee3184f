//! Rendering-facing API
//!
//! `TrackInstance` is the entry point: it owns the prepared track, the
//! optional camera path, the scrub position and the photo gallery for one
//! rendered field.

pub mod controller;
pub mod formatting;
pub mod instance;

pub use controller::{ListenerHandle, PositionCallback, TrackPositionController};
pub use formatting::{
    format_distance, format_speed, format_time_label, ElevationChart, ElevationRow,
};
pub use instance::{InfoPane, PointView, TrackInstance, TrackStyle, TrackView};

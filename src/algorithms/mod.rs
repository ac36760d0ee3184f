//! Geospatial and camera path algorithms

pub mod geo_math;
pub mod spline;
pub mod camera_path;

pub use geo_math::{bounds_zoom_level, great_circle_distance};
pub use spline::NaturalCubicSpline;
pub use camera_path::{build_camera_path, pick_anchors, CameraPath};

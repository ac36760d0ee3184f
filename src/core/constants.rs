//! Physical constants and engine defaults

/// Mean Earth radius used by the haversine formula (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Highest zoom level a map viewport is allowed to reach
pub const ZOOM_MAX: u8 = 21;

/// Web-Mercator world tile edge (px)
pub const WORLD_TILE_PX: f64 = 256.0;

/// Default radius around the track ends treated as dead time (m)
pub const DEFAULT_TRIM_RADIUS_M: f64 = 200.0;

/// Default fraction of the track length used as the anchor stride
pub const DEFAULT_CAMERA_RESOLUTION: f64 = 0.05;

/// Anchors closer than `start-to-end distance / ANCHOR_SPACING_DIVISOR` are skipped
pub const ANCHOR_SPACING_DIVISOR: f64 = 25.0;

/// Number of points in the moving-average speed window
pub const SPEED_WINDOW_POINTS: usize = 10;

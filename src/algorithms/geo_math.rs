//! Spherical distance and Web-Mercator viewport helpers

use crate::core::{Bounds, Viewport, EARTH_RADIUS_M, WORLD_TILE_PX, ZOOM_MAX};
use std::f64::consts::PI;

/// Fractions below this are treated as a zero-span box
const MIN_WORLD_FRACTION: f64 = 1e-12;

/// Great-circle distance between two coordinates in meters (haversine).
pub fn great_circle_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Mercator-projected latitude, halved so that the full world spans `PI`.
fn mercator_lat(lat: f64) -> f64 {
    let sin = lat.to_radians().sin();
    let rad_x2 = ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;
    rad_x2.clamp(-PI, PI) / 2.0
}

fn axis_zoom(viewport_px: u32, world_fraction: f64) -> f64 {
    if !(world_fraction > MIN_WORLD_FRACTION) {
        return ZOOM_MAX as f64;
    }
    (viewport_px as f64 / WORLD_TILE_PX / world_fraction).log2().floor()
}

/// Highest zoom level at which `bounds` fits inside `viewport`.
///
/// Each axis is measured as the fraction of the world it covers; the zoom is
/// the number of tile doublings that still fit the viewport. A box with no
/// extent on an axis does not constrain that axis, so a single point maps to
/// [`ZOOM_MAX`].
pub fn bounds_zoom_level(bounds: &Bounds, viewport: &Viewport) -> u8 {
    let ne = bounds.north_east;
    let sw = bounds.south_west;

    let lat_fraction = (mercator_lat(ne.lat) - mercator_lat(sw.lat)) / PI;

    let lng_diff = ne.lng - sw.lng;
    let wrapped_lng_diff = if lng_diff < 0.0 { lng_diff + 360.0 } else { lng_diff };
    let lng_fraction = wrapped_lng_diff / 360.0;

    let lat_zoom = axis_zoom(viewport.height_px, lat_fraction);
    let lng_zoom = axis_zoom(viewport.width_px, lng_fraction);

    let zoom = lat_zoom.min(lng_zoom).min(ZOOM_MAX as f64);
    if zoom.is_nan() || zoom < 0.0 {
        0
    } else {
        zoom as u8
    }
}

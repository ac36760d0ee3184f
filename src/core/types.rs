//! Core data types for the track engine

use crate::algorithms::geo_math::great_circle_distance;
use crate::validation::error::{TrackResult, ValidationError};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Haversine distance to another coordinate (meters)
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        great_circle_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

/// A single GPS fix of a recorded track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lng: f64,
    pub elevation: Option<f64>,
    /// Epoch seconds
    pub timestamp: i64,
    /// Meters from the previous point, 0 for the first point
    pub distance_from_prev: f64,
    /// Smoothed map centre, set once the camera path is built
    pub camera_position: Option<LatLng>,
}

impl TrackPoint {
    pub fn new(lat: f64, lng: f64, elevation: Option<f64>, timestamp: i64) -> Self {
        Self {
            lat,
            lng,
            elevation,
            timestamp,
            distance_from_prev: 0.0,
            camera_position: None,
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn distance_to(&self, other: &TrackPoint) -> f64 {
        great_circle_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Ordered, chronological sequence of track points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    points: Vec<TrackPoint>,
    /// Radius of the dwell trim already applied, if any
    #[serde(default)]
    trim_radius_m: Option<f64>,
}

impl Track {
    /// Build a track and (re)compute the incremental distances.
    pub fn from_points(mut points: Vec<TrackPoint>) -> Self {
        for i in 0..points.len() {
            points[i].distance_from_prev = if i == 0 {
                0.0
            } else {
                points[i - 1].distance_to(&points[i])
            };
        }
        Self {
            points,
            trim_radius_m: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackPoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackPoint> {
        self.points.iter()
    }

    pub fn trim_radius_m(&self) -> Option<f64> {
        self.trim_radius_m
    }

    pub(crate) fn with_trim_radius(mut self, trim_radius_m: f64) -> Self {
        self.trim_radius_m = Some(trim_radius_m);
        self
    }

    /// Sub-track over `range`, distances recomputed so the new head carries 0.
    pub(crate) fn sub_track(&self, range: Range<usize>) -> Track {
        Track::from_points(self.points[range].to_vec())
    }

    /// Running distance sums; element `i` is the distance from the start to point `i`.
    pub fn cumulative_distances(&self) -> Vec<f64> {
        let mut total = 0.0;
        self.points
            .iter()
            .map(|p| {
                total += p.distance_from_prev;
                total
            })
            .collect()
    }

    pub fn total_distance(&self) -> f64 {
        self.points.iter().map(|p| p.distance_from_prev).sum()
    }

    /// Seconds between the first and last fix
    pub fn duration_seconds(&self) -> i64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.points.iter().map(TrackPoint::lat_lng))
    }

    /// Arithmetic mean of all coordinates
    pub fn centre(&self) -> Option<LatLng> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (lat_total, lng_total) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Some(LatLng::new(lat_total / n, lng_total / n))
    }

    /// Store one camera position per point.
    pub fn attach_camera_path(&mut self, path: &[LatLng]) -> TrackResult<()> {
        if path.len() != self.points.len() {
            return Err(ValidationError::CameraPathLength {
                path: path.len(),
                track: self.points.len(),
            }
            .into());
        }
        for (point, camera) in self.points.iter_mut().zip(path) {
            point.camera_position = Some(*camera);
        }
        Ok(())
    }
}

/// Axis-aligned bounding box given by its north-east and south-west corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north_east: LatLng,
    pub south_west: LatLng,
}

impl Bounds {
    pub fn from_point(point: LatLng) -> Self {
        Self {
            north_east: point,
            south_west: point,
        }
    }

    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Bounds::from_point(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.north_east.lat + self.south_west.lat) / 2.0,
            (self.north_east.lng + self.south_west.lng) / 2.0,
        )
    }
}

/// Map viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        // 20rem tall map canvas
        Self {
            width_px: 640,
            height_px: 320,
        }
    }
}

/// Decimated track point used as a spline knot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraAnchor {
    pub index: usize,
    pub lat: f64,
    pub lng: f64,
}

impl CameraAnchor {
    pub fn from_track_point(index: usize, point: &TrackPoint) -> Self {
        Self {
            index,
            lat: point.lat,
            lng: point.lng,
        }
    }
}

/// Snapshot of the scrub position handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    pub current_index: usize,
    /// Meters from the start of the track to `current_index`
    pub cumulative_distance: f64,
    /// Segment `i` joins point `i - 1` to point `i`
    pub visible_segments: Range<usize>,
    pub camera_center: LatLng,
    pub moving_average_speed_kmh: Option<f64>,
}

impl PositionState {
    pub fn is_segment_visible(&self, segment: usize) -> bool {
        self.visible_segments.contains(&segment)
    }
}

/// Photo placed on the map at the track index closest to its capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMarker {
    pub created_at: i64,
    pub node_index: usize,
    pub position: LatLng,
    /// Left offset of the thumbnail inside the gallery strip (0..=100)
    pub gallery_offset_percent: f64,
}

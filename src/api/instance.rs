//! Per-field track context
//!
//! A `TrackInstance` holds everything derived from one stored track and its
//! display settings. Instances share nothing, so a page with several track
//! fields simply creates several of them.

use crate::algorithms::camera_path::CameraPath;
use crate::algorithms::geo_math::bounds_zoom_level;
use crate::api::controller::{ListenerHandle, PositionCallback, TrackPositionController};
use crate::api::formatting::{format_distance, format_speed, ElevationChart};
use crate::core::{Bounds, LatLng, PhotoMarker, PositionState, Track, TrackPoint};
use crate::processing::photos::{Photo, PhotoGallery};
use crate::processing::preparer::{parse_raw_points, RawTrackPoint, TrackPreparer};
use crate::utils::config::{MapType, RenderConfig};
use crate::validation::error::{TrackError, TrackResult, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Text shown in the info pane next to the slider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPane {
    pub distance: String,
    pub speed: String,
}

/// Polyline and map styling passed through to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStyle {
    pub track_color: String,
    pub track_stroke_width: u32,
    pub map_type: MapType,
}

/// Per-point output for the map renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointView {
    pub lat: f64,
    pub lng: f64,
    pub distance_from_prev: f64,
    pub camera_position: LatLng,
}

impl From<&TrackPoint> for PointView {
    fn from(point: &TrackPoint) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
            distance_from_prev: point.distance_from_prev,
            camera_position: point.camera_position.unwrap_or_else(|| point.lat_lng()),
        }
    }
}

/// Everything the map, chart, slider and gallery need for the initial render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackView {
    pub style: TrackStyle,
    pub animate_track: bool,
    pub points: Vec<PointView>,
    pub bounds: Bounds,
    pub centre: LatLng,
    pub zoom: u8,
    pub total_distance: String,
    pub elevation_chart: Option<ElevationChart>,
    pub markers: Vec<PhotoMarker>,
}

impl TrackView {
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// Prepared track, camera path and position state for one rendered field
#[derive(Debug)]
pub struct TrackInstance {
    config: RenderConfig,
    track: Track,
    bounds: Bounds,
    centre: LatLng,
    zoom: u8,
    camera_path: Option<CameraPath>,
    controller: TrackPositionController,
    gallery: Option<PhotoGallery>,
}

impl TrackInstance {
    /// Normalize, trim and fit the track for rendering.
    ///
    /// The camera path is only fitted when `animate_track` is set; otherwise
    /// every point is its own camera position.
    pub fn prepare(raw: &[RawTrackPoint], config: RenderConfig) -> TrackResult<Self> {
        config.validate()?;

        let preparer = TrackPreparer::with_trim_radius(config.engine.trim_radius_m)?;
        let mut track = preparer.prepare(raw)?;

        let (bounds, centre) = match (track.bounds(), track.centre()) {
            (Some(bounds), Some(centre)) => (bounds, centre),
            _ => {
                return Err(ValidationError::InsufficientPoints {
                    available: track.len(),
                    required: 2,
                }
                .into())
            }
        };
        let zoom = bounds_zoom_level(&bounds, &config.engine.viewport);

        let camera_path = if config.animate_track {
            let path = CameraPath::build(&track, config.engine.camera_resolution)?;
            track.attach_camera_path(&path.positions)?;
            Some(path)
        } else {
            let positions: Vec<LatLng> = track.iter().map(TrackPoint::lat_lng).collect();
            track.attach_camera_path(&positions)?;
            None
        };

        let controller =
            TrackPositionController::with_speed_window(&track, config.engine.speed_window_points)?;

        info!(
            raw_points = raw.len(),
            points = track.len(),
            anchors = camera_path.as_ref().map_or(0, |p| p.anchors.len()),
            zoom,
            "prepared track"
        );

        Ok(Self {
            config,
            track,
            bounds,
            centre,
            zoom,
            camera_path,
            controller,
            gallery: None,
        })
    }

    /// Parse a JSON array of raw records and prepare it.
    pub fn from_json(json: &str, config: RenderConfig) -> TrackResult<Self> {
        let raw = parse_raw_points(json)?;
        Self::prepare(&raw, config)
    }

    /// Attach gallery images; each becomes a marker at its nearest track index.
    pub fn with_photos(mut self, photos: &[Photo]) -> Self {
        self.gallery = Some(PhotoGallery::new(&self.track, photos));
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn centre(&self) -> LatLng {
        self.centre
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn camera_path(&self) -> Option<&CameraPath> {
        self.camera_path.as_ref()
    }

    pub fn gallery(&self) -> Option<&PhotoGallery> {
        self.gallery.as_ref()
    }

    pub fn position(&self) -> &PositionState {
        self.controller.state()
    }

    pub fn set_position(&mut self, index: i64) -> TrackResult<&PositionState> {
        self.controller.set_position(index)
    }

    /// Scrub to the track index of the clicked photo marker.
    pub fn click_marker(&mut self, marker: usize) -> TrackResult<&PositionState> {
        let markers = self.gallery.as_ref().map_or(0, PhotoGallery::len);
        let node_index = self
            .gallery
            .as_ref()
            .and_then(|g| g.marker_clicked(marker))
            .ok_or(TrackError::Range {
                index: marker as i64,
                len: markers,
            })?;
        self.controller.set_position(node_index as i64)
    }

    pub fn add_listener(&mut self, listener: PositionCallback) -> ListenerHandle {
        self.controller.add_listener(listener)
    }

    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        self.controller.remove_listener(handle)
    }

    /// Distance and speed text for the current position, if the pane is enabled.
    pub fn info_pane(&self) -> Option<InfoPane> {
        if !self.config.show_info_pane {
            return None;
        }
        let state = self.controller.state();
        Some(InfoPane {
            distance: format_distance(state.cumulative_distance),
            speed: format_speed(state.moving_average_speed_kmh),
        })
    }

    /// Left offset of the gallery strip for the current position.
    pub fn gallery_strip_offset(&self) -> Option<f64> {
        let index = self.controller.state().current_index;
        self.gallery
            .as_ref()
            .and_then(|g| g.strip_offset_percent(&self.track, index))
    }

    pub fn view(&self) -> TrackView {
        TrackView {
            style: TrackStyle {
                track_color: self.config.track_color.clone(),
                track_stroke_width: self.config.track_stroke_width,
                map_type: self.config.map_type,
            },
            animate_track: self.config.animate_track,
            points: self.track.iter().map(PointView::from).collect(),
            bounds: self.bounds,
            centre: self.centre,
            zoom: self.zoom,
            total_distance: format_distance(self.track.total_distance()),
            elevation_chart: self
                .config
                .show_elevation_chart
                .then(|| ElevationChart::from_track(&self.track, &self.config.elevation_color)),
            markers: self
                .gallery
                .as_ref()
                .map(|g| g.markers().to_vec())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Dwell, a gently curving walk of 60 points, dwell
    fn walk() -> Vec<RawTrackPoint> {
        let mut raw = Vec::new();
        let mut ts = 1_600_000_000;
        for _ in 0..3 {
            raw.push(RawTrackPoint::new(46.0, 7.0, Some(500.0), ts));
            ts += 30;
        }
        for i in 1..=60 {
            let t = i as f64;
            raw.push(RawTrackPoint::new(
                46.0 + t * 0.0009,
                7.0 + (t / 10.0).sin() * 0.002,
                Some(500.0 + t),
                ts,
            ));
            ts += 10;
        }
        for _ in 0..3 {
            raw.push(RawTrackPoint::new(
                46.0 + 60.0 * 0.0009,
                7.0 + 6.0f64.sin() * 0.002,
                Some(560.0),
                ts,
            ));
            ts += 30;
        }
        raw
    }

    fn animated() -> RenderConfig {
        RenderConfig {
            animate_track: true,
            show_info_pane: true,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_prepare_trims_and_fits_camera() {
        let instance = TrackInstance::prepare(&walk(), animated()).unwrap();
        let track = instance.track();

        assert!(track.len() < 66);
        assert_eq!(track.points()[0].distance_from_prev, 0.0);
        assert!(track.iter().all(|p| p.camera_position.is_some()));

        let path = instance.camera_path().unwrap();
        assert_eq!(path.anchors.last().unwrap().index, track.len() - 1);
        assert!(instance.zoom() > 10 && instance.zoom() <= 21);
        assert!(instance.bounds().contains(&instance.centre()));
    }

    #[test]
    fn test_static_track_uses_raw_positions() {
        let instance = TrackInstance::prepare(&walk(), RenderConfig::default()).unwrap();
        assert!(instance.camera_path().is_none());
        for p in instance.track().iter() {
            assert_eq!(p.camera_position, Some(p.lat_lng()));
        }
        assert!(instance.info_pane().is_none());
    }

    #[test]
    fn test_info_pane_tracks_position() {
        let mut instance = TrackInstance::prepare(&walk(), animated()).unwrap();
        let pane = instance.info_pane().unwrap();
        assert_eq!(pane.distance, "0");
        assert_eq!(pane.speed, "");

        let last = instance.track().len() as i64 - 1;
        instance.set_position(last).unwrap();
        let pane = instance.info_pane().unwrap();
        assert!(pane.distance.ends_with("kms"));
        assert!(pane.speed.ends_with("km/h"));

        assert!(instance.set_position(last + 1).is_err());
        assert_eq!(instance.position().current_index as i64, last);
    }

    #[test]
    fn test_photo_markers_drive_position() {
        let raw = walk();
        let instance = TrackInstance::prepare(&raw, animated()).unwrap();
        let target = instance.track().points()[20].timestamp;
        let mut instance = instance.with_photos(&[Photo { created_at: target + 2 }]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        instance.add_listener(Box::new(move |state: &PositionState| {
            sink.lock().unwrap().push(state.current_index)
        }));

        let state = instance.click_marker(0).unwrap();
        assert_eq!(state.current_index, 20);
        assert_eq!(*seen.lock().unwrap(), vec![20]);
        assert!(instance.gallery_strip_offset().unwrap() < 0.0);

        assert!(instance.click_marker(1).unwrap_err().is_range());
    }

    #[test]
    fn test_view_serializes() {
        let instance = TrackInstance::prepare(&walk(), animated())
            .unwrap()
            .with_photos(&[Photo { created_at: 0 }]);
        let view = instance.view();
        assert_eq!(view.points.len(), instance.track().len());
        assert_eq!(view.markers.len(), 1);
        assert!(view.elevation_chart.is_some());

        let json = view.to_json(false).unwrap();
        let parsed: TrackView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.zoom, view.zoom);
        assert!(json.contains("\"map_type\":\"terrain\""));
    }

    #[test]
    fn test_invalid_input_is_reported() {
        let err = TrackInstance::from_json("[]", RenderConfig::default()).unwrap_err();
        assert!(err.is_validation());

        let config = RenderConfig {
            track_stroke_width: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            TrackInstance::prepare(&walk(), config),
            Err(TrackError::Config(_))
        ));
    }
}

//! Scrub position state machine
//!
//! Every slider drag, chart selection or photo click maps to a single
//! `set_position` call. The controller recomputes the snapshot synchronously
//! and hands it to registered listeners (map, chart, slider, gallery), which
//! only render it. Calls are not queued: each one fully replaces the state
//! left by the previous call.

use crate::core::{LatLng, PositionState, Track, SPEED_WINDOW_POINTS};
use crate::validation::error::{TrackError, TrackResult, ValidationError};
use tracing::{trace, warn};

/// Listener invoked with every accepted position
pub type PositionCallback = Box<dyn Fn(&PositionState) + Send>;

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u32);

impl ListenerHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Owns the [`PositionState`] for one track
pub struct TrackPositionController {
    /// Meters from the start to each index
    cumulative: Vec<f64>,
    distances: Vec<f64>,
    timestamps: Vec<i64>,
    camera: Vec<LatLng>,
    speed_window: usize,
    state: PositionState,
    listener_counter: u32,
    listeners: Vec<(ListenerHandle, PositionCallback)>,
}

impl std::fmt::Debug for TrackPositionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackPositionController")
            .field("cumulative", &self.cumulative)
            .field("distances", &self.distances)
            .field("timestamps", &self.timestamps)
            .field("camera", &self.camera)
            .field("speed_window", &self.speed_window)
            .field("state", &self.state)
            .field("listener_counter", &self.listener_counter)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TrackPositionController {
    /// Controller starting at index 0. Points without a camera position are
    /// centred on their own coordinate.
    pub fn new(track: &Track) -> TrackResult<Self> {
        Self::with_speed_window(track, SPEED_WINDOW_POINTS)
    }

    pub fn with_speed_window(track: &Track, speed_window: usize) -> TrackResult<Self> {
        if track.is_empty() {
            return Err(ValidationError::InsufficientPoints {
                available: 0,
                required: 2,
            }
            .into());
        }
        if speed_window < 2 {
            return Err(ValidationError::InvalidParameter {
                parameter: "speed_window_points",
                value: speed_window.to_string(),
                reason: "a speed needs at least 2 points".to_string(),
            }
            .into());
        }

        let camera: Vec<LatLng> = track
            .iter()
            .map(|p| p.camera_position.unwrap_or_else(|| p.lat_lng()))
            .collect();

        let state = PositionState {
            current_index: 0,
            cumulative_distance: 0.0,
            visible_segments: 1..1,
            camera_center: camera[0],
            moving_average_speed_kmh: None,
        };

        Ok(Self {
            cumulative: track.cumulative_distances(),
            distances: track.iter().map(|p| p.distance_from_prev).collect(),
            timestamps: track.iter().map(|p| p.timestamp).collect(),
            camera,
            speed_window,
            state,
            listener_counter: 0,
            listeners: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    /// Move to `index`. Out-of-range indices are logged and rejected and the
    /// current state is left untouched.
    pub fn set_position(&mut self, index: i64) -> TrackResult<&PositionState> {
        let len = self.len();
        let index = match usize::try_from(index) {
            Ok(i) if i < len => i,
            _ => {
                warn!(index, len, "ignoring out-of-range track position");
                return Err(TrackError::Range { index, len });
            }
        };

        self.state = PositionState {
            current_index: index,
            cumulative_distance: self.cumulative[index],
            visible_segments: 1..index + 1,
            camera_center: self.camera[index],
            moving_average_speed_kmh: self.moving_average_speed(index),
        };
        trace!(index, distance_m = self.state.cumulative_distance, "position updated");

        for (_, listener) in &self.listeners {
            listener(&self.state);
        }

        Ok(&self.state)
    }

    /// Meters from the start of the track to `index`
    pub fn cumulative_distance(&self, index: usize) -> Option<f64> {
        self.cumulative.get(index).copied()
    }

    /// Average speed in km/h over the last `speed_window` points ending at
    /// `index` (or every point so far when fewer are available). `None` at the
    /// first point or when no time elapsed across the window.
    pub fn moving_average_speed(&self, index: usize) -> Option<f64> {
        if index == 0 || index >= self.len() {
            return None;
        }
        let start = (index + 1).saturating_sub(self.speed_window);

        let km: f64 = self.distances[start + 1..=index].iter().sum::<f64>() / 1000.0;
        let hours = (self.timestamps[index] - self.timestamps[start]) as f64 / 3600.0;
        if hours <= 0.0 {
            return None;
        }
        Some(km / hours)
    }

    pub fn add_listener(&mut self, listener: PositionCallback) -> ListenerHandle {
        self.listener_counter += 1;
        let handle = ListenerHandle(self.listener_counter);
        self.listeners.push((handle, listener));
        handle
    }

    /// Returns false when the handle was not registered.
    pub fn remove_listener(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::geo_math::great_circle_distance;
    use crate::core::TrackPoint;
    use std::sync::{Arc, Mutex};

    /// Five points 10 s apart along the equator; the spacing in degrees
    /// gives exactly 100 m between neighbours.
    fn hundred_meter_track() -> Track {
        let step = 100.0 / great_circle_distance(0.0, 0.0, 0.0, 1.0);
        Track::from_points(
            (0..5)
                .map(|i| TrackPoint::new(0.0, i as f64 * step, None, i as i64 * 10))
                .collect(),
        )
    }

    #[test]
    fn test_end_to_end_distance_and_speed() {
        let track = hundred_meter_track();
        let mut controller = TrackPositionController::new(&track).unwrap();
        let state = controller.set_position(4).unwrap().clone();

        assert!((state.cumulative_distance - 400.0).abs() < 1e-6);
        assert!((state.moving_average_speed_kmh.unwrap() - 36.0).abs() < 1e-6);
        assert_eq!(state.visible_segments, 1..5);
        assert!(state.is_segment_visible(4));
        assert!(!state.is_segment_visible(0));
    }

    #[test]
    fn test_bounds() {
        let track = hundred_meter_track();
        let mut controller = TrackPositionController::new(&track).unwrap();

        assert_eq!(
            controller.set_position(-1).unwrap_err(),
            TrackError::Range { index: -1, len: 5 }
        );
        assert!(controller.set_position(5).unwrap_err().is_range());
        assert!(controller.set_position(0).is_ok());
        assert!(controller.set_position(4).is_ok());
    }

    #[test]
    fn test_range_error_keeps_state() {
        let track = hundred_meter_track();
        let mut controller = TrackPositionController::new(&track).unwrap();
        controller.set_position(3).unwrap();
        let before = controller.state().clone();

        assert!(controller.set_position(99).is_err());
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_initial_state_and_jumps() {
        let track = hundred_meter_track();
        let mut controller = TrackPositionController::new(&track).unwrap();
        assert_eq!(controller.state().current_index, 0);
        assert!(controller.state().visible_segments.is_empty());
        assert_eq!(controller.state().moving_average_speed_kmh, None);

        controller.set_position(4).unwrap();
        let state = controller.set_position(1).unwrap();
        assert_eq!(state.current_index, 1);
        assert_eq!(state.visible_segments, 1..2);
        assert_eq!(state.camera_center, track.points()[1].lat_lng());
    }

    #[test]
    fn test_cumulative_distance_is_monotonic() {
        let track = hundred_meter_track();
        let mut controller = TrackPositionController::new(&track).unwrap();
        let mut last = 0.0;
        for i in 0..5 {
            let d = controller.set_position(i).unwrap().cumulative_distance;
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_speed_window_limits_sample() {
        // 100 m per 10 s for the first half, then 100 m per 20 s
        let step = 100.0 / great_circle_distance(0.0, 0.0, 0.0, 1.0);
        let points = (0..30)
            .map(|i| {
                let ts = if i <= 15 { i * 10 } else { 150 + (i - 15) * 20 };
                TrackPoint::new(0.0, i as f64 * step, None, ts)
            })
            .collect();
        let track = Track::from_points(points);
        let controller = TrackPositionController::new(&track).unwrap();

        // Window of the last 10 points lies entirely in the slow half
        let speed = controller.moving_average_speed(29).unwrap();
        assert!((speed - 18.0).abs() < 1e-6);

        let wide = TrackPositionController::with_speed_window(&track, 30).unwrap();
        let speed = wide.moving_average_speed(29).unwrap();
        assert!(speed > 18.0 && speed < 36.0);
    }

    #[test]
    fn test_speed_without_elapsed_time() {
        let track = Track::from_points(vec![
            TrackPoint::new(0.0, 0.0, None, 100),
            TrackPoint::new(0.0, 0.001, None, 100),
        ]);
        let controller = TrackPositionController::new(&track).unwrap();
        assert_eq!(controller.moving_average_speed(1), None);
    }

    #[test]
    fn test_listeners_follow_position() {
        let track = hundred_meter_track();
        let mut controller = TrackPositionController::new(&track).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let handle = controller.add_listener(Box::new(move |state: &PositionState| {
            sink.lock().unwrap().push(state.current_index);
        }));

        controller.set_position(2).unwrap();
        let _ = controller.set_position(7);
        controller.set_position(4).unwrap();
        assert!(controller.remove_listener(handle));
        assert!(!controller.remove_listener(handle));
        controller.set_position(1).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![2, 4]);
    }

    #[test]
    fn test_rejects_tiny_speed_window() {
        let track = hundred_meter_track();
        assert!(TrackPositionController::with_speed_window(&track, 1).is_err());
        assert!(TrackPositionController::new(&Track::from_points(Vec::new())).is_err());
    }
}

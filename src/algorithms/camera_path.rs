//! Camera path for animated playback
//!
//! The raw GPS track is too dense and noisy to pan the map along directly.
//! A sparse set of anchors is picked from the track and two natural cubic
//! splines (index to latitude, index to longitude) are fitted through them.
//! Evaluating both splines at every track index gives one smoothed map
//! centre per point. The axes are interpolated independently rather than
//! along a geodesic; anchor spacing is tiny compared with the Earth's
//! curvature, so the difference is not visible on the map.

use crate::algorithms::spline::NaturalCubicSpline;
use crate::core::{
    CameraAnchor, LatLng, Track, ANCHOR_SPACING_DIVISOR, DEFAULT_CAMERA_RESOLUTION,
};
use crate::validation::error::{TrackResult, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anchors and the per-index camera positions fitted through them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPath {
    pub anchors: Vec<CameraAnchor>,
    pub positions: Vec<LatLng>,
}

impl CameraPath {
    /// Pick anchors at `resolution` and fit the path in one go.
    pub fn build(track: &Track, resolution: f64) -> TrackResult<Self> {
        let anchors = pick_anchors(track, resolution)?;
        let positions = build_camera_path(track, &anchors)?;
        Ok(Self { anchors, positions })
    }

    pub fn build_default(track: &Track) -> TrackResult<Self> {
        Self::build(track, DEFAULT_CAMERA_RESOLUTION)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn validate_resolution(resolution: f64) -> Result<(), ValidationError> {
    if !(resolution > 0.0 && resolution <= 1.0) {
        return Err(ValidationError::InvalidParameter {
            parameter: "camera_resolution",
            value: resolution.to_string(),
            reason: "must be in (0, 1]".to_string(),
        });
    }
    Ok(())
}

/// Decimate `track` into spline anchors.
///
/// Every `round(N * resolution)`-th point is a candidate. A candidate is kept
/// only when it lies farther than `start-to-end distance / 25` from the
/// previously kept anchor. The last kept anchor is then replaced by the final
/// track point so the path always ends on the true endpoint.
pub fn pick_anchors(track: &Track, resolution: f64) -> TrackResult<Vec<CameraAnchor>> {
    validate_resolution(resolution)?;

    let points = track.points();
    let n = points.len();
    if n < 2 {
        return Err(ValidationError::InsufficientPoints {
            available: n,
            required: 2,
        }
        .into());
    }

    let gap = ((n as f64 * resolution).round() as usize).max(1);
    let dist_limit = points[0].distance_to(&points[n - 1]) / ANCHOR_SPACING_DIVISOR;

    let mut anchors: Vec<CameraAnchor> = Vec::new();
    for index in (0..n).step_by(gap) {
        let candidate = &points[index];
        if let Some(last) = anchors.last() {
            let from_last = points[last.index].distance_to(candidate);
            if from_last <= dist_limit {
                continue;
            }
        }
        anchors.push(CameraAnchor::from_track_point(index, candidate));
    }

    if let Some(last) = anchors.last_mut() {
        *last = CameraAnchor::from_track_point(n - 1, &points[n - 1]);
    }

    if anchors.len() < 2 {
        anchors = vec![
            CameraAnchor::from_track_point(0, &points[0]),
            CameraAnchor::from_track_point(n - 1, &points[n - 1]),
        ];
    }

    debug!(
        points = n,
        gap,
        dist_limit_m = dist_limit,
        anchors = anchors.len(),
        "picked camera anchors"
    );

    Ok(anchors)
}

/// Evaluate the lat and lng splines through `anchors` at every track index.
pub fn build_camera_path(track: &Track, anchors: &[CameraAnchor]) -> TrackResult<Vec<LatLng>> {
    let xs: Vec<f64> = anchors.iter().map(|a| a.index as f64).collect();
    let lats: Vec<f64> = anchors.iter().map(|a| a.lat).collect();
    let lngs: Vec<f64> = anchors.iter().map(|a| a.lng).collect();

    let lat_spline = NaturalCubicSpline::fit(&xs, &lats)?;
    let lng_spline = NaturalCubicSpline::fit(&xs, &lngs)?;

    Ok((0..track.len())
        .map(|index| {
            let x = index as f64;
            LatLng::new(lat_spline.evaluate(x), lng_spline.evaluate(x))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrackPoint;

    /// Points heading north-east with a small sideways wobble.
    fn wobbly_track(n: usize) -> Track {
        Track::from_points(
            (0..n)
                .map(|i| {
                    let t = i as f64;
                    let wobble = if i % 2 == 0 { 0.0002 } else { -0.0002 };
                    TrackPoint::new(45.0 + t * 0.001, 6.0 + t * 0.001 + wobble, None, i as i64 * 5)
                })
                .collect(),
        )
    }

    #[test]
    fn test_last_anchor_is_last_index() {
        for n in [2, 3, 7, 40, 101, 333] {
            let track = wobbly_track(n);
            for resolution in [0.01, 0.05, 0.1, 0.5, 1.0] {
                let anchors = pick_anchors(&track, resolution).unwrap();
                assert_eq!(anchors.last().unwrap().index, n - 1);
                assert_eq!(anchors.first().unwrap().index, 0);
                assert!(anchors.windows(2).all(|w| w[0].index < w[1].index));
            }
        }
    }

    #[test]
    fn test_anchor_spacing_respects_limit() {
        let track = wobbly_track(200);
        let points = track.points();
        let limit = points[0].distance_to(&points[199]) / ANCHOR_SPACING_DIVISOR;
        let anchors = pick_anchors(&track, 0.01).unwrap();

        // The forced last anchor is exempt
        let spaced = &anchors[..anchors.len() - 1];
        for pair in spaced.windows(2) {
            let d = points[pair[0].index].distance_to(&points[pair[1].index]);
            assert!(d > limit);
        }
    }

    #[test]
    fn test_round_trip_track_falls_back_to_endpoints() {
        // Both points coincide, so only index 0 is accepted and the
        // endpoint swap would leave a single anchor.
        let track = Track::from_points(vec![
            TrackPoint::new(10.0, 10.0, None, 0),
            TrackPoint::new(10.0, 10.0, None, 1),
        ]);
        let anchors = pick_anchors(&track, 0.05).unwrap();
        assert_eq!(anchors.iter().map(|a| a.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_rejects_invalid_resolution() {
        let track = wobbly_track(10);
        assert!(pick_anchors(&track, 0.0).is_err());
        assert!(pick_anchors(&track, 1.5).is_err());
        assert!(pick_anchors(&track, f64::NAN).is_err());
    }

    #[test]
    fn test_path_passes_through_anchors() {
        let track = wobbly_track(120);
        let path = CameraPath::build_default(&track).unwrap();
        assert_eq!(path.len(), 120);
        for anchor in &path.anchors {
            let camera = path.positions[anchor.index];
            assert!((camera.lat - anchor.lat).abs() < 1e-9);
            assert!((camera.lng - anchor.lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_path_is_smoother_than_track() {
        let track = wobbly_track(120);
        let path = CameraPath::build(&track, 0.1).unwrap();

        // Sum of absolute second differences in longitude
        let roughness = |values: &[f64]| -> f64 {
            values.windows(3).map(|w| (w[2] - 2.0 * w[1] + w[0]).abs()).sum()
        };
        let raw: Vec<f64> = track.iter().map(|p| p.lng).collect();
        let smooth: Vec<f64> = path.positions.iter().map(|p| p.lng).collect();
        assert!(roughness(&smooth) < roughness(&raw) / 10.0);
    }

    #[test]
    fn test_path_is_deterministic() {
        let track = wobbly_track(57);
        let a = CameraPath::build(&track, 0.05).unwrap();
        let b = CameraPath::build(&track, 0.05).unwrap();
        assert_eq!(a, b);
    }
}

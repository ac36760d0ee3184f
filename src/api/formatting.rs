//! Presentation helpers consumed by the info pane and chart renderers

use crate::core::Track;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Chart and info-pane time label format
pub const TIME_LABEL_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Human readable distance: meters below 1 km, one decimal up to 100 km,
/// whole kilometres beyond.
pub fn format_distance(meters: f64) -> String {
    let rounded = meters.round();
    if rounded == 0.0 {
        "0".to_string()
    } else if meters < 1_000.0 {
        format!("{} meters", rounded)
    } else if meters <= 100_000.0 {
        format!("{:.1} kms", meters / 1_000.0)
    } else {
        format!("{:.0} kms", meters / 1_000.0)
    }
}

/// `"<x> km/h"`, or an empty string when no speed is known.
pub fn format_speed(speed_kmh: Option<f64>) -> String {
    match speed_kmh {
        Some(speed) if speed.is_finite() => format!("{:.1} km/h", speed),
        _ => String::new(),
    }
}

/// UTC label for an epoch-seconds timestamp
pub fn format_time_label(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format(TIME_LABEL_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// One point of the elevation profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationRow {
    pub label: String,
    pub elevation: Option<f64>,
}

/// Elevation area chart data; row `i` corresponds to track index `i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationChart {
    pub title: String,
    pub color: String,
    pub rows: Vec<ElevationRow>,
    /// Show every n-th time label on the horizontal axis
    pub label_stride: usize,
}

impl ElevationChart {
    pub fn from_track(track: &Track, color: &str) -> Self {
        let rows = track
            .iter()
            .map(|p| ElevationRow {
                label: format_time_label(p.timestamp),
                elevation: p.elevation,
            })
            .collect::<Vec<_>>();
        let label_stride = ((rows.len() as f64 / 10.0).round() as usize).max(1);

        Self {
            title: "Elevation".to_string(),
            color: color.to_string(),
            rows,
            label_stride,
        }
    }

    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|r| r.elevation)
            .fold(None, |range, e| match range {
                None => Some((e, e)),
                Some((lo, hi)) => Some((lo.min(e), hi.max(e))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TrackPoint;

    #[test]
    fn test_format_distance_table() {
        assert_eq!(format_distance(0.0), "0");
        assert_eq!(format_distance(0.3), "0");
        assert_eq!(format_distance(500.0), "500 meters");
        assert_eq!(format_distance(999.0), "999 meters");
        assert_eq!(format_distance(1_500.0), "1.5 kms");
        assert_eq!(format_distance(42_160.0), "42.2 kms");
        assert_eq!(format_distance(100_000.0), "100.0 kms");
        assert_eq!(format_distance(150_000.0), "150 kms");
    }

    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(Some(36.0)), "36.0 km/h");
        assert_eq!(format_speed(Some(4.26)), "4.3 km/h");
        assert_eq!(format_speed(None), "");
        assert_eq!(format_speed(Some(f64::INFINITY)), "");
    }

    #[test]
    fn test_time_label() {
        assert_eq!(format_time_label(0), "01/01/1970 00:00:00");
        assert_eq!(format_time_label(1_500_000_000), "14/07/2017 02:40:00");
    }

    #[test]
    fn test_elevation_chart() {
        let track = Track::from_points(
            (0..25)
                .map(|i| {
                    let ele = if i == 3 { None } else { Some(100.0 + i as f64) };
                    TrackPoint::new(0.0, i as f64 * 0.001, ele, i * 60)
                })
                .collect(),
        );
        let chart = ElevationChart::from_track(&track, "#006CAA");
        assert_eq!(chart.rows.len(), 25);
        assert_eq!(chart.label_stride, 3);
        assert_eq!(chart.rows[1].label, "01/01/1970 00:01:00");
        assert_eq!(chart.rows[3].elevation, None);
        assert_eq!(chart.elevation_range(), Some((100.0, 124.0)));
    }

    #[test]
    fn test_short_chart_stride() {
        let track = Track::from_points(vec![
            TrackPoint::new(0.0, 0.0, None, 0),
            TrackPoint::new(0.0, 0.001, None, 1),
        ]);
        let chart = ElevationChart::from_track(&track, "#000000");
        assert_eq!(chart.label_stride, 1);
        assert_eq!(chart.elevation_range(), None);
    }
}

//! Photo to track alignment and gallery offsets

use crate::core::{PhotoMarker, Track};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Capture time of one gallery image, extracted by the host from EXIF/IPTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub created_at: i64,
}

/// Track index whose timestamp is closest to `photo_timestamp`.
///
/// Scans forward from index 1 and stops as soon as the gap starts growing;
/// track timestamps are monotonic so the gap has a single minimum. A track
/// with fewer than two points yields index 0.
pub fn align(photo_timestamp: i64, track: &Track) -> usize {
    let points = track.points();
    let mut node_index = 0;
    let mut smallest_gap: Option<i64> = None;
    let mut last_gap: Option<i64> = None;

    for (index, point) in points.iter().enumerate().skip(1) {
        let gap = (photo_timestamp - point.timestamp).abs();
        if smallest_gap.map_or(true, |smallest| gap < smallest) {
            smallest_gap = Some(gap);
            node_index = index;
        }
        if last_gap.is_some_and(|last| gap > last) {
            break;
        }
        last_gap = Some(gap);
    }

    node_index
}

/// Photo markers for one track plus the offsets of the gallery strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoGallery {
    markers: Vec<PhotoMarker>,
    start_timestamp: i64,
    total_seconds: i64,
}

impl PhotoGallery {
    pub fn new(track: &Track, photos: &[Photo]) -> Self {
        let start_timestamp = track.first().map_or(0, |p| p.timestamp);
        let total_seconds = track.duration_seconds();

        let markers = photos
            .iter()
            .filter_map(|photo| {
                let node_index = align(photo.created_at, track);
                let point = track.get(node_index)?;
                let since_start = (photo.created_at - start_timestamp).max(0);
                Some(PhotoMarker {
                    created_at: photo.created_at,
                    node_index,
                    position: point.lat_lng(),
                    gallery_offset_percent: Self::percent(since_start, total_seconds),
                })
            })
            .collect::<Vec<_>>();

        debug!(photos = photos.len(), markers = markers.len(), "placed photo markers");

        Self {
            markers,
            start_timestamp,
            total_seconds,
        }
    }

    fn percent(seconds: i64, total_seconds: i64) -> f64 {
        if total_seconds <= 0 {
            return 0.0;
        }
        seconds as f64 / total_seconds as f64 * 100.0
    }

    pub fn markers(&self) -> &[PhotoMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Node index to scrub to when the marker or thumbnail at `marker` is clicked.
    pub fn marker_clicked(&self, marker: usize) -> Option<usize> {
        self.markers.get(marker).map(|m| m.node_index)
    }

    /// Left offset (percent, non-positive) that scrolls the strip to `index`.
    pub fn strip_offset_percent(&self, track: &Track, index: usize) -> Option<f64> {
        let point = track.get(index)?;
        let elapsed = point.timestamp - self.start_timestamp;
        Some(-Self::percent(elapsed, self.total_seconds))
    }
}

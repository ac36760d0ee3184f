//! Track preparation and photo alignment

pub mod preparer;
pub mod photos;

pub use preparer::{normalize, parse_raw_points, trim, RawTrackPoint, RawValue, TrackPreparer};
pub use photos::{align, Photo, PhotoGallery};

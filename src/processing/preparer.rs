//! Raw record coercion, validation and dead-time trimming

use crate::core::{Track, TrackPoint, DEFAULT_TRIM_RADIUS_M};
use crate::validation::data::DataValidator;
use crate::validation::error::{TrackResult, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A field value as delivered by the CMS: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(value) => Some(*value),
            RawValue::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|value| value.is_finite())
    }

    fn as_epoch_seconds(&self) -> Option<i64> {
        match self {
            RawValue::Text(text) => {
                let text = text.trim();
                text.parse::<i64>().ok().or_else(|| {
                    RawValue::Number(text.parse::<f64>().ok()?).as_epoch_seconds()
                })
            }
            RawValue::Number(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    Some(*value as i64)
                } else {
                    None
                }
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Number(value) => value.to_string(),
            RawValue::Text(text) => text.clone(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// One stored GPX point before coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrackPoint {
    pub lat: RawValue,
    pub lng: RawValue,
    #[serde(default)]
    pub ele: Option<RawValue>,
    pub time: RawValue,
}

impl RawTrackPoint {
    pub fn new(lat: impl Into<RawValue>, lng: impl Into<RawValue>, ele: Option<f64>, time: i64) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
            ele: ele.map(RawValue::Number),
            time: RawValue::Number(time as f64),
        }
    }
}

/// Parse a JSON array of raw records.
pub fn parse_raw_points(json: &str) -> TrackResult<Vec<RawTrackPoint>> {
    serde_json::from_str(json).map_err(|e| {
        ValidationError::MalformedInput {
            details: e.to_string(),
        }
        .into()
    })
}

fn coerce_coordinate(index: usize, field: &'static str, value: &RawValue) -> Result<f64, ValidationError> {
    value.as_f64().ok_or_else(|| ValidationError::NotANumber {
        index,
        field,
        value: value.describe(),
    })
}

/// Coerce raw records into a track and compute incremental distances.
pub fn normalize(raw: &[RawTrackPoint]) -> TrackResult<Track> {
    normalize_with(&DataValidator::new(), raw)
}

fn normalize_with(validator: &DataValidator, raw: &[RawTrackPoint]) -> TrackResult<Track> {
    validator.validate_point_count(raw.len())?;

    let mut points = Vec::with_capacity(raw.len());
    for (index, record) in raw.iter().enumerate() {
        let lat = coerce_coordinate(index, "lat", &record.lat)?;
        let lng = coerce_coordinate(index, "lng", &record.lng)?;

        let elevation = match &record.ele {
            None => None,
            Some(RawValue::Text(text)) if text.trim().is_empty() => None,
            Some(value) => {
                let elevation = value.as_f64();
                if elevation.is_none() {
                    warn!(index, value = %value.describe(), "ignoring unparseable elevation");
                }
                elevation
            }
        };

        let timestamp = record
            .time
            .as_epoch_seconds()
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                index,
                value: record.time.describe(),
            })?;

        let point = TrackPoint::new(lat, lng, elevation, timestamp);
        validator.validate_point(index, &point)?;
        points.push(point);
    }

    let track = Track::from_points(points);
    let warnings = validator.inspect_track(&track);
    debug!(points = track.len(), warnings = warnings.len(), "normalized track");
    Ok(track)
}

fn validate_radius(trim_radius_m: f64) -> Result<(), ValidationError> {
    if !(trim_radius_m.is_finite() && trim_radius_m >= 0.0) {
        return Err(ValidationError::InvalidParameter {
            parameter: "trim_radius_m",
            value: trim_radius_m.to_string(),
            reason: "must be a finite, non-negative distance".to_string(),
        });
    }
    Ok(())
}

/// Last index of the initial run of points within `radius` of the first point.
fn head_boundary(points: &[TrackPoint], radius: f64) -> usize {
    let mut start = 0;
    while start + 1 < points.len() && points[0].distance_to(&points[start + 1]) <= radius {
        start += 1;
    }
    start
}

/// First index of the final run of points within `radius` of the last point.
fn tail_boundary(points: &[TrackPoint], radius: f64) -> usize {
    let last = points.len() - 1;
    let mut end = last;
    while end > 0 && points[last].distance_to(&points[end - 1]) <= radius {
        end -= 1;
    }
    end
}

/// Drop the time spent standing around at the start and end of a recording.
///
/// The head moves forward to the last point still within `trim_radius_m` of
/// the first fix, the tail backward to the first point within the radius of
/// the last fix. A track that never leaves the radius (a stationary
/// recording) keeps all of its points rather than collapsing below two.
/// The result remembers the radius, and a track already trimmed with at
/// least that radius is returned as is.
pub fn trim(track: &Track, trim_radius_m: f64) -> TrackResult<Track> {
    validate_radius(trim_radius_m)?;

    if track
        .trim_radius_m()
        .is_some_and(|applied| applied >= trim_radius_m)
    {
        return Ok(track.clone());
    }

    let points = track.points();
    if points.len() < 2 {
        return Ok(track.clone().with_trim_radius(trim_radius_m));
    }

    let start = head_boundary(points, trim_radius_m);
    let end = tail_boundary(points, trim_radius_m);

    if end <= start {
        debug!(
            points = points.len(),
            radius_m = trim_radius_m,
            "track stays within trim radius, keeping it whole"
        );
        return Ok(track.clone().with_trim_radius(trim_radius_m));
    }

    debug!(
        points = points.len(),
        start,
        end,
        radius_m = trim_radius_m,
        "trimmed track"
    );
    Ok(track.sub_track(start..end + 1).with_trim_radius(trim_radius_m))
}

/// Normalize then trim, with a configurable validator and radius.
#[derive(Debug, Clone)]
pub struct TrackPreparer {
    validator: DataValidator,
    trim_radius_m: f64,
}

impl Default for TrackPreparer {
    fn default() -> Self {
        Self {
            validator: DataValidator::new(),
            trim_radius_m: DEFAULT_TRIM_RADIUS_M,
        }
    }
}

impl TrackPreparer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim_radius(trim_radius_m: f64) -> TrackResult<Self> {
        validate_radius(trim_radius_m)?;
        Ok(Self {
            trim_radius_m,
            ..Self::default()
        })
    }

    pub fn with_validator(mut self, validator: DataValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn trim_radius_m(&self) -> f64 {
        self.trim_radius_m
    }

    pub fn normalize(&self, raw: &[RawTrackPoint]) -> TrackResult<Track> {
        normalize_with(&self.validator, raw)
    }

    pub fn trim(&self, track: &Track) -> TrackResult<Track> {
        trim(track, self.trim_radius_m)
    }

    pub fn prepare(&self, raw: &[RawTrackPoint]) -> TrackResult<Track> {
        let track = self.normalize(raw)?;
        self.trim(&track)
    }
}

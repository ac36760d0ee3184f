use crate::core::{Track, TrackPoint};
use crate::validation::error::ValidationError;
use tracing::warn;

/// Parameters for track data validation
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum number of points a track needs (start and end)
    pub min_point_count: usize,
    /// Reject latitudes outside [-90, 90]
    pub check_latitude_range: bool,
    /// Reject longitudes outside [-180, 180]
    pub check_longitude_range: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_point_count: 2,
            check_latitude_range: true,
            check_longitude_range: true,
        }
    }
}

/// Non-fatal findings about a track that was accepted
#[derive(Debug, Clone, PartialEq)]
pub enum TrackWarning {
    /// Point `index` is timestamped before point `index - 1`
    TimestampRegression { index: usize, previous: i64, current: i64 },
    /// Point `index` carries no usable elevation
    MissingElevation { index: usize },
}

/// Validator for coerced track points
#[derive(Debug, Clone, Default)]
pub struct DataValidator {
    config: ValidationConfig,
}

impl DataValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// A track needs at least a start and an end.
    pub fn validate_point_count(&self, available: usize) -> Result<(), ValidationError> {
        if available < self.config.min_point_count {
            return Err(ValidationError::InsufficientPoints {
                available,
                required: self.config.min_point_count,
            });
        }
        Ok(())
    }

    pub fn validate_point(&self, index: usize, point: &TrackPoint) -> Result<(), ValidationError> {
        if self.config.check_latitude_range {
            Self::check_range(index, "lat", point.lat, -90.0, 90.0)?;
        }
        if self.config.check_longitude_range {
            Self::check_range(index, "lng", point.lng, -180.0, 180.0)?;
        }
        Ok(())
    }

    /// Collect ordering and elevation issues. Source order is trusted, so
    /// these are reported and logged but never reorder the track.
    pub fn inspect_track(&self, track: &Track) -> Vec<TrackWarning> {
        let mut warnings = Vec::new();
        let points = track.points();

        for (index, point) in points.iter().enumerate() {
            if point.elevation.is_none() {
                warnings.push(TrackWarning::MissingElevation { index });
            }
            if index > 0 && point.timestamp < points[index - 1].timestamp {
                warn!(
                    index,
                    previous = points[index - 1].timestamp,
                    current = point.timestamp,
                    "track timestamps go backwards"
                );
                warnings.push(TrackWarning::TimestampRegression {
                    index,
                    previous: points[index - 1].timestamp,
                    current: point.timestamp,
                });
            }
        }

        warnings
    }

    fn check_range(
        index: usize,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ValidationError> {
        if !value.is_finite() || value < min || value > max {
            return Err(ValidationError::CoordinateOutOfRange {
                index,
                field,
                value,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_count() {
        let validator = DataValidator::new();
        assert!(validator.validate_point_count(2).is_ok());
        assert_eq!(
            validator.validate_point_count(1),
            Err(ValidationError::InsufficientPoints {
                available: 1,
                required: 2
            })
        );
    }

    #[test]
    fn test_coordinate_ranges() {
        let validator = DataValidator::new();
        assert!(validator
            .validate_point(0, &TrackPoint::new(90.0, -180.0, None, 0))
            .is_ok());

        let err = validator
            .validate_point(4, &TrackPoint::new(91.0, 0.0, None, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CoordinateOutOfRange { index: 4, field: "lat", .. }
        ));

        let err = validator
            .validate_point(0, &TrackPoint::new(0.0, f64::NAN, None, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::CoordinateOutOfRange { field: "lng", .. }
        ));
    }

    #[test]
    fn test_relaxed_ranges() {
        let validator = DataValidator::with_config(ValidationConfig {
            check_longitude_range: false,
            ..ValidationConfig::default()
        });
        assert!(validator
            .validate_point(0, &TrackPoint::new(0.0, 200.0, None, 0))
            .is_ok());
    }

    #[test]
    fn test_inspect_track_reports_regressions() {
        let track = Track::from_points(vec![
            TrackPoint::new(0.0, 0.0, Some(1.0), 100),
            TrackPoint::new(0.0, 0.001, None, 90),
            TrackPoint::new(0.0, 0.002, Some(1.0), 110),
        ]);
        let warnings = DataValidator::new().inspect_track(&track);
        assert_eq!(
            warnings,
            vec![
                TrackWarning::MissingElevation { index: 1 },
                TrackWarning::TimestampRegression {
                    index: 1,
                    previous: 100,
                    current: 90
                },
            ]
        );
    }
}

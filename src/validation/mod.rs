//! Input validation and error types

pub mod data;
pub mod error;

pub use data::{DataValidator, TrackWarning, ValidationConfig};
pub use error::{TrackError, TrackResult, ValidationError};

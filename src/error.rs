//! Unified error handling for the track-analytics library.
//!
//! Only caller mistakes surface here: degenerate tracks and invalid
//! parameters. Floating-point edge cases (window clamping at the track ends,
//! cosines overshooting 1.0, zero time steps) are absorbed where they occur.

use thiserror::Error;

use crate::bounds::Metric;

/// Unified error type for track-analytics operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    /// The track reader supplied no fixes at all
    #[error("track has no fixes")]
    EmptyTrack,
    /// Too few fixes survived the noise filter to analyse the track
    #[error("track has {count} usable fixes, minimum {minimum} required")]
    InsufficientFixes { count: usize, minimum: usize },
    /// First and last fix share a timestamp
    #[error("track has zero duration")]
    ZeroDuration,
    /// A tuning parameter is out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A scale was requested for a metric the bounds never saw
    #[error("bounds have no {0:?} entry")]
    MissingMetric(Metric),
}

/// Result type alias for track-analytics operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Extension trait for converting Option to TrackError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a missing metric error.
    fn ok_or_missing(self, metric: Metric) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing(self, metric: Metric) -> Result<T> {
        self.ok_or(TrackError::MissingMetric(metric))
    }
}

/// Reject non-finite or non-positive tuning values.
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(TrackError::InvalidParameter(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

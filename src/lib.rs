//! # Track Analytics
//!
//! Flight track analytics for paraglider and sailplane track logs.
//!
//! This library provides:
//! - Spherical geodesy (distance, bearing, midpoint, interpolation, destination)
//! - Streaming noise filtering of raw fixes
//! - Time-indexed resampling and windowed kinematics (speed, climb, progress)
//! - Thermal / glide / dive segmentation with per-segment statistics
//! - Bounds, scales and color gradients shared across a group of tracks
//! - Douglas-Peucker simplification and salient-point extraction for charts
//!
//! ## Features
//!
//! - **`parallel`** - Analyse the tracks of a group in parallel with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{DateTime, Duration};
//! use track_analytics::{AnalysisConfig, Fix, Track, TrackMetadata};
//!
//! // Two minutes of straight flight north at ~12 m/s
//! let t0 = DateTime::from_timestamp(1_214_900_000, 0).unwrap();
//! let fixes: Vec<Fix> = (0..120)
//!     .map(|i| Fix::new(46.0 + 0.0001 * i as f64, 7.0, 2000.0 - i as f64, t0 + Duration::seconds(i)))
//!     .collect();
//!
//! let track = Track::new(&fixes, TrackMetadata::default(), &AnalysisConfig::default()).unwrap();
//! for stats in track.segment_stats() {
//!     println!("{:?}: {:.0} m in {:.0} s", stats.regime, stats.altitude_change, stats.duration);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, TrackError};

// Spherical geodesy
pub mod geodesy;
pub use geodesy::{compass_point, Coordinate, EARTH_RADIUS};

// Noise filter over raw fixes
pub mod filter;
pub use filter::{filter_fixes, NoiseFilter};

// Time-indexed resampling
pub mod resample;
pub use resample::TimeIndex;

// Windowed kinematics
pub mod kinematics;
pub use kinematics::Kinematics;

// Run-length toolkit
pub mod runs;
pub use runs::Run;

// Regime segmentation and segment statistics
pub mod segments;
pub use segments::{segment_regimes, Regime, Segment, SegmentConfig, SegmentStats};

// Analysed track
pub mod track;
pub use track::{time_mark_tier, TimeMark, TourStop, Track};

// Bounds aggregation
pub mod bounds;
pub use bounds::{Bounds, BoundsSet, Metric};

// Scales and color gradients
pub mod gradient;
pub mod scale;
pub use gradient::{Gradient, Rgba};
pub use scale::{Normalize, Scale, TimeScale, ZeroCenteredScale};

// Curve simplification and salient points
pub mod salient;
pub mod simplify;
pub use simplify::ChartConfig;

// Multi-track orchestration
pub mod group;
pub use group::{analyse_tracks, FlightGroup, ScaleConfig, ScaleSet, TrackInput};

// Algorithm toolbox - modular access to all algorithms
// Use track_analytics::algorithms::{...} for standalone algorithm access
pub mod algorithms;

/// One recorded position and time sample, as supplied by a track-log reader.
///
/// # Example
/// ```
/// use chrono::DateTime;
/// use track_analytics::Fix;
/// let t = DateTime::from_timestamp(1_214_900_000, 0).unwrap();
/// let fix = Fix::new(46.0, 7.0, 1500.0, t).with_airspeed(42.0);
/// assert_eq!(fix.true_airspeed, Some(42.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Degrees
    pub latitude: f64,
    /// Degrees
    pub longitude: f64,
    /// Meters
    pub elevation: f64,
    pub time: DateTime<Utc>,
    /// Recorded true airspeed in km/h, when the logger has a probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_airspeed: Option<f64>,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, elevation: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            time,
            true_airspeed: None,
        }
    }

    pub fn with_airspeed(mut self, true_airspeed: f64) -> Self {
        self.true_airspeed = Some(true_airspeed);
        self
    }

    /// Geodesic coordinate (radians) carrying this fix's time.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from_degrees(self.latitude, self.longitude, self.elevation).with_time(self.time)
    }
}

/// Free-text details from the track-log header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub pilot_name: Option<String>,
    pub glider_type: Option<String>,
    pub glider_id: Option<String>,
    pub competition_id: Option<String>,
    /// Raw task declaration, if any
    pub declaration: Option<String>,
}

/// Configuration for single-track analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Kinematics window length in seconds. Widened on sparse tracks so it
    /// always spans two samples.
    /// Default: 20.0
    pub window_secs: f64,

    /// Fixes implying a faster ground speed (m/s) are dropped.
    /// Default: 100.0
    pub max_speed_mps: f64,

    /// Fixes implying a faster climb (m/s) are dropped.
    /// Default: 30.0
    pub max_climb_mps: f64,

    /// Fixes implying a faster sink (m/s, negative) are dropped.
    /// Default: -30.0
    pub min_climb_mps: f64,

    /// Regime classification and acceptance thresholds.
    pub segments: SegmentConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_secs: 20.0,
            max_speed_mps: 100.0,
            max_climb_mps: 30.0,
            min_climb_mps: -30.0,
            segments: SegmentConfig::default(),
        }
    }
}

/// Seconds from `a` to `b`, microsecond precision.
pub(crate) fn seconds_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let delta = b - a;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

// ============================================================================
// Tests
// ============================================================================

//! # Algorithm Toolbox
//!
//! Direct access to every standalone algorithm in the crate. Use these to
//! plug individual steps into your own pipeline without building a
//! [`Track`](crate::Track).
//!
//! ## Geodesy
//!
//! - **Distance / Bearing**: great-circle distance and forward azimuth
//! - **Halfway / Interpolate / Destination**: points along and off an arc
//!
//! ## Series Analysis
//!
//! - **Noise Filter**: streaming rejection of implausible fixes
//! - **Kinematics**: windowed speed, climb and progress
//! - **Runs**: run-length encoding and gap condensing
//! - **Segmentation**: thermal / glide / dive labelling
//!
//! ## Charting
//!
//! - **Douglas-Peucker**: batch and budgeted polyline simplification
//! - **Salient Points**: peaks and troughs, optionally tiered
//!
//! # Example
//!
//! ```rust
//! use track_analytics::algorithms::{destination, distance, Coordinate};
//!
//! let launch = Coordinate::from_degrees(46.2, 7.5, 1800.0);
//! let goal = destination(&launch, 0.0, 25_000.0);
//! println!("Task: {:.1} km", distance(&launch, &goal) / 1000.0);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Coordinate, Fix, Kinematics, Run, Segment};

// =============================================================================
// Geodesy
// =============================================================================

pub use crate::geodesy::{
    compass_point, destination, distance, halfway, initial_bearing, interpolate,
};

// =============================================================================
// Filtering and Resampling
// =============================================================================

/// One-pass noise filter over raw fixes
pub use crate::filter::{filter_fixes, NoiseFilter};
/// Binary search for the first sample at or after a time
pub use crate::resample::{find_first_ge, TimeIndex};

// =============================================================================
// Kinematics and Segmentation
// =============================================================================

/// Windowed kinematics over a time index
pub use crate::kinematics::{effective_window, estimate, progress};
/// Run-length helpers
pub use crate::runs::{condense, runs, runs_where};
/// Interval labelling and accepted segments
pub use crate::segments::{classify, segment_regimes};

// =============================================================================
// Elevation Summaries
// =============================================================================

pub use crate::bounds::{max_elevation_gain, total_positive_elevation_gain};

// =============================================================================
// Line Simplification
// =============================================================================

/// Douglas-Peucker over parallel x/y slices.
///
/// # Example
/// ```rust
/// use track_analytics::algorithms::{douglas_peucker, incremental_douglas_peucker};
///
/// let x: Vec<f64> = (0..100).map(|i| i as f64).collect();
/// let y: Vec<f64> = x.iter().map(|v| (v / 10.0).sin() * 20.0).collect();
/// let all = douglas_peucker(&x, &y, 0.5);
/// let budget = incremental_douglas_peucker(&x, &y, 0.5, Some(8));
/// assert!(budget.len() <= 8 && budget.len() <= all.len());
/// ```
pub use crate::simplify::{chart_indexes, douglas_peucker, incremental_douglas_peucker};

// =============================================================================
// Salient Points
// =============================================================================

pub use crate::salient::{salient, salient_tiers};

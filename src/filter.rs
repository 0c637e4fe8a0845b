//! Noise filtering of raw track-log fixes.
//!
//! A single streaming pass that drops fixes implying impossible kinematics.
//! Each candidate is compared with the last *accepted* fix only; a rejected
//! fix never becomes the reference for the next one.

use log::debug;

use crate::{seconds_between, AnalysisConfig, Fix};

/// Substituted for a zero time step so rates stay finite.
const MIN_DT_SECS: f64 = 0.001;

/// Stateful one-pass filter holding the last accepted fix.
///
/// # Example
/// ```
/// use track_analytics::{AnalysisConfig, Fix, NoiseFilter};
/// use chrono::DateTime;
///
/// let t0 = DateTime::from_timestamp(1_200_000_000, 0).unwrap();
/// let t1 = DateTime::from_timestamp(1_200_000_001, 0).unwrap();
/// let mut filter = NoiseFilter::new(&AnalysisConfig::default());
/// assert!(filter.accept(&Fix::new(46.0, 7.0, 1000.0, t0)));
/// // 1 km in one second is not a glider
/// assert!(!filter.accept(&Fix::new(46.009, 7.0, 1000.0, t1)));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    last: Option<Fix>,
    max_speed: f64,
    min_climb: f64,
    max_climb: f64,
    rejected: usize,
}

impl NoiseFilter {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            last: None,
            max_speed: config.max_speed_mps,
            min_climb: config.min_climb_mps,
            max_climb: config.max_climb_mps,
            rejected: 0,
        }
    }

    /// Offer the next fix; returns whether it was accepted.
    pub fn accept(&mut self, fix: &Fix) -> bool {
        let Some(last) = &self.last else {
            self.last = Some(fix.clone());
            return true;
        };

        if fix.time <= last.time {
            self.rejected += 1;
            return false;
        }

        let mut dt = seconds_between(last.time, fix.time);
        if dt == 0.0 {
            dt = MIN_DT_SECS;
        }

        let ds = last.coordinate().distance_to(&fix.coordinate());
        if ds / dt > self.max_speed {
            self.rejected += 1;
            return false;
        }

        let climb = (fix.elevation - last.elevation) / dt;
        if climb < self.min_climb || climb > self.max_climb {
            self.rejected += 1;
            return false;
        }

        self.last = Some(fix.clone());
        true
    }

    /// Number of fixes dropped so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

/// Filter a raw fix list, always keeping the first fix.
pub fn filter_fixes(fixes: &[Fix], config: &AnalysisConfig) -> Vec<Fix> {
    let mut filter = NoiseFilter::new(config);
    let kept: Vec<Fix> = fixes.iter().filter(|f| filter.accept(f)).cloned().collect();
    if filter.rejected() > 0 {
        debug!(
            "[NoiseFilter] Dropped {} of {} fixes",
            filter.rejected(),
            fixes.len()
        );
    }
    kept
}

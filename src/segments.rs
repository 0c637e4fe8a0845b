//! Flight regime segmentation.
//!
//! Every inter-sample interval is tested against three predicates (glide,
//! dive, thermal) computed from the windowed kinematics. For each predicate
//! the maximal true runs are condensed across short time gaps and written
//! into a label array in the fixed order glide, dive, thermal: a later write
//! overrides an earlier one. Dive runs are only written when the condensed
//! run lost enough altitude. The label array is then split into segments and
//! each segment must pass its regime's acceptance filter; failures are
//! dropped, never reclassified.

use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::geodesy::{compass_point, Coordinate};
use crate::kinematics::Kinematics;
use crate::runs::{condense, runs, runs_where, Run};
use crate::track::Track;

/// Classified flight behaviour of an interval or segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    #[default]
    Unknown,
    /// Climbing in circles
    Thermal,
    /// Directional travel
    Glide,
    /// Rapid descent
    Dive,
}

/// Half-open interval range `[start, stop)` tagged with its regime.
///
/// Interval `j` lies between samples `j` and `j + 1`, so a segment covers
/// samples `start..=stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub regime: Regime,
    pub start: usize,
    pub stop: usize,
}

impl Segment {
    pub fn new(regime: Regime, start: usize, stop: usize) -> Self {
        Self {
            regime,
            start,
            stop,
        }
    }

    /// Duration in seconds given sample times.
    pub fn duration(&self, times: &[f64]) -> f64 {
        times[self.stop] - times[self.start]
    }

    /// Net elevation change between the first and last sample.
    pub fn altitude_change(&self, elevations: &[f64]) -> f64 {
        elevations[self.stop] - elevations[self.start]
    }

    pub fn run(&self) -> Run {
        Run::new(self.start, self.stop)
    }
}

/// Classification and acceptance thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Progress at or above which an interval is gliding
    pub glide_progress: f64,
    /// Dive intervals climb slower than this (m/s)
    pub dive_climb: f64,
    /// Slow intervals (km/h) that climb at all count as thermalling
    pub thermal_speed: f64,
    /// Any interval climbing faster than this (m/s) counts as thermalling
    pub thermal_climb: f64,
    /// Gap (s) below which glide runs are merged
    pub glide_merge_secs: f64,
    /// Gap (s) below which dive runs are merged
    pub dive_merge_secs: f64,
    /// Gap (s) below which thermal runs are merged
    pub thermal_merge_secs: f64,
    /// Minimum accepted thermal duration (s)
    pub thermal_min_secs: f64,
    /// Thermals must gain more than this (m)
    pub thermal_min_gain: f64,
    /// Minimum accepted dive duration (s)
    pub dive_min_secs: f64,
    /// Dives must average a climb rate below this (m/s)
    pub dive_max_climb: f64,
    /// A dive candidate must lose more than this (m) to be labelled
    pub dive_min_loss: f64,
    /// Minimum accepted glide duration (s)
    pub glide_min_secs: f64,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            glide_progress: 0.9,
            dive_climb: 1.0,
            thermal_speed: 10.0,
            thermal_climb: 1.0,
            glide_merge_secs: 60.0,
            dive_merge_secs: 30.0,
            thermal_merge_secs: 60.0,
            thermal_min_secs: 60.0,
            thermal_min_gain: 50.0,
            dive_min_secs: 30.0,
            dive_max_climb: -2.0,
            dive_min_loss: 100.0,
            glide_min_secs: 120.0,
        }
    }
}

impl SegmentConfig {
    fn is_glide(&self, progress: f64) -> bool {
        progress >= self.glide_progress
    }

    fn is_dive(&self, progress: f64, climb: f64) -> bool {
        progress < self.glide_progress && climb < self.dive_climb
    }

    fn is_thermal(&self, progress: f64, climb: f64, speed: f64) -> bool {
        (progress < self.glide_progress && climb > 0.0)
            || (speed < self.thermal_speed && climb > 0.0)
            || climb > self.thermal_climb
    }

    fn accepts(&self, regime: Regime, dt: f64, dz: f64) -> bool {
        match regime {
            Regime::Thermal => dt >= self.thermal_min_secs && dz > self.thermal_min_gain,
            Regime::Dive => dt >= self.dive_min_secs && dz / dt < self.dive_max_climb,
            Regime::Glide => dt >= self.glide_min_secs,
            Regime::Unknown => false,
        }
    }
}

/// Label every interval, in write order glide, dive, thermal.
pub fn classify(
    times: &[f64],
    elevations: &[f64],
    kinematics: &Kinematics,
    config: &SegmentConfig,
) -> Vec<Regime> {
    let n = kinematics.len();
    let mut state = vec![Regime::Unknown; n];

    let glide: Vec<bool> = (0..n)
        .map(|i| config.is_glide(kinematics.progress[i]))
        .collect();
    for run in condense(&runs_where(&glide), times, config.glide_merge_secs) {
        state[run.range()].fill(Regime::Glide);
    }

    let dive: Vec<bool> = (0..n)
        .map(|i| config.is_dive(kinematics.progress[i], kinematics.climb[i]))
        .collect();
    for run in condense(&runs_where(&dive), times, config.dive_merge_secs) {
        if elevations[run.stop] - elevations[run.start] < -config.dive_min_loss {
            state[run.range()].fill(Regime::Dive);
        }
    }

    let thermal: Vec<bool> = (0..n)
        .map(|i| {
            config.is_thermal(
                kinematics.progress[i],
                kinematics.climb[i],
                kinematics.speed[i],
            )
        })
        .collect();
    for run in condense(&runs_where(&thermal), times, config.thermal_merge_secs) {
        state[run.range()].fill(Regime::Thermal);
    }

    state
}

/// Classify intervals and keep the segments that pass their acceptance
/// filter, in track order.
pub fn segment_regimes(
    times: &[f64],
    elevations: &[f64],
    kinematics: &Kinematics,
    config: &SegmentConfig,
) -> Vec<Segment> {
    let state = classify(times, elevations, kinematics, config);
    let segments: Vec<Segment> = runs(&state)
        .into_iter()
        .filter(|(_, regime)| *regime != Regime::Unknown)
        .map(|(run, regime)| Segment::new(regime, run.start, run.stop))
        .filter(|seg| {
            config.accepts(
                seg.regime,
                seg.duration(times),
                seg.altitude_change(elevations),
            )
        })
        .collect();

    debug!(
        "[Segmenter] {} intervals -> {} thermals, {} glides, {} dives",
        state.len(),
        segments.iter().filter(|s| s.regime == Regime::Thermal).count(),
        segments.iter().filter(|s| s.regime == Regime::Glide).count(),
        segments.iter().filter(|s| s.regime == Regime::Dive).count()
    );

    segments
}

/// Summary of one segment, as shown next to it on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub regime: Regime,
    /// Great-circle midpoint of the segment's end points
    pub midpoint: Coordinate,
    pub start_altitude: f64,
    pub finish_altitude: f64,
    /// Unix seconds
    pub start_time: f64,
    /// Unix seconds
    pub finish_time: f64,
    /// Seconds
    pub duration: f64,
    /// Net elevation change, m
    pub altitude_change: f64,
    /// Net elevation change over duration, m/s
    pub average_climb: f64,
    /// Highest windowed climb rate inside the segment
    pub maximum_climb: f64,
    /// Lowest windowed climb rate inside the segment
    pub maximum_descent: f64,
    /// Highest raw sample-to-sample climb rate (never below 0)
    pub peak_climb: f64,
    /// Lowest raw sample-to-sample climb rate (never above 0)
    pub peak_descent: f64,
    pub accumulated_gain: f64,
    /// Sum of negative elevation steps (a negative number)
    pub accumulated_loss: f64,
    /// Straight-line distance between end points, m
    pub distance: f64,
    /// Straight-line ground speed, km/h
    pub average_speed: f64,
    /// Distance over height lost; `None` when no height was lost
    pub glide_ratio: Option<f64>,
    /// Average climb as a percentage of the best windowed climb
    pub efficiency: Option<f64>,
    /// Direction the air mass carried the glider, radians
    pub drift_bearing: f64,
    pub drift_direction: String,
}

impl SegmentStats {
    /// Compute the summary for `segment` of `track`.
    pub fn compute(track: &Track, segment: &Segment) -> Self {
        let coords = track.coords();
        let times = track.times();
        let climb = &track.kinematics().climb;

        let coord0 = coords[segment.start];
        let coord1 = coords[segment.stop];

        let mut accumulated_gain = 0.0;
        let mut accumulated_loss = 0.0;
        let mut peak_climb = 0.0_f64;
        let mut peak_descent = 0.0_f64;
        for i in segment.start..segment.stop {
            let dz = coords[i + 1].ele - coords[i].ele;
            let dt = times[i + 1] - times[i];
            if dz > 0.0 {
                accumulated_gain += dz;
            } else if dz < 0.0 {
                accumulated_loss += dz;
            }
            let rate = dz / dt;
            peak_climb = peak_climb.max(rate);
            peak_descent = peak_descent.min(rate);
        }

        let window = &climb[segment.start..segment.stop];
        let maximum_climb = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let maximum_descent = window.iter().copied().fold(f64::INFINITY, f64::min);

        let dz = coord1.ele - coord0.ele;
        let dt = times[segment.stop] - times[segment.start];
        let dp = coord0.distance_to(&coord1);
        let theta = coord0.initial_bearing_to(&coord1);

        let divisor = dt * maximum_climb;
        let efficiency = (divisor != 0.0).then(|| 100.0 * dz / divisor);
        let glide_ratio = (dz < 0.0).then(|| -dp / dz);
        let drift_bearing = (theta + PI).rem_euclid(2.0 * PI);

        Self {
            regime: segment.regime,
            midpoint: coord0.halfway_to(&coord1),
            start_altitude: coord0.ele,
            finish_altitude: coord1.ele,
            start_time: times[segment.start],
            finish_time: times[segment.stop],
            duration: dt,
            altitude_change: dz,
            average_climb: dz / dt,
            maximum_climb,
            maximum_descent,
            peak_climb,
            peak_descent,
            accumulated_gain,
            accumulated_loss,
            distance: dp,
            average_speed: 3.6 * dp / dt,
            glide_ratio,
            efficiency,
            drift_bearing,
            drift_direction: compass_point(drift_bearing).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinematics(progress: Vec<f64>, climb: Vec<f64>, speed: Vec<f64>) -> Kinematics {
        Kinematics {
            window_secs: 20.0,
            energy_compensated_climb: climb.clone(),
            speed,
            climb,
            progress,
        }
    }

    fn seconds(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_predicates() {
        let c = SegmentConfig::default();
        assert!(c.is_glide(0.9));
        assert!(!c.is_glide(0.89));
        assert!(c.is_dive(0.5, 0.99));
        assert!(!c.is_dive(0.95, -5.0));
        // circling and climbing
        assert!(c.is_thermal(0.3, 0.1, 30.0));
        // slow and climbing, even when straight
        assert!(c.is_thermal(0.95, 0.1, 8.0));
        // strong climb, anything goes
        assert!(c.is_thermal(0.95, 1.5, 40.0));
        assert!(!c.is_thermal(0.95, 0.5, 40.0));
    }

    #[test]
    fn test_thermal_overrides_dive_in_write_order() {
        // Circling with a weak climb (0.5 m/s) matches both dive and thermal
        let n = 100;
        let times = seconds(n + 1);
        let ele: Vec<f64> = (0..=n).map(|i| 1000.0 - 2.0 * i as f64).collect();
        let k = kinematics(vec![0.2; n], vec![0.5; n], vec![30.0; n]);
        let state = classify(&times, &ele, &k, &SegmentConfig::default());
        assert!(state.iter().all(|r| *r == Regime::Thermal));
    }

    #[test]
    fn test_dive_needs_altitude_loss_to_be_written() {
        let n = 60;
        let times = seconds(n + 1);
        let k = kinematics(vec![0.5; n], vec![-3.0; n], vec![50.0; n]);

        // lost 60 m: never labelled
        let shallow: Vec<f64> = (0..=n).map(|i| 1000.0 - i as f64).collect();
        let state = classify(&times, &shallow, &k, &SegmentConfig::default());
        assert!(state.iter().all(|r| *r == Regime::Unknown));

        // lost 180 m in 60 s: a dive
        let steep: Vec<f64> = (0..=n).map(|i| 1000.0 - 3.0 * i as f64).collect();
        let segments = segment_regimes(&times, &steep, &k, &SegmentConfig::default());
        assert_eq!(segments, vec![Segment::new(Regime::Dive, 0, n)]);
    }

    #[test]
    fn test_glide_runs_merge_across_short_gaps() {
        // 100s glide, 30s circling without climb, 100s glide
        let n = 230;
        let times = seconds(n + 1);
        let mut progress = vec![0.95; n];
        for p in progress.iter_mut().skip(100).take(30) {
            *p = 0.5;
        }
        let ele: Vec<f64> = (0..=n).map(|i| 2000.0 - 0.5 * i as f64).collect();
        let k = kinematics(progress, vec![-0.5; n], vec![40.0; n]);
        let segments = segment_regimes(&times, &ele, &k, &SegmentConfig::default());
        assert_eq!(segments, vec![Segment::new(Regime::Glide, 0, n)]);
    }

    #[test]
    fn test_acceptance_filters_drop_weak_segments() {
        // 40s of thermal (too short), then 100s of glide (too short)
        let n = 140;
        let times = seconds(n + 1);
        let mut progress = vec![0.3; n];
        let mut climb = vec![2.0; n];
        for i in 40..n {
            progress[i] = 0.97;
            climb[i] = -1.0;
        }
        let ele: Vec<f64> = (0..=n)
            .map(|i| if i <= 40 { 1000.0 + 2.0 * i as f64 } else { 1080.0 - (i - 40) as f64 })
            .collect();
        let k = kinematics(progress, climb, vec![35.0; n]);
        let state = classify(&times, &ele, &k, &SegmentConfig::default());
        assert_eq!(state[0], Regime::Thermal);
        assert_eq!(state[n - 1], Regime::Glide);
        assert!(segment_regimes(&times, &ele, &k, &SegmentConfig::default()).is_empty());
    }

    #[test]
    fn test_accepted_thermal_meets_thresholds() {
        let c = SegmentConfig::default();
        assert!(c.accepts(Regime::Thermal, 60.0, 50.1));
        assert!(!c.accepts(Regime::Thermal, 59.0, 300.0));
        assert!(!c.accepts(Regime::Thermal, 300.0, 50.0));
        assert!(c.accepts(Regime::Glide, 120.0, -500.0));
        assert!(!c.accepts(Regime::Glide, 119.0, -500.0));
        assert!(c.accepts(Regime::Dive, 30.0, -90.0));
        assert!(!c.accepts(Regime::Dive, 30.0, -60.0));
        assert!(!c.accepts(Regime::Unknown, 1000.0, 0.0));
    }

    #[test]
    fn test_segment_helpers() {
        let seg = Segment::new(Regime::Thermal, 2, 5);
        let times = [0.0, 4.0, 8.0, 12.0, 16.0, 20.0];
        let ele = [0.0, 0.0, 100.0, 150.0, 170.0, 220.0];
        assert_eq!(seg.duration(&times), 12.0);
        assert_eq!(seg.altitude_change(&ele), 120.0);
        assert_eq!(seg.run(), Run::new(2, 5));
    }
}

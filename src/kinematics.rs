//! Windowed kinematics estimation.
//!
//! For every inter-sample interval a time window of `dt` seconds is centred on
//! the interval midpoint and the track is resampled at both window edges. From
//! the two resampled points we derive:
//!
//! - **speed**: path length travelled inside the window, in km/h
//! - **climb**: net elevation change over the window, in m/s
//! - **energy-compensated climb**: climb plus a kinetic-energy term
//! - **progress**: straight-line displacement over path length, in [0, 1]
//!
//! All series have one value per interval (`n - 1` values for `n` samples).
//! Index `j` describes the interval between samples `j` and `j + 1`.

use serde::{Deserialize, Serialize};

use crate::resample::TimeIndex;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Per-interval kinematic series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Effective window length in seconds
    pub window_secs: f64,
    /// Ground speed along the path, km/h
    pub speed: Vec<f64>,
    /// Climb rate, m/s
    pub climb: Vec<f64>,
    /// Climb rate with the kinetic-energy term added
    pub energy_compensated_climb: Vec<f64>,
    /// Straight-line displacement / path length
    pub progress: Vec<f64>,
}

impl Kinematics {
    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.progress.len()
    }

    pub fn is_empty(&self) -> bool {
        self.progress.is_empty()
    }
}

/// Widen `dt` to at least two average sample intervals so sparse tracks
/// always have two raw samples inside the window.
pub fn effective_window(times: &[f64], dt: f64) -> f64 {
    if times.len() < 2 {
        return dt;
    }
    let period = (times[times.len() - 1] - times[0]) / (times.len() - 1) as f64;
    dt.max(2.0 * period)
}

/// Ratio of straight-line displacement `dp` to path length `ds`.
///
/// Zero when nothing was travelled; a displacement exceeding the path length
/// is rounding and counts as fully directional.
pub fn progress(dp: f64, ds: f64) -> f64 {
    if ds == 0.0 {
        0.0
    } else if dp > ds {
        1.0
    } else {
        dp / ds
    }
}

/// Estimate per-interval kinematics with a window of `dt` seconds
/// (enlarged by [`effective_window`]).
pub fn estimate(index: &TimeIndex<'_>, dt: f64) -> Kinematics {
    let times = index.times();
    let n = times.len();
    let dt = effective_window(times, dt);

    let capacity = n.saturating_sub(1);
    let mut result = Kinematics {
        window_secs: dt,
        speed: Vec::with_capacity(capacity),
        climb: Vec::with_capacity(capacity),
        energy_compensated_climb: Vec::with_capacity(capacity),
        progress: Vec::with_capacity(capacity),
    };

    for i in 1..n {
        let t0 = (times[i - 1] + times[i]) / 2.0 - dt / 2.0;
        let t1 = t0 + dt;
        let (coord0, s0) = index.sample_at(t0);
        let (coord1, s1) = index.sample_at(t1);

        let ds = s1 - s0;
        let dp = coord0.distance_to(&coord1);
        let dz = coord1.ele - coord0.ele;

        result.speed.push(3.6 * ds / dt);
        result.climb.push(dz / dt);
        result
            .energy_compensated_climb
            .push(dz / dt + (s1 * s1 - s0 * s0) / (2.0 * STANDARD_GRAVITY));
        result.progress.push(progress(dp, ds));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::Coordinate;

    fn straight(n: usize, step_m: f64, climb: f64) -> (Vec<f64>, Vec<Coordinate>, Vec<f64>) {
        let start = Coordinate::from_degrees(46.0, 7.0, 1000.0);
        let times: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let coords: Vec<Coordinate> = (0..n)
            .map(|i| {
                let mut c = start.destination(0.5, step_m * i as f64);
                c.ele = 1000.0 + climb * i as f64;
                c
            })
            .collect();
        let mut s = vec![0.0];
        for w in coords.windows(2) {
            s.push(s[s.len() - 1] + w[0].distance_to(&w[1]));
        }
        (times, coords, s)
    }

    #[test]
    fn test_effective_window() {
        let dense: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert_eq!(effective_window(&dense, 20.0), 20.0);
        let sparse: Vec<f64> = (0..10).map(|i| 30.0 * i as f64).collect();
        assert_eq!(effective_window(&sparse, 20.0), 60.0);
    }

    #[test]
    fn test_progress_rules() {
        assert_eq!(progress(5.0, 0.0), 0.0);
        assert_eq!(progress(10.5, 10.0), 1.0);
        assert_eq!(progress(5.0, 10.0), 0.5);
    }

    #[test]
    fn test_straight_line_kinematics() {
        let (times, coords, s) = straight(120, 10.0, 2.0);
        let index = TimeIndex::new(&times, &coords, &s);
        let k = estimate(&index, 20.0);

        assert_eq!(k.len(), 119);
        assert_eq!(k.window_secs, 20.0);
        // Away from the ends the full window fits inside the track
        for j in 15..100 {
            assert!((k.speed[j] - 36.0).abs() < 0.01, "speed {}", k.speed[j]);
            assert!((k.climb[j] - 2.0).abs() < 1e-6, "climb {}", k.climb[j]);
            assert!(k.progress[j] > 0.999);
        }
        assert!(k.progress.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_window_clamped_at_track_ends() {
        let (times, coords, s) = straight(60, 10.0, 2.0);
        let index = TimeIndex::new(&times, &coords, &s);
        let k = estimate(&index, 20.0);
        // First interval: window [-9.5, 10.5] clamps to [0, 10.5]
        assert!((k.climb[0] - 2.0 * 10.5 / 20.0).abs() < 1e-6);
        assert!((k.speed[0] - 3.6 * 105.0 / 20.0).abs() < 0.01);
    }

    #[test]
    fn test_stationary_has_zero_progress() {
        let start = Coordinate::from_degrees(46.0, 7.0, 500.0);
        let times: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let coords = vec![start; 30];
        let s = vec![0.0; 30];
        let index = TimeIndex::new(&times, &coords, &s);
        let k = estimate(&index, 20.0);
        assert!(k.progress.iter().all(|&p| p == 0.0));
        assert!(k.speed.iter().all(|&v| v == 0.0));
    }
}

//! Time-indexed resampling of a filtered track.
//!
//! Maps an arbitrary timestamp to a coordinate (and a cumulative path length)
//! by binary search over the sorted sample times and geodesic interpolation
//! between the bracketing samples. Times before the first sample clamp to the
//! first sample, times at or after the last clamp to the last.

use crate::geodesy::Coordinate;

/// Where a timestamp falls relative to the samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// Before the first sample
    Start,
    /// Exactly on sample `i`
    Exact(usize),
    /// Between samples `i - 1` and `i`, at `fraction` of the way
    Between(usize, f64),
    /// At or after the last sample
    End,
}

/// Index of the first element `>= value`, or `None` when every element is
/// smaller.
///
/// # Example
/// ```
/// use track_analytics::resample::find_first_ge;
/// assert_eq!(find_first_ge(&[0.0, 2.0, 4.0], 1.0), Some(1));
/// assert_eq!(find_first_ge(&[0.0, 2.0, 4.0], 2.0), Some(1));
/// assert_eq!(find_first_ge(&[0.0, 2.0, 4.0], 5.0), None);
/// ```
pub fn find_first_ge(sorted: &[f64], value: f64) -> Option<usize> {
    let index = sorted.partition_point(|&x| x < value);
    (index < sorted.len()).then_some(index)
}

/// Borrowed view over parallel sample arrays: timestamps (seconds),
/// coordinates and cumulative path length.
#[derive(Debug, Clone, Copy)]
pub struct TimeIndex<'a> {
    times: &'a [f64],
    coords: &'a [Coordinate],
    s: &'a [f64],
}

impl<'a> TimeIndex<'a> {
    /// All three slices must have the same non-zero length and `times` must be
    /// strictly increasing.
    pub fn new(times: &'a [f64], coords: &'a [Coordinate], s: &'a [f64]) -> Self {
        debug_assert!(!times.is_empty());
        debug_assert_eq!(times.len(), coords.len());
        debug_assert_eq!(times.len(), s.len());
        Self { times, coords, s }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &'a [f64] {
        self.times
    }

    /// Locate `t` among the samples.
    pub fn position(&self, t: f64) -> Position {
        let last = self.times.len() - 1;
        if t < self.times[0] {
            return Position::Start;
        }
        if self.times[last] <= t {
            return Position::End;
        }
        match find_first_ge(self.times, t) {
            Some(i) if self.times[i] == t => Position::Exact(i),
            Some(i) => {
                let fraction = (t - self.times[i - 1]) / (self.times[i] - self.times[i - 1]);
                Position::Between(i, fraction)
            }
            None => Position::End,
        }
    }

    /// Coordinate at time `t`.
    pub fn coord_at(&self, t: f64) -> Coordinate {
        match self.position(t) {
            Position::Start => self.coords[0],
            Position::End => self.coords[self.coords.len() - 1],
            Position::Exact(i) => self.coords[i],
            Position::Between(i, fraction) => {
                let c = self.coords[i - 1].interpolate(&self.coords[i], fraction);
                match self.coords[i - 1].time {
                    Some(t0) => c.with_time(t0 + offset(t - self.times[i - 1])),
                    None => c,
                }
            }
        }
    }

    /// Cumulative path length at time `t`.
    pub fn s_at(&self, t: f64) -> f64 {
        match self.position(t) {
            Position::Start => self.s[0],
            Position::End => self.s[self.s.len() - 1],
            Position::Exact(i) => self.s[i],
            Position::Between(i, fraction) => {
                (1.0 - fraction) * self.s[i - 1] + fraction * self.s[i]
            }
        }
    }

    /// Coordinate and path length at `t` in one lookup.
    pub fn sample_at(&self, t: f64) -> (Coordinate, f64) {
        (self.coord_at(t), self.s_at(t))
    }
}

fn offset(secs: f64) -> chrono::Duration {
    chrono::Duration::microseconds((secs * 1e6).round() as i64)
}

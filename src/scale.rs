//! Value scales for color-coding and charting.
//!
//! A scale owns a "nice" range: the raw range is snapped outward to multiples
//! of a step from the 1-2-5 sequence (`step, 2·step, 5·step, 10·step, ...`)
//! chosen so the range holds at most `max_divisions` grid divisions.
//!
//! - [`Scale`]: linear mapping of the range onto [0, 1]
//! - [`ZeroCenteredScale`]: bilinear mapping with 0 pinned to 0.5, for
//!   climb/sink where zero means "neither"
//! - [`TimeScale`]: wall-clock steps (1 s … 12 h) with `HH:MM` labels

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Result, TrackError};
use crate::gradient::{Gradient, Rgba};

/// Default number of grid divisions.
pub const DEFAULT_MAX_DIVISIONS: usize = 16;

/// Default number of discrete color levels.
pub const DEFAULT_BUCKETS: usize = 32;

/// Candidate steps for time scales, in seconds.
const TIME_STEPS: [i64; 12] = [
    1,
    5,
    15,
    30,
    60,
    5 * 60,
    15 * 60,
    30 * 60,
    3600,
    3 * 3600,
    6 * 3600,
    12 * 3600,
];

/// Mapping between values and the unit interval.
pub trait Normalize {
    /// `(low, high)` of the snapped range.
    fn range(&self) -> (f64, f64);

    /// Map `value` into [0, 1], clamping outside the range.
    fn normalize(&self, value: f64) -> f64;

    /// Inverse of [`Normalize::normalize`] inside the range.
    fn denormalize(&self, fraction: f64) -> f64;

    /// Round the normalized value to one of `buckets` integer levels.
    fn discretize(&self, value: f64, buckets: usize) -> usize {
        let buckets = buckets.max(1);
        let (low, high) = self.range();
        if value < low {
            0
        } else if value > high {
            buckets - 1
        } else {
            let level = (buckets as f64 * self.normalize(value)).round() as usize;
            level.min(buckets - 1)
        }
    }

    fn color<G: Gradient + ?Sized>(&self, value: f64, gradient: &G) -> Rgba
    where
        Self: Sized,
    {
        gradient.color(self.normalize(value))
    }

    /// `n` evenly spaced swatches from the bottom to the top of the scale.
    fn colors<G: Gradient + ?Sized>(&self, n: usize, gradient: &G) -> Vec<Rgba>
    where
        Self: Sized,
    {
        match n {
            0 => Vec::new(),
            1 => vec![gradient.color(0.0)],
            _ => (0..n)
                .map(|i| gradient.color(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }

    /// Linear position of `value` along an axis `extent` pixels long.
    /// Unlike [`Normalize::normalize`] this does not clamp.
    fn to_pixels(&self, value: f64, extent: f64) -> f64 {
        let (low, high) = self.range();
        extent * (value - low) / (high - low)
    }
}

/// Linear scale over a snapped range.
///
/// # Example
/// ```
/// use track_analytics::scale::{Normalize, Scale};
/// let scale = Scale::new("altitude", (812.0, 2347.0), 1.0, 16).unwrap();
/// assert_eq!(scale.range(), (800.0, 2400.0));
/// assert_eq!(scale.step(), Some(100.0));
/// assert_eq!(scale.normalize(1600.0), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    title: String,
    low: f64,
    high: f64,
    step: Option<f64>,
    /// Grid spacing as a percentage of the axis
    grid_step: Option<f64>,
}

impl Scale {
    /// Snap `range` outward to the first step in `step, 2·step, 5·step,
    /// 10·step, ...` that yields at most `max_divisions` divisions.
    pub fn new(title: &str, range: (f64, f64), step: f64, max_divisions: usize) -> Result<Self> {
        let step = ensure_positive("scale step", step)?;
        check_range(range)?;
        if max_divisions == 0 {
            return Err(TrackError::InvalidParameter(
                "max_divisions must be at least 1".to_string(),
            ));
        }
        let (low, high) = (range.0.min(range.1), range.0.max(range.1));

        let mut base = step;
        loop {
            for candidate in [base, 2.0 * base, 5.0 * base] {
                let mut lower = (low / candidate).trunc();
                let mut upper = (high / candidate).trunc();
                if low < candidate * lower {
                    lower -= 1.0;
                }
                if high > candidate * upper {
                    upper += 1.0;
                }
                if upper - lower <= max_divisions as f64 {
                    if upper == lower {
                        upper += 1.0;
                    }
                    return Ok(Self {
                        title: title.to_string(),
                        low: candidate * lower,
                        high: candidate * upper,
                        step: Some(candidate),
                        grid_step: Some(100.0 / (upper - lower)),
                    });
                }
            }
            base *= 10.0;
        }
    }

    /// Scale over `range` exactly as given, without snapping.
    pub fn unsnapped(title: &str, range: (f64, f64)) -> Result<Self> {
        check_range(range)?;
        let (low, high) = (range.0.min(range.1), range.0.max(range.1));
        if low == high {
            return Err(TrackError::InvalidParameter(
                "unsnapped scale needs a non-empty range".to_string(),
            ));
        }
        Ok(Self {
            title: title.to_string(),
            low,
            high,
            step: None,
            grid_step: None,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn step(&self) -> Option<f64> {
        self.step
    }

    pub fn grid_step(&self) -> Option<f64> {
        self.grid_step
    }
}

impl Normalize for Scale {
    fn range(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    fn normalize(&self, value: f64) -> f64 {
        if value < self.low {
            0.0
        } else if self.high <= value {
            1.0
        } else {
            (value - self.low) / (self.high - self.low)
        }
    }

    fn denormalize(&self, fraction: f64) -> f64 {
        self.low + fraction.clamp(0.0, 1.0) * (self.high - self.low)
    }
}

/// Bilinear scale: negative values map onto [0, 0.5), positive onto
/// (0.5, 1], and zero exactly to 0.5 however lopsided the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCenteredScale {
    scale: Scale,
}

impl ZeroCenteredScale {
    pub fn new(title: &str, range: (f64, f64), step: f64, max_divisions: usize) -> Result<Self> {
        Ok(Self {
            scale: Scale::new(title, range, step, max_divisions)?,
        })
    }

    pub fn title(&self) -> &str {
        self.scale.title()
    }

    pub fn step(&self) -> Option<f64> {
        self.scale.step()
    }

    pub fn grid_step(&self) -> Option<f64> {
        self.scale.grid_step()
    }
}

impl Normalize for ZeroCenteredScale {
    fn range(&self) -> (f64, f64) {
        self.scale.range()
    }

    fn normalize(&self, value: f64) -> f64 {
        let (low, high) = self.range();
        if value < 0.0 {
            if value < low {
                0.0
            } else {
                0.5 - 0.5 * value / low
            }
        } else if value == 0.0 {
            0.5
        } else if high <= value {
            1.0
        } else {
            0.5 + 0.5 * value / high
        }
    }

    fn denormalize(&self, fraction: f64) -> f64 {
        let (low, high) = self.range();
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction < 0.5 {
            (1.0 - 2.0 * fraction) * low
        } else {
            (2.0 * fraction - 1.0) * high
        }
    }
}

/// Time axis snapped to wall-clock steps, with tick labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    /// Range in unix seconds
    scale: Scale,
    step_secs: i64,
    labels: Vec<String>,
    /// Tick positions as a percentage of the axis
    positions: Vec<f64>,
}

impl TimeScale {
    /// Snap `range` to the first step of at least `min_step_secs` giving
    /// fewer than `max_divisions` divisions. Labels are rendered in UTC
    /// shifted by `timezone_offset`.
    pub fn new(
        title: &str,
        range: (DateTime<Utc>, DateTime<Utc>),
        min_step_secs: i64,
        max_divisions: usize,
        timezone_offset: Duration,
    ) -> Result<Self> {
        let start = range.0.min(range.1).timestamp();
        let end_dt = range.0.max(range.1);
        let end = end_dt.timestamp() + i64::from(end_dt.timestamp_subsec_nanos() > 0);

        let snap = |step: i64| {
            let lower = start - start.rem_euclid(step);
            let mut upper = end - end.rem_euclid(step);
            if upper < end || upper == lower {
                upper += step;
            }
            (lower, upper)
        };

        let candidates: Vec<i64> = TIME_STEPS
            .iter()
            .copied()
            .filter(|&s| s >= min_step_secs)
            .collect();
        let mut chosen = None;
        for &step in &candidates {
            let (lower, upper) = snap(step);
            if (upper - lower) / step < max_divisions as i64 {
                chosen = Some((step, lower, upper));
                break;
            }
        }
        // Longer than the coarsest step can grid: use the coarsest anyway
        let (step, lower, upper) = match chosen {
            Some(c) => c,
            None => {
                let step = candidates.last().copied().unwrap_or(TIME_STEPS[TIME_STEPS.len() - 1]);
                let (lower, upper) = snap(step);
                (step, lower, upper)
            }
        };

        let mut scale = Scale::unsnapped(title, (lower as f64, upper as f64))?;
        scale.step = Some(step as f64);
        scale.grid_step = Some(100.0 * step as f64 / (upper - lower) as f64);

        let mut labels = Vec::new();
        let mut positions = Vec::new();
        let mut t = lower + step;
        while t < upper {
            if let Some(dt) = DateTime::from_timestamp(t, 0) {
                labels.push((dt + timezone_offset).format("%H:%M").to_string());
                positions.push(100.0 * (t - lower) as f64 / (upper - lower) as f64);
            }
            t += step;
        }

        Ok(Self {
            scale,
            step_secs: step,
            labels,
            positions,
        })
    }

    pub fn title(&self) -> &str {
        self.scale.title()
    }

    pub fn step_secs(&self) -> i64 {
        self.step_secs
    }

    pub fn grid_step(&self) -> Option<f64> {
        self.scale.grid_step()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }
}

impl Normalize for TimeScale {
    fn range(&self) -> (f64, f64) {
        self.scale.range()
    }

    fn normalize(&self, value: f64) -> f64 {
        self.scale.normalize(value)
    }

    fn denormalize(&self, fraction: f64) -> f64 {
        self.scale.denormalize(fraction)
    }
}

fn check_range(range: (f64, f64)) -> Result<()> {
    if range.0.is_finite() && range.1.is_finite() {
        Ok(())
    } else {
        Err(TrackError::InvalidParameter(format!(
            "scale range must be finite, got ({}, {})",
            range.0, range.1
        )))
    }
}

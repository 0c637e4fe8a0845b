//! Analysed flight track.
//!
//! A [`Track`] is built from raw fixes: the noise filter runs first, then the
//! parallel sample arrays (coordinates, unix-second timestamps, cumulative
//! path length, elevations) are derived once and [`Track::analyse`] fills the
//! windowed kinematics, the accepted regime segments and the per-track
//! bounds. All arrays are owned by the track.

use chrono::{DateTime, Duration, Timelike, Utc};
use geo::LineString;
use log::debug;
use serde::Serialize;

use crate::bounds::{self, Bounds, BoundsSet, Metric};
use crate::error::{ensure_positive, Result, TrackError};
use crate::filter::filter_fixes;
use crate::geodesy::Coordinate;
use crate::kinematics::{self, Kinematics};
use crate::resample::TimeIndex;
use crate::salient::salient_tiers;
use crate::segments::{segment_regimes, Regime, Segment, SegmentConfig, SegmentStats};
use crate::{AnalysisConfig, Fix, TrackMetadata};

/// Fewest filtered fixes a track can be analysed with.
pub const MIN_FIXES: usize = 2;

/// Spacing of time marks along the track, seconds.
pub const DEFAULT_TIME_MARK_STEP_SECS: i64 = 300;

/// Spacing of tour stops, seconds.
pub const DEFAULT_TOUR_STEP_SECS: i64 = 900;

/// Position of the track at a round wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeMark {
    pub time: DateTime<Utc>,
    pub coord: Coordinate,
    /// 0 on the hour and at both ends, 1 on the half hour, 2 on the
    /// quarters, 3 otherwise
    pub tier: usize,
}

/// One stop of a fly-through, looking towards the next stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TourStop {
    pub coord: Coordinate,
    /// Initial bearing to the next stop (the last stop looks back at the
    /// first), radians
    pub heading: f64,
}

/// Tier of a time mark from its minute.
pub fn time_mark_tier(time: DateTime<Utc>) -> usize {
    match time.minute() {
        0 => 0,
        30 => 1,
        15 | 45 => 2,
        _ => 3,
    }
}

/// Filtered fixes plus everything derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    metadata: TrackMetadata,
    coords: Vec<Coordinate>,
    /// Unix seconds, strictly increasing
    times: Vec<f64>,
    elevations: Vec<f64>,
    /// Cumulative path length, m
    s: Vec<f64>,
    /// Recorded true airspeed, present only when every fix carried one
    tas: Option<Vec<f64>>,
    kinematics: Kinematics,
    segments: Vec<Segment>,
    bounds: BoundsSet,
}

impl Track {
    /// Filter `fixes` and analyse the survivors with `config`.
    ///
    /// # Example
    /// ```
    /// use chrono::{DateTime, Duration};
    /// use track_analytics::{AnalysisConfig, Fix, Track, TrackMetadata};
    ///
    /// let t0 = DateTime::from_timestamp(1_200_000_000, 0).unwrap();
    /// let fixes: Vec<Fix> = (0..60)
    ///     .map(|i| Fix::new(46.0 + 0.0001 * i as f64, 7.0, 1500.0, t0 + Duration::seconds(i)))
    ///     .collect();
    /// let track = Track::new(&fixes, TrackMetadata::default(), &AnalysisConfig::default()).unwrap();
    /// assert_eq!(track.len(), 60);
    /// assert_eq!(track.kinematics().len(), 59);
    /// ```
    pub fn new(fixes: &[Fix], metadata: TrackMetadata, config: &AnalysisConfig) -> Result<Self> {
        if fixes.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        let filtered = filter_fixes(fixes, config);
        if filtered.len() < MIN_FIXES {
            return Err(TrackError::InsufficientFixes {
                count: filtered.len(),
                minimum: MIN_FIXES,
            });
        }

        let coords: Vec<Coordinate> = filtered.iter().map(Fix::coordinate).collect();
        let times: Vec<f64> = filtered.iter().map(|f| unix_seconds(f.time)).collect();
        if times[times.len() - 1] <= times[0] {
            return Err(TrackError::ZeroDuration);
        }
        let elevations: Vec<f64> = filtered.iter().map(|f| f.elevation).collect();

        let mut s = Vec::with_capacity(coords.len());
        let mut total = 0.0;
        s.push(total);
        for pair in coords.windows(2) {
            total += pair[0].distance_to(&pair[1]);
            s.push(total);
        }

        let tas: Option<Vec<f64>> = filtered.iter().map(|f| f.true_airspeed).collect();

        let mut track = Self {
            metadata,
            coords,
            times,
            elevations,
            s,
            tas,
            kinematics: Kinematics::default(),
            segments: Vec::new(),
            bounds: BoundsSet::new(),
        };
        track.analyse(config.window_secs, &config.segments)?;
        Ok(track)
    }

    /// Recompute kinematics, segments and bounds with a window of
    /// `window_secs` seconds.
    pub fn analyse(&mut self, window_secs: f64, config: &SegmentConfig) -> Result<()> {
        let window_secs = ensure_positive("window_secs", window_secs)?;

        self.kinematics = kinematics::estimate(&self.index(), window_secs);
        self.segments = segment_regimes(&self.times, &self.elevations, &self.kinematics, config);
        self.bounds = self.compute_bounds();

        debug!(
            "[Track] {} fixes over {:.0}s, window {:.1}s, {} segments",
            self.coords.len(),
            self.duration(),
            self.kinematics.window_secs,
            self.segments.len()
        );
        Ok(())
    }

    fn compute_bounds(&self) -> BoundsSet {
        let mut set = BoundsSet::new();
        let series: [(Metric, &[f64]); 5] = [
            (Metric::Elevation, &self.elevations),
            (Metric::Time, &self.times),
            (Metric::Speed, &self.kinematics.speed),
            (Metric::Climb, &self.kinematics.climb),
            (
                Metric::EnergyCompensatedClimb,
                &self.kinematics.energy_compensated_climb,
            ),
        ];
        for (metric, values) in series {
            if let Some(b) = Bounds::from_values(values.iter().copied()) {
                set.insert(metric, b);
            }
        }
        if let Some(b) = self
            .tas
            .as_ref()
            .and_then(|tas| Bounds::from_values(tas.iter().copied()))
        {
            set.insert(Metric::AirSpeed, b);
        }
        set
    }

    /// Resampling view over the sample arrays.
    pub fn index(&self) -> TimeIndex<'_> {
        TimeIndex::new(&self.times, &self.coords, &self.s)
    }

    /// Coordinate at `t` unix seconds, interpolated between samples.
    pub fn coord_at(&self, t: f64) -> Coordinate {
        self.index().coord_at(t)
    }

    pub fn coord_at_time(&self, time: DateTime<Utc>) -> Coordinate {
        self.coord_at(unix_seconds(time))
    }

    /// Cumulative path length at `t` unix seconds.
    pub fn s_at(&self, t: f64) -> f64 {
        self.index().s_at(t)
    }

    /// Number of filtered samples.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn metadata(&self) -> &TrackMetadata {
        &self.metadata
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn cumulative_distance(&self) -> &[f64] {
        &self.s
    }

    /// Total path length, m.
    pub fn distance(&self) -> f64 {
        self.s[self.s.len() - 1]
    }

    /// Seconds between the first and last sample.
    pub fn duration(&self) -> f64 {
        self.times[self.times.len() - 1] - self.times[0]
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.coords[0].time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.coords[self.coords.len() - 1].time
    }

    pub fn true_airspeed(&self) -> Option<&[f64]> {
        self.tas.as_deref()
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Accepted segments in track order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn segments_of(&self, regime: Regime) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.regime == regime)
    }

    pub fn thermals(&self) -> impl Iterator<Item = &Segment> {
        self.segments_of(Regime::Thermal)
    }

    pub fn glides(&self) -> impl Iterator<Item = &Segment> {
        self.segments_of(Regime::Glide)
    }

    pub fn dives(&self) -> impl Iterator<Item = &Segment> {
        self.segments_of(Regime::Dive)
    }

    /// Summary statistics for every accepted segment.
    pub fn segment_stats(&self) -> Vec<SegmentStats> {
        self.segments
            .iter()
            .map(|segment| SegmentStats::compute(self, segment))
            .collect()
    }

    pub fn bounds(&self) -> &BoundsSet {
        &self.bounds
    }

    /// False when every elevation is exactly zero (no altitude recorded).
    pub fn has_elevation_data(&self) -> bool {
        self.bounds
            .get(Metric::Elevation)
            .is_some_and(|b| b.min != 0.0 || b.max != 0.0)
    }

    /// Mean elevation of each interval, one value per interval.
    pub fn interval_elevation(&self) -> Vec<f64> {
        self.elevations
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect()
    }

    pub fn total_positive_elevation_gain(&self) -> f64 {
        bounds::total_positive_elevation_gain(&self.elevations)
    }

    pub fn max_elevation_gain(&self) -> f64 {
        bounds::max_elevation_gain(&self.elevations)
    }

    /// Salient elevation marks as `(index, tier)` pairs, tiers counted from
    /// the coarsest of `epsilons`.
    pub fn altitude_marks(&self, epsilons: &[f64]) -> Result<Vec<(usize, usize)>> {
        salient_tiers(&self.elevations, epsilons)
    }

    /// Time marks every `step` (whole seconds), aligned to wall-clock
    /// multiples of the step.
    ///
    /// The first and last fix are always marked with tier 0. In between, a
    /// mark is placed at every step boundary strictly after the first fix
    /// and strictly before the last one.
    pub fn time_marks(&self, step: Duration) -> Result<Vec<TimeMark>> {
        let step_secs = ensure_positive("time mark step", step.num_seconds() as f64)? as i64;
        let last = self.len() - 1;
        let start = self.times[0];
        let end = self.times[last];

        let mut marks = vec![TimeMark {
            time: self.time_of(0)?,
            coord: self.coords[0],
            tier: 0,
        }];
        let first = start.floor() as i64;
        let mut t = first - first.rem_euclid(step_secs);
        while t as f64 <= start {
            t += step_secs;
        }
        while (t as f64) < end {
            let time = from_unix_seconds(t as f64)?;
            marks.push(TimeMark {
                time,
                coord: self.coord_at(t as f64),
                tier: time_mark_tier(time),
            });
            t += step_secs;
        }
        marks.push(TimeMark {
            time: self.time_of(last)?,
            coord: self.coords[last],
            tier: 0,
        });
        Ok(marks)
    }

    /// Positions every `step` from takeoff, each heading for the next.
    pub fn tour(&self, step: Duration) -> Result<Vec<TourStop>> {
        let step_secs = ensure_positive("tour step", step.num_milliseconds() as f64 / 1000.0)?;
        let start = self.times[0];
        let end = self.times[self.len() - 1];

        let mut coords = Vec::new();
        let mut t = start;
        while t < end {
            coords.push(self.coord_at(t));
            t = start + step_secs * coords.len() as f64;
        }
        let n = coords.len();
        Ok((0..n)
            .map(|i| TourStop {
                coord: coords[i],
                heading: coords[i].initial_bearing_to(&coords[(i + 1) % n]),
            })
            .collect())
    }

    fn time_of(&self, i: usize) -> Result<DateTime<Utc>> {
        self.coords[i]
            .time
            .map_or_else(|| from_unix_seconds(self.times[i]), Ok)
    }

    /// Track as a `geo` line string (x = longitude, y = latitude, degrees).
    pub fn to_line_string(&self) -> LineString<f64> {
        self.coords
            .iter()
            .map(|c| geo::Coord::from(*c))
            .collect::<Vec<_>>()
            .into()
    }
}

/// Timestamp as fractional unix seconds.
pub(crate) fn unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1e6
}

/// Whole unix seconds as a timestamp, sub-second part dropped.
pub(crate) fn from_unix_seconds(secs: f64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs as i64, 0).ok_or_else(|| {
        TrackError::InvalidParameter(format!("timestamp {} out of range", secs))
    })
}

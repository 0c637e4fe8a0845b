//! Multi-track orchestration.
//!
//! Tracks rendered together share one set of scales, so analysis runs in two
//! phases: every track is analysed independently (in parallel with the
//! `parallel` feature), then all per-track bounds are merged and the scales
//! are built from the merged result. [`FlightGroup`] performs both phases so
//! scales are never built from partially merged bounds.

use chrono::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::bounds::{BoundsSet, Metric};
use crate::error::{OptionExt, Result, TrackError};
use crate::scale::{Scale, TimeScale, ZeroCenteredScale};
use crate::simplify::{chart_indexes, ChartConfig};
use crate::track::{from_unix_seconds, Track};
use crate::{AnalysisConfig, Fix, TrackMetadata};

/// Raw input for one track of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInput {
    pub fixes: Vec<Fix>,
    pub metadata: TrackMetadata,
}

impl TrackInput {
    pub fn new(fixes: Vec<Fix>, metadata: TrackMetadata) -> Self {
        Self { fixes, metadata }
    }
}

/// Configuration for the shared scales of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    /// Climb bounds are limited to `[-climb_limit, climb_limit]` m/s.
    /// Default: 5.0
    pub climb_limit: f64,
    /// Base step of the climb scale, m/s.
    /// Default: 0.1
    pub climb_step: f64,
    /// Most grid divisions on any scale.
    /// Default: 16
    pub max_divisions: usize,
    /// Offset applied to time-axis labels, seconds east of UTC.
    /// Default: 0
    pub timezone_offset_secs: i64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            climb_limit: 5.0,
            climb_step: 0.1,
            max_divisions: 16,
            timezone_offset_secs: 0,
        }
    }
}

/// Scales derived from fully merged bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSet {
    pub altitude: Scale,
    pub climb: ZeroCenteredScale,
    pub speed: Scale,
    /// Wall-clock axis with labels
    pub time: TimeScale,
    /// Linear unix-seconds axis
    pub t: Scale,
    /// Present when every track recorded true airspeed
    pub air_speed: Option<Scale>,
}

impl ScaleSet {
    /// Build every scale from `bounds`, which must already hold every track
    /// that will be drawn with them.
    pub fn from_bounds(bounds: &BoundsSet, config: &ScaleConfig) -> Result<Self> {
        let max_div = config.max_divisions;
        let required = |metric: Metric| bounds.get(metric).copied().ok_or_missing(metric);

        let elevation = required(Metric::Elevation)?;
        let climb = required(Metric::Climb)?.limited(config.climb_limit);
        let speed = required(Metric::Speed)?;
        let time = required(Metric::Time)?;

        let start = from_unix_seconds(time.min.floor())?;
        let end = from_unix_seconds(time.max.ceil())?;

        Ok(Self {
            altitude: Scale::new("altitude", elevation.as_tuple(), 1.0, max_div)?,
            climb: ZeroCenteredScale::new("climb", climb.as_tuple(), config.climb_step, max_div)?,
            speed: Scale::new("ground speed", speed.as_tuple(), 1.0, max_div)?,
            time: TimeScale::new(
                "time",
                (start, end),
                1,
                max_div,
                Duration::seconds(config.timezone_offset_secs),
            )?,
            t: Scale::new("time", time.as_tuple(), 1.0, max_div)?,
            air_speed: bounds
                .get(Metric::AirSpeed)
                .map(|b| Scale::new("air speed", b.as_tuple(), 1.0, max_div))
                .transpose()?,
        })
    }
}

/// Analyse every input, preserving input order.
///
/// Tracks are independent until their bounds are merged, so with the
/// `parallel` feature they are analysed concurrently.
pub fn analyse_tracks(inputs: &[TrackInput], config: &AnalysisConfig) -> Vec<Result<Track>> {
    #[cfg(feature = "parallel")]
    let results: Vec<Result<Track>> = {
        use rayon::prelude::*;
        inputs
            .par_iter()
            .map(|input| Track::new(&input.fixes, input.metadata.clone(), config))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<Track>> = inputs
        .iter()
        .map(|input| Track::new(&input.fixes, input.metadata.clone(), config))
        .collect();

    results
}

/// Key-wise merge of every track's bounds.
pub fn merge_bounds(tracks: &[Track]) -> BoundsSet {
    tracks.iter().fold(BoundsSet::new(), |mut acc, track| {
        acc.merge(track.bounds());
        acc
    })
}

/// Tracks drawn together, with their merged bounds and shared scales.
#[derive(Debug, Clone, Serialize)]
pub struct FlightGroup {
    tracks: Vec<Track>,
    bounds: BoundsSet,
    scales: ScaleSet,
}

impl FlightGroup {
    /// Analyse `inputs`, skipping degenerate tracks, then merge bounds and
    /// build the shared scales.
    pub fn new(
        inputs: &[TrackInput],
        analysis: &AnalysisConfig,
        scale_config: &ScaleConfig,
    ) -> Result<Self> {
        let mut tracks = Vec::with_capacity(inputs.len());
        for (i, result) in analyse_tracks(inputs, analysis).into_iter().enumerate() {
            match result {
                Ok(track) => tracks.push(track),
                Err(e) => warn!("[FlightGroup] Skipping track {}: {}", i, e),
            }
        }
        if tracks.is_empty() {
            return Err(TrackError::EmptyTrack);
        }

        let mut bounds = merge_bounds(&tracks);
        if let Some(climb) = bounds.get(Metric::Climb).copied() {
            bounds.insert(Metric::Climb, climb.limited(scale_config.climb_limit));
        }
        let scales = ScaleSet::from_bounds(&bounds, scale_config)?;

        info!(
            "[FlightGroup] {} of {} tracks analysed, {} segments",
            tracks.len(),
            inputs.len(),
            tracks.iter().map(|t| t.segments().len()).sum::<usize>()
        );

        Ok(Self {
            tracks,
            bounds,
            scales,
        })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Merged bounds, climb limited to the configured range.
    pub fn bounds(&self) -> &BoundsSet {
        &self.bounds
    }

    pub fn scales(&self) -> &ScaleSet {
        &self.scales
    }

    /// Indexes of `track`'s altitude profile worth plotting.
    pub fn altitude_chart(&self, track: &Track, config: &ChartConfig) -> Vec<usize> {
        chart_indexes(
            track.times(),
            track.elevations(),
            &self.scales.time,
            &self.scales.altitude,
            config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;
    use crate::geodesy::Coordinate;
    use crate::scale::Normalize;
    use chrono::DateTime;

    fn input(lat: f64, base_ele: f64, climb: f64, n: usize) -> TrackInput {
        let t0 = DateTime::from_timestamp(1_214_900_000, 0).unwrap();
        let start = Coordinate::from_degrees(lat, 7.0, base_ele);
        let fixes = (0..n)
            .map(|i| {
                let c = start.destination(1.0, 10.0 * i as f64);
                Fix::new(
                    c.lat_deg(),
                    c.lon_deg(),
                    base_ele + climb * i as f64,
                    t0 + Duration::seconds(i as i64),
                )
            })
            .collect();
        TrackInput::new(fixes, TrackMetadata::default())
    }

    #[test]
    fn test_analyse_tracks_preserves_order() {
        let inputs = vec![
            input(46.0, 1000.0, 1.0, 50),
            TrackInput::default(),
            input(45.0, 2000.0, -1.0, 80),
        ];
        let results = analyse_tracks(&inputs, &AnalysisConfig::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().len(), 50);
        assert_eq!(results[1].as_ref().unwrap_err(), &TrackError::EmptyTrack);
        assert_eq!(results[2].as_ref().unwrap().len(), 80);
    }

    #[test]
    fn test_group_merges_bounds_across_tracks() {
        let inputs = vec![
            input(46.0, 1000.0, 1.0, 50),
            TrackInput::default(),
            input(45.0, 2000.0, -1.0, 80),
        ];
        let group =
            FlightGroup::new(&inputs, &AnalysisConfig::default(), &ScaleConfig::default()).unwrap();
        assert_eq!(group.tracks().len(), 2);

        let ele = group.bounds().get(Metric::Elevation).unwrap();
        assert_eq!(ele.as_tuple(), (1000.0, 2000.0));
        let (low, high) = group.scales().altitude.range();
        assert!(low <= 1000.0 && high >= 2000.0);
        assert!(group.scales().air_speed.is_none());
    }

    #[test]
    fn test_group_without_tracks_fails() {
        let inputs = vec![TrackInput::default()];
        assert!(FlightGroup::new(&inputs, &AnalysisConfig::default(), &ScaleConfig::default()).is_err());
    }

    #[test]
    fn test_scale_set_limits_climb() {
        let mut bounds = BoundsSet::new();
        bounds.insert(Metric::Elevation, Bounds::from_range(800.0, 2400.0));
        bounds.insert(Metric::Climb, Bounds::from_range(-12.0, 3.3));
        bounds.insert(Metric::Speed, Bounds::from_range(0.0, 70.0));
        bounds.insert(Metric::Time, Bounds::from_range(1_214_900_000.0, 1_214_911_500.0));
        let scales = ScaleSet::from_bounds(&bounds, &ScaleConfig::default()).unwrap();
        let (low, high) = scales.climb.range();
        assert!(low >= -5.0 - 1e-9);
        assert!(high >= 3.3 && high <= 5.0);
        assert_eq!(scales.climb.normalize(0.0), 0.5);
        assert_eq!(scales.time.step_secs(), 900);
    }

    #[test]
    fn test_scale_set_requires_metrics() {
        let mut bounds = BoundsSet::new();
        bounds.insert(Metric::Elevation, Bounds::from_range(800.0, 2400.0));
        assert_eq!(
            ScaleSet::from_bounds(&bounds, &ScaleConfig::default()).unwrap_err(),
            TrackError::MissingMetric(Metric::Climb)
        );
    }

    #[test]
    fn test_altitude_chart_within_budget() {
        let inputs = vec![input(46.0, 1000.0, 1.5, 600)];
        let group =
            FlightGroup::new(&inputs, &AnalysisConfig::default(), &ScaleConfig::default()).unwrap();
        let track = &group.tracks()[0];
        let kept = group.altitude_chart(track, &ChartConfig::default());
        assert!(kept.len() >= 2);
        assert!(kept.len() <= 450);
        assert_eq!(kept[0], 0);
        assert_eq!(*kept.last().unwrap(), 599);
    }
}

//! Running min/max tracking over scalar series.
//!
//! [`Bounds`] only ever widens, so merging is idempotent, commutative and
//! associative: tracks can be folded into one [`BoundsSet`] in any order.
//! Scales must be built only after every track sharing a visualization has
//! been merged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` over a scalar series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Degenerate bounds around a single value.
    pub fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn from_range(min: f64, max: f64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Bounds of every value in `values`, `None` when empty.
    ///
    /// # Example
    /// ```
    /// use track_analytics::Bounds;
    /// let b = Bounds::from_values([3.0, -1.0, 7.5]).unwrap();
    /// assert_eq!((b.min, b.max), (-1.0, 7.5));
    /// ```
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut iter = values.into_iter();
        let mut bounds = Bounds::new(iter.next()?);
        for value in iter {
            bounds.merge_value(value);
        }
        Some(bounds)
    }

    /// Widen to include `value`.
    pub fn merge_value(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Widen to include `other`.
    pub fn merge(&mut self, other: &Bounds) {
        self.merge_value(other.min);
        self.merge_value(other.max);
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Copy limited to `[-limit, limit]`; used to keep a few violent spikes
    /// from flattening a climb color scale.
    pub fn limited(&self, limit: f64) -> Bounds {
        Bounds {
            min: self.min.max(-limit),
            max: self.max.min(limit),
        }
    }
}

/// Series a [`BoundsSet`] can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Fix elevation, m
    Elevation,
    /// Fix time, unix seconds
    Time,
    /// Windowed ground speed, km/h
    Speed,
    /// Windowed climb rate, m/s
    Climb,
    /// Energy-compensated climb rate
    EnergyCompensatedClimb,
    /// Recorded true airspeed, km/h
    AirSpeed,
}

/// One [`Bounds`] per metric, merged key-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundsSet {
    bounds: BTreeMap<Metric, Bounds>,
}

impl BoundsSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: Metric) -> Option<&Bounds> {
        self.bounds.get(&metric)
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.bounds.contains_key(&metric)
    }

    /// Replace the bounds for `metric`.
    pub fn insert(&mut self, metric: Metric, bounds: Bounds) {
        self.bounds.insert(metric, bounds);
    }

    /// Widen `metric` by `bounds`, adopting them if the key is new.
    pub fn merge_bounds(&mut self, metric: Metric, bounds: &Bounds) {
        self.bounds
            .entry(metric)
            .and_modify(|b| b.merge(bounds))
            .or_insert(*bounds);
    }

    /// Key-wise merge of `other` into `self`.
    pub fn merge(&mut self, other: &BoundsSet) {
        for (metric, bounds) in &other.bounds {
            self.merge_bounds(*metric, bounds);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &Bounds)> {
        self.bounds.iter().map(|(m, b)| (*m, b))
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

/// Sum of every positive elevation step.
pub fn total_positive_elevation_gain(elevations: &[f64]) -> f64 {
    elevations
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|dz| *dz > 0.0)
        .sum()
}

/// Largest gain reached above any earlier low point, in one forward scan.
pub fn max_elevation_gain(elevations: &[f64]) -> f64 {
    let Some(&first) = elevations.first() else {
        return 0.0;
    };
    let mut min_ele = first;
    let mut best = 0.0_f64;
    for &ele in &elevations[1..] {
        if ele < min_ele {
            min_ele = ele;
        } else if ele - min_ele > best {
            best = ele - min_ele;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_widens_only() {
        let mut b = Bounds::new(5.0);
        b.merge_value(3.0);
        b.merge_value(9.0);
        b.merge_value(6.0);
        assert_eq!(b.as_tuple(), (3.0, 9.0));
        b.merge(&Bounds::from_range(4.0, 8.0));
        assert_eq!(b.as_tuple(), (3.0, 9.0));
    }

    #[test]
    fn test_merge_idempotent() {
        let mut once = Bounds::new(1.0);
        once.merge_value(4.0);
        let mut twice = once;
        twice.merge_value(4.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_order_independent() {
        let parts = [
            Bounds::from_range(2.0, 3.0),
            Bounds::from_range(-1.0, 0.5),
            Bounds::from_range(10.0, 11.0),
            Bounds::new(4.0),
        ];
        let fold = |order: &[usize]| {
            let mut acc = parts[order[0]];
            for &i in &order[1..] {
                acc.merge(&parts[i]);
            }
            acc
        };
        let expected = fold(&[0, 1, 2, 3]);
        for order in [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]] {
            assert_eq!(fold(&order), expected);
        }
        assert_eq!(expected.as_tuple(), (-1.0, 11.0));
    }

    #[test]
    fn test_from_values() {
        assert!(Bounds::from_values(Vec::<f64>::new()).is_none());
        let b = Bounds::from_values([2.0, 8.0, -3.0]).unwrap();
        assert_eq!(b.as_tuple(), (-3.0, 8.0));
        assert_eq!(b.span(), 11.0);
    }

    #[test]
    fn test_limited() {
        let b = Bounds::from_range(-7.2, 3.1).limited(5.0);
        assert_eq!(b.as_tuple(), (-5.0, 3.1));
    }

    #[test]
    fn test_bounds_set_merge_adopts_new_keys() {
        let mut acc = BoundsSet::new();
        acc.insert(Metric::Elevation, Bounds::from_range(500.0, 1500.0));

        let mut other = BoundsSet::new();
        other.insert(Metric::Elevation, Bounds::from_range(300.0, 1200.0));
        other.insert(Metric::Climb, Bounds::from_range(-3.0, 4.0));

        acc.merge(&other);
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.get(Metric::Elevation).unwrap().as_tuple(), (300.0, 1500.0));
        assert_eq!(acc.get(Metric::Climb).unwrap().as_tuple(), (-3.0, 4.0));
        assert!(acc.get(Metric::Speed).is_none());
    }

    #[test]
    fn test_bounds_set_serializes_by_metric_name() {
        let mut set = BoundsSet::new();
        set.insert(Metric::AirSpeed, Bounds::from_range(30.0, 60.0));
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"air_speed":{"min":30.0,"max":60.0}}"#);
    }

    #[test]
    fn test_elevation_gains() {
        let ele = [1000.0, 1100.0, 1050.0, 1200.0, 900.0, 1150.0, 1100.0];
        // +100 +150 +250
        assert_eq!(total_positive_elevation_gain(&ele), 500.0);
        // low of 900 then 1150
        assert_eq!(max_elevation_gain(&ele), 250.0);
        assert_eq!(max_elevation_gain(&[]), 0.0);
        assert_eq!(max_elevation_gain(&[5.0, 4.0, 3.0]), 0.0);
    }
}

//! Douglas-Peucker polyline simplification.
//!
//! Both forms operate on parallel `x`/`y` slices and return sorted sample
//! indexes that always include the first and last point. Deviation is the
//! perpendicular distance from the chord between two anchors.
//!
//! - [`douglas_peucker`]: batch form, explores splits depth-first with a stack
//! - [`incremental_douglas_peucker`]: explores splits breadth-first with a
//!   FIFO queue and stops once a point budget is spent, so the coarsest
//!   features are kept first

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::scale::Normalize;

/// Chart geometry and simplification budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Plot width in pixels
    pub width: f64,
    /// Plot height in pixels
    pub height: f64,
    /// Allowed deviation in pixels
    pub epsilon: f64,
    /// Hard ceiling on plotted points
    pub max_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 300.0,
            epsilon: 1.0,
            max_points: 450,
        }
    }
}

/// Furthest interior point from the chord `left -> right` and its distance.
/// Returns `None` when there is no interior point.
fn furthest_point(x: &[f64], y: &[f64], left: usize, right: usize) -> Option<(usize, f64)> {
    if right - left < 2 {
        return None;
    }
    let kx = y[left] - y[right];
    let ky = x[right] - x[left];
    let c = x[left] * y[right] - x[right] * y[left];
    let chord = kx.hypot(ky);

    let mut pivot = left + 1;
    let mut max_dist = f64::NEG_INFINITY;
    for i in left + 1..right {
        let dist = if chord > 0.0 {
            (kx * x[i] + ky * y[i] + c).abs()
        } else {
            // Anchors coincide: fall back to distance from the anchor
            (x[i] - x[left]).hypot(y[i] - y[left])
        };
        if dist > max_dist {
            max_dist = dist;
            pivot = i;
        }
    }
    if chord > 0.0 {
        max_dist /= chord;
    }
    Some((pivot, max_dist))
}

/// Batch Douglas-Peucker: indexes of the points to keep.
///
/// # Example
/// ```
/// use track_analytics::simplify::douglas_peucker;
/// let x = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let y = [0.0, 0.1, 5.0, 0.1, 0.0];
/// assert_eq!(douglas_peucker(&x, &y, 1.0), vec![0, 2, 4]);
/// ```
pub fn douglas_peucker(x: &[f64], y: &[f64], epsilon: f64) -> Vec<usize> {
    let n = x.len().min(y.len());
    if n == 0 {
        return Vec::new();
    }
    let mut indexes = BTreeSet::from([0, n - 1]);
    let mut stack = vec![(0, n - 1)];
    while let Some((left, right)) = stack.pop() {
        if let Some((pivot, dist)) = furthest_point(x, y, left, right) {
            if dist > epsilon {
                indexes.insert(pivot);
                stack.push((left, pivot));
                stack.push((pivot, right));
            }
        }
    }
    indexes.into_iter().collect()
}

/// Budgeted Douglas-Peucker: splits are taken in breadth-first order and the
/// search stops as soon as `max_points` indexes have been kept.
///
/// The first and last index are always kept, so a budget below 2 acts as 2.
pub fn incremental_douglas_peucker(
    x: &[f64],
    y: &[f64],
    epsilon: f64,
    max_points: Option<usize>,
) -> Vec<usize> {
    let n = x.len().min(y.len());
    if n == 0 {
        return Vec::new();
    }
    let limit = max_points.unwrap_or(usize::MAX).max(2);
    let mut indexes = BTreeSet::from([0, n - 1]);
    let mut queue = VecDeque::from([(0, n - 1)]);
    while let Some((left, right)) = queue.pop_front() {
        if indexes.len() >= limit {
            break;
        }
        if let Some((pivot, dist)) = furthest_point(x, y, left, right) {
            if dist > epsilon {
                indexes.insert(pivot);
                queue.push_back((left, pivot));
                queue.push_back((pivot, right));
            }
        }
    }
    indexes.into_iter().collect()
}

/// Indexes of `values` worth plotting on a chart.
///
/// The series is projected to pixels (x from `time_scale` over the plot
/// width, y from `value_scale` over the plot height) and simplified with the
/// budgeted Douglas-Peucker.
pub fn chart_indexes<T: Normalize, V: Normalize>(
    times: &[f64],
    values: &[f64],
    time_scale: &T,
    value_scale: &V,
    config: &ChartConfig,
) -> Vec<usize> {
    let x: Vec<f64> = times
        .iter()
        .map(|t| config.width * time_scale.normalize(*t))
        .collect();
    let y: Vec<f64> = values
        .iter()
        .map(|v| config.height * value_scale.normalize(*v))
        .collect();
    incremental_douglas_peucker(&x, &y, config.epsilon, Some(config.max_points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Scale;

    fn zigzag(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| (i as f64 * 0.7).sin() * 10.0 + (i % 3) as f64)
            .collect();
        (x, y)
    }

    #[test]
    fn test_straight_line_keeps_endpoints() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(douglas_peucker(&x, &y, 0.1), vec![0, 3]);
        assert_eq!(incremental_douglas_peucker(&x, &y, 0.1, None), vec![0, 3]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(douglas_peucker(&[], &[], 1.0).is_empty());
        assert_eq!(douglas_peucker(&[1.0], &[1.0], 1.0), vec![0]);
        assert_eq!(douglas_peucker(&[0.0, 1.0], &[0.0, 1.0], 1.0), vec![0, 1]);
    }

    #[test]
    fn test_closed_loop_uses_anchor_distance() {
        // First and last point coincide
        let x = [0.0, 5.0, 10.0, 5.0, 0.0];
        let y = [0.0, 5.0, 0.0, -5.0, 0.0];
        let kept = douglas_peucker(&x, &y, 1.0);
        assert!(kept.contains(&2));
        assert_eq!(kept.first(), Some(&0));
        assert_eq!(kept.last(), Some(&4));
    }

    #[test]
    fn test_endpoints_always_kept() {
        let (x, y) = zigzag(200);
        for eps in [0.0, 0.5, 2.0, 100.0] {
            let kept = douglas_peucker(&x, &y, eps);
            assert_eq!(kept[0], 0);
            assert_eq!(*kept.last().unwrap(), 199);
            assert!(kept.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_larger_epsilon_never_keeps_more() {
        let (x, y) = zigzag(300);
        let mut previous = usize::MAX;
        for eps in [0.0, 0.1, 0.5, 1.0, 2.0, 5.0, 20.0] {
            let count = douglas_peucker(&x, &y, eps).len();
            assert!(count <= previous, "eps {} kept {} > {}", eps, count, previous);
            previous = count;
        }
    }

    #[test]
    fn test_incremental_matches_batch_without_budget() {
        let (x, y) = zigzag(150);
        assert_eq!(
            incremental_douglas_peucker(&x, &y, 1.0, None),
            douglas_peucker(&x, &y, 1.0)
        );
    }

    #[test]
    fn test_budget_is_a_hard_ceiling() {
        let (x, y) = zigzag(500);
        let kept = incremental_douglas_peucker(&x, &y, 0.0, Some(40));
        assert_eq!(kept.len(), 40);
        assert_eq!(kept[0], 0);
        assert_eq!(*kept.last().unwrap(), 499);
    }

    #[test]
    fn test_budget_below_two_keeps_endpoints() {
        let (x, y) = zigzag(50);
        for budget in [0, 1, 2] {
            assert_eq!(
                incremental_douglas_peucker(&x, &y, 0.0, Some(budget)),
                vec![0, 49]
            );
        }
        assert_eq!(incremental_douglas_peucker(&x[..1], &y[..1], 0.0, Some(1)), vec![0]);
    }

    #[test]
    fn test_chart_indexes() {
        let times: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let values: Vec<f64> = times.iter().map(|t| 1000.0 + (t / 50.0).sin() * 200.0).collect();
        let ts = Scale::new("t", (0.0, 999.0), 1.0, 16).unwrap();
        let vs = Scale::new("altitude", (800.0, 1200.0), 1.0, 16).unwrap();
        let config = ChartConfig::default();
        let kept = chart_indexes(&times, &values, &ts, &vs, &config);
        assert!(kept.len() <= config.max_points);
        assert!(kept.len() > 2);
        assert_eq!(kept[0], 0);
        assert_eq!(*kept.last().unwrap(), 999);
    }
}

//! Salient points of a 1-D series.
//!
//! Between two anchors the series has a net trend. The salient pair is the
//! largest excursion against that trend: the biggest drop after a running
//! maximum on a rising stretch, or the biggest rise after a running minimum
//! on a falling one (flat stretches try both). When the excursion is at
//! least `epsilon`, both ends of it are kept and the three sub-ranges they
//! delimit are searched in turn. The traversal uses an explicit worklist.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, TrackError};

/// Largest counter-trend excursion inside `[start, stop]`, as
/// `(left, right, magnitude)`. `left == start && right == stop` means none.
fn excursion(seq: &[f64], start: usize, stop: usize) -> (usize, usize, f64) {
    let mut delta = 0.0;
    let (mut left, mut right) = (start, stop);
    if seq[start] <= seq[stop] {
        let mut max_index = start;
        for i in start + 1..=stop {
            if seq[i] > seq[max_index] {
                max_index = i;
            } else if seq[max_index] - seq[i] > delta {
                left = max_index;
                right = i;
                delta = seq[max_index] - seq[i];
            }
        }
    }
    if seq[start] >= seq[stop] {
        let mut min_index = start;
        for i in start + 1..=stop {
            if seq[i] < seq[min_index] {
                min_index = i;
            } else if seq[i] - seq[min_index] > delta {
                left = min_index;
                right = i;
                delta = seq[i] - seq[min_index];
            }
        }
    }
    (left, right, delta)
}

/// Walk every range whose excursion is at least `threshold`, handing each
/// kept pair and its magnitude to `keep`.
fn visit<F: FnMut(usize, usize, f64)>(seq: &[f64], threshold: f64, mut keep: F) {
    if seq.len() < 2 {
        return;
    }
    let mut work = vec![(0, seq.len() - 1)];
    while let Some((start, stop)) = work.pop() {
        if stop - start < 2 {
            continue;
        }
        let (left, right, delta) = excursion(seq, start, stop);
        if delta >= threshold && (left != start || right != stop) {
            keep(left, right, delta);
            work.push((right, stop));
            work.push((left, right));
            work.push((start, left));
        }
    }
}

/// Sorted indexes of the salient points of `seq`; always includes the first
/// and last index.
///
/// # Example
/// ```
/// use track_analytics::salient::salient;
/// let seq = [0.0, 2.0, 4.0, 6.0, 8.0, 7.0, 6.0, 7.0, 9.0, 7.0];
/// assert_eq!(salient(&seq, 0.0), vec![0, 4, 6, 8, 9]);
/// ```
pub fn salient(seq: &[f64], epsilon: f64) -> Vec<usize> {
    if seq.is_empty() {
        return Vec::new();
    }
    let mut result = BTreeSet::from([0, seq.len() - 1]);
    visit(seq, epsilon, |left, right, _| {
        result.insert(left);
        result.insert(right);
    });
    result.into_iter().collect()
}

/// Salient points for several thresholds in one pass.
///
/// `epsilons` is ordered from coarsest to finest (e.g. `[100.0, 50.0,
/// 10.0]`). Each kept index is tagged with the position of the coarsest
/// threshold its excursion satisfies; the end points are tier 0. Returns
/// `(index, tier)` pairs sorted by index.
pub fn salient_tiers(seq: &[f64], epsilons: &[f64]) -> Result<Vec<(usize, usize)>> {
    let Some(&finest) = epsilons.last() else {
        return Err(TrackError::InvalidParameter(
            "salient_tiers needs at least one epsilon".to_string(),
        ));
    };
    if seq.is_empty() {
        return Ok(Vec::new());
    }

    let mut result = BTreeMap::from([(0, 0), (seq.len() - 1, 0)]);
    visit(seq, finest, |left, right, delta| {
        if let Some(tier) = epsilons.iter().position(|eps| delta >= *eps) {
            for index in [left, right] {
                let entry = result.entry(index).or_insert(tier);
                *entry = (*entry).min(tier);
            }
        }
    });
    Ok(result.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(seq: &[f64]) -> Vec<usize> {
        salient(seq, 0.0)
    }

    #[test]
    fn test_short_series() {
        assert_eq!(s(&[]), Vec::<usize>::new());
        assert_eq!(s(&[0.0]), vec![0]);
        assert_eq!(s(&[0.0, 1.0]), vec![0, 1]);
        assert_eq!(s(&[1.0, 0.0]), vec![0, 1]);
        assert_eq!(s(&[0.0, 0.0]), vec![0, 1]);
    }

    #[test]
    fn test_monotonic_series_keep_only_ends() {
        assert_eq!(s(&[0.0, 1.0, 2.0]), vec![0, 2]);
        assert_eq!(s(&[2.0, 1.0, 0.0]), vec![0, 2]);
        assert_eq!(s(&[0.0, 0.0, 0.0]), vec![0, 2]);
        assert_eq!(s(&[0.0, 1.0, 2.0, 3.0]), vec![0, 3]);
        assert_eq!(s(&[3.0, 2.0, 1.0, 0.0]), vec![0, 3]);
        assert_eq!(s(&[0.0, 0.0, 0.0, 0.0]), vec![0, 3]);
        assert_eq!(s(&[0.0, 1.0, 2.0, 3.0, 3.0, 5.0, 6.0, 7.0]), vec![0, 7]);
    }

    #[test]
    fn test_peaks_and_valleys() {
        assert_eq!(s(&[0.0, 1.0, 0.0]), vec![0, 1, 2]);
        assert_eq!(s(&[1.0, 0.0, 1.0]), vec![0, 1, 2]);
        assert_eq!(s(&[0.0, 1.0, 1.0, 0.0]), vec![0, 1, 3]);
        assert_eq!(s(&[1.0, 0.0, 0.0, 1.0]), vec![0, 1, 3]);
    }

    #[test]
    fn test_epsilon_suppresses_small_excursions() {
        assert_eq!(salient(&[0.0, 1.0, 0.0], 2.0), vec![0, 2]);
        assert_eq!(salient(&[1.0, 0.0, 1.0], 2.0), vec![0, 2]);
    }

    #[test]
    fn test_complex() {
        let a = [0.0, 2.0, 4.0, 6.0, 8.0, 7.0, 6.0, 7.0, 9.0, 7.0];
        assert_eq!(s(&a), vec![0, 4, 6, 8, 9]);
        let b = [0.0, 2.0, 4.0, 6.0, 8.0, 7.0, 6.0, 7.0, 8.0, 7.0];
        assert_eq!(salient(&b, 2.0), vec![0, 4, 6, 9]);
        assert_eq!(salient(&b, 3.0), vec![0, 9]);
    }

    #[test]
    fn test_tiers() {
        let epsilons = [100.0, 50.0, 10.0];
        // 200 m drop from the summit, then a 20 m bump on the way down
        let seq = [0.0, 150.0, 300.0, 240.0, 260.0, 100.0];
        let tiers = salient_tiers(&seq, &epsilons).unwrap();
        assert_eq!(tiers, vec![(0, 0), (2, 0), (3, 2), (4, 2), (5, 0)]);

        // 70 m dip then a 20 m dip on a rising series
        let seq = [0.0, 300.0, 230.0, 400.0, 380.0, 500.0];
        let tiers = salient_tiers(&seq, &epsilons).unwrap();
        assert_eq!(tiers, vec![(0, 0), (1, 1), (2, 1), (3, 2), (4, 2), (5, 0)]);
        // The finest tier alone reproduces the plain salient points
        let indexes: Vec<usize> = tiers.iter().map(|(i, _)| *i).collect();
        assert_eq!(indexes, salient(&seq, 10.0));
    }

    #[test]
    fn test_tiers_need_an_epsilon() {
        assert!(salient_tiers(&[1.0, 2.0], &[]).is_err());
        assert!(salient_tiers(&[], &[10.0]).unwrap().is_empty());
    }
}

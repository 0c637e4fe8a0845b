//! Run-length helpers over index sequences.
//!
//! A [`Run`] is a half-open index interval `[start, stop)`. These helpers
//! split a sequence into runs of equal values, pick out the runs where a
//! predicate holds, and condense runs separated by short time gaps.

use serde::{Deserialize, Serialize};

/// Half-open index interval `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Run {
    pub start: usize,
    pub stop: usize,
}

impl Run {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.stop == self.start
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.stop
    }
}

/// Maximal runs of equal consecutive values, paired with the run's value.
///
/// # Example
/// ```
/// use track_analytics::runs::{runs, Run};
/// let r = runs(&[1, 1, 2, 2, 2, 1]);
/// assert_eq!(r, vec![(Run::new(0, 2), 1), (Run::new(2, 5), 2), (Run::new(5, 6), 1)]);
/// ```
pub fn runs<T: PartialEq + Copy>(seq: &[T]) -> Vec<(Run, T)> {
    let mut result = Vec::new();
    let Some(&first) = seq.first() else {
        return result;
    };
    let mut start = 0;
    let mut current = first;
    for (index, &element) in seq.iter().enumerate().skip(1) {
        if element != current {
            result.push((Run::new(start, index), current));
            start = index;
            current = element;
        }
    }
    result.push((Run::new(start, seq.len()), current));
    result
}

/// Maximal runs where `seq` is true.
pub fn runs_where(seq: &[bool]) -> Vec<Run> {
    runs(seq)
        .into_iter()
        .filter_map(|(run, value)| value.then_some(run))
        .collect()
}

/// Merge consecutive runs whose gap is shorter than `delta` seconds.
///
/// The gap between two runs is `times[next.start] - times[current.stop]`,
/// where `times` is indexed by sample (interval `j` spans samples `j` and
/// `j + 1`, so `times` must be at least one longer than the highest run stop).
pub fn condense(runs: &[Run], times: &[f64], delta: f64) -> Vec<Run> {
    let mut result = Vec::with_capacity(runs.len());
    let Some(&first) = runs.first() else {
        return result;
    };
    let mut current = first;
    for run in &runs[1..] {
        if times[run.start] - times[current.stop] < delta {
            current.stop = run.stop;
        } else {
            result.push(current);
            current = *run;
        }
    }
    result.push(current);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_where() {
        assert_eq!(runs_where(&[]), vec![]);
        assert_eq!(runs_where(&[true]), vec![Run::new(0, 1)]);
        assert_eq!(runs_where(&[false]), vec![]);
        assert_eq!(runs_where(&[true, false]), vec![Run::new(0, 1)]);
        assert_eq!(runs_where(&[false, true]), vec![Run::new(1, 2)]);
        assert_eq!(
            runs_where(&[true, true, false, true, false, false, true, true]),
            vec![Run::new(0, 2), Run::new(3, 4), Run::new(6, 8)]
        );
    }

    #[test]
    fn test_runs_single_value() {
        assert_eq!(runs(&[7, 7, 7]), vec![(Run::new(0, 3), 7)]);
        assert!(runs::<u8>(&[]).is_empty());
    }

    #[test]
    fn test_condense() {
        let times: Vec<f64> = (0..20).map(|i| 10.0 * i as f64).collect();
        let input = vec![Run::new(0, 3), Run::new(5, 7), Run::new(15, 16)];

        // gap 0->: times[5] - times[3] = 20 < 30 merges, times[15] - times[7] = 80 does not
        assert_eq!(
            condense(&input, &times, 30.0),
            vec![Run::new(0, 7), Run::new(15, 16)]
        );
        // Strictly less than: a 20s gap with delta 20 stays split
        assert_eq!(condense(&input, &times, 20.0), input);
        assert_eq!(condense(&input, &times, 1000.0), vec![Run::new(0, 16)]);
        assert!(condense(&[], &times, 60.0).is_empty());
    }
}

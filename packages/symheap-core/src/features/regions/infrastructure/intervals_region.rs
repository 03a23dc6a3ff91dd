//! Unions of closed integer intervals
//!
//! Array indices and copy ranges live here: a concrete index is a point, a
//! concrete copy range `[from, to]` is one interval, a symbolic index is the
//! whole line.

use crate::features::regions::domain::Region;
use std::fmt;

/// Sorted, pairwise disjoint, non-adjacent closed intervals
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct IntervalsRegion {
    intervals: Vec<(i64, i64)>,
}

impl IntervalsRegion {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn universe() -> Self {
        Self {
            intervals: vec![(i64::MIN, i64::MAX)],
        }
    }

    pub fn point(value: i64) -> Self {
        Self {
            intervals: vec![(value, value)],
        }
    }

    /// `[lower, upper]`, empty when `lower > upper`
    pub fn closed(lower: i64, upper: i64) -> Self {
        Self::from_intervals([(lower, upper)])
    }

    pub fn from_intervals(intervals: impl IntoIterator<Item = (i64, i64)>) -> Self {
        Self {
            intervals: normalize(intervals.into_iter().collect()),
        }
    }

    pub fn intervals(&self) -> &[(i64, i64)] {
        &self.intervals
    }

    pub fn contains(&self, value: i64) -> bool {
        // first interval whose upper bound reaches `value`
        let idx = self.intervals.partition_point(|&(_, hi)| hi < value);
        self.intervals
            .get(idx)
            .map_or(false, |&(lo, _)| lo <= value)
    }

    fn complement(&self) -> Self {
        let mut gaps = Vec::with_capacity(self.intervals.len() + 1);
        let mut next_lower = Some(i64::MIN);
        for &(lo, hi) in &self.intervals {
            if let Some(start) = next_lower {
                if lo > start {
                    gaps.push((start, lo - 1));
                }
            }
            next_lower = hi.checked_add(1);
        }
        if let Some(start) = next_lower {
            gaps.push((start, i64::MAX));
        }
        Self { intervals: gaps }
    }
}

fn normalize(mut intervals: Vec<(i64, i64)>) -> Vec<(i64, i64)> {
    intervals.retain(|&(lo, hi)| lo <= hi);
    intervals.sort_unstable();

    let mut merged: Vec<(i64, i64)> = Vec::with_capacity(intervals.len());
    for (lo, hi) in intervals {
        match merged.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

impl Region for IntervalsRegion {
    fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    fn intersect(&self, other: &Self) -> Self {
        let (mut i, mut j) = (0, 0);
        let mut result = Vec::new();
        while i < self.intervals.len() && j < other.intervals.len() {
            let (a_lo, a_hi) = self.intervals[i];
            let (b_lo, b_hi) = other.intervals[j];
            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if lo <= hi {
                result.push((lo, hi));
            }
            if a_hi < b_hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self {
            intervals: normalize(result),
        }
    }

    fn subtract(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        self.intersect(&other.complement())
    }

    fn union(&self, other: &Self) -> Self {
        Self::from_intervals(self.intervals.iter().chain(&other.intervals).copied())
    }
}

impl fmt::Debug for IntervalsRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.intervals.is_empty() {
            return write!(f, "∅");
        }
        let parts: Vec<String> = self
            .intervals
            .iter()
            .map(|&(lo, hi)| match (lo, hi) {
                (i64::MIN, i64::MAX) => "⊤".to_string(),
                (lo, hi) if lo == hi => format!("{{{}}}", lo),
                (lo, hi) => format!("[{}..{}]", lo, hi),
            })
            .collect();
        write!(f, "{}", parts.join(" ∪ "))
    }
}

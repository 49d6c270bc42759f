//! Ordered, non-overlapping interval container.
//!
//! `IntervalCollection` keeps one owner's intervals sorted by start time and
//! pairwise disjoint. Insertion locates the candidate position by binary
//! search, then only the left neighbor and the members starting before the
//! new end need checking — O(log n + k) with k local conflicts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::TimeInterval;

/// A sorted sequence of non-overlapping intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalCollection {
    intervals: Vec<TimeInterval>,
}

impl IntervalCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in chronological order.
    #[inline]
    pub fn intervals(&self) -> &[TimeInterval] {
        &self.intervals
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Index where `interval` would be inserted to keep start order.
    fn insertion_point(&self, interval: &TimeInterval) -> usize {
        self.intervals
            .partition_point(|existing| existing.start() < interval.start())
    }

    /// First existing member overlapping `interval`, ignoring the member at
    /// `skip` (used by move probes to exclude the interval being moved).
    fn find_conflict(&self, interval: &TimeInterval, skip: Option<usize>) -> Option<TimeInterval> {
        let pos = self.insertion_point(interval);
        let from = pos.saturating_sub(1);
        for (i, existing) in self.intervals.iter().enumerate().skip(from) {
            // Sorted by start, so nothing past this point can overlap.
            if existing.start() >= interval.end() {
                break;
            }
            if Some(i) == skip {
                continue;
            }
            if existing.overlaps(interval) {
                return Some(*existing);
            }
        }
        None
    }

    /// Inserts `interval`, keeping the collection sorted. Fails with a
    /// conflict error naming the overlapped member.
    pub fn add(&mut self, interval: TimeInterval) -> Result<()> {
        if let Some(existing) = self.find_conflict(&interval, None) {
            return Err(Error::IntervalConflict { interval, existing });
        }
        let pos = self.insertion_point(&interval);
        self.intervals.insert(pos, interval);
        Ok(())
    }

    /// Whether `interval` could be inserted without conflict. Never mutates.
    #[inline]
    pub fn can_add(&self, interval: &TimeInterval) -> bool {
        self.find_conflict(interval, None).is_none()
    }

    /// Whether `interval` could be inserted if the member at `skip` were
    /// absent. Never mutates.
    #[inline]
    pub fn can_add_ignoring(&self, interval: &TimeInterval, skip: usize) -> bool {
        self.find_conflict(interval, Some(skip)).is_none()
    }

    /// Index of an exact member, if present.
    pub fn position_of(&self, interval: &TimeInterval) -> Option<usize> {
        let pos = self.intervals.partition_point(|e| e.start() < interval.start());
        // Identical starts cannot coexist (they would overlap), so at most
        // one candidate.
        (pos < self.intervals.len() && self.intervals[pos] == *interval).then_some(pos)
    }

    /// Removes an exact member.
    pub fn remove(&mut self, interval: &TimeInterval) -> Result<()> {
        match self.position_of(interval) {
            Some(pos) => {
                self.intervals.remove(pos);
                Ok(())
            }
            None => Err(Error::IntervalNotFound {
                interval: *interval,
            }),
        }
    }

    /// Replaces the member at `index` with `replacement`, re-sorting as
    /// needed. Caller has already validated `replacement` for conflicts.
    pub(crate) fn replace_at(&mut self, index: usize, replacement: TimeInterval) {
        self.intervals.remove(index);
        let pos = self.insertion_point(&replacement);
        self.intervals.insert(pos, replacement);
    }
}

//! Schedule bound to an entity's boundary window.
//!
//! `ScheduleCollection` binds an [`IntervalCollection`] to a boundary
//! interval — a cashier's shift or a checkout's opening window — and derives
//! **availability**: the free sub-intervals of the boundary. Availability is
//! computed lazily and invalidated by every mutation.
//!
//! # Probe/commit
//! `try_move` is the foundation of every "what-if" decision in the engines:
//! with `commit = false` it answers "would this shift be legal?" without
//! touching the collection at all; with `commit = true` it applies the shift
//! and re-sorts. A rejected probe reports the original interval back.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{IntervalCollection, TimeInterval};

/// One entity's schedule: occupied intervals inside a fixed boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCollection {
    boundary: TimeInterval,
    intervals: IntervalCollection,
    /// Free sub-intervals of `boundary`; `None` until next read.
    #[serde(skip)]
    availability: Option<Vec<TimeInterval>>,
}

impl ScheduleCollection {
    /// Creates an empty schedule bound to `boundary`.
    pub fn new(boundary: TimeInterval) -> Self {
        Self {
            boundary,
            intervals: IntervalCollection::new(),
            availability: None,
        }
    }

    /// The fixed window every member must fall within.
    #[inline]
    pub fn boundary(&self) -> TimeInterval {
        self.boundary
    }

    /// Occupied intervals in chronological order.
    #[inline]
    pub fn events(&self) -> &[TimeInterval] {
        self.intervals.intervals()
    }

    /// Whether `interval` lies entirely within the boundary.
    #[inline]
    pub fn is_within_boundary(&self, interval: &TimeInterval) -> bool {
        self.boundary.contains(interval)
    }

    /// Inserts an occupied interval. Fails if it escapes the boundary or
    /// overlaps an existing member.
    pub fn add(&mut self, interval: TimeInterval) -> Result<()> {
        if !self.is_within_boundary(&interval) {
            return Err(Error::OutsideBoundary {
                interval,
                boundary: self.boundary,
            });
        }
        self.intervals.add(interval)?;
        self.availability = None;
        Ok(())
    }

    /// Whether `interval` could be inserted. Never mutates.
    pub fn can_add(&self, interval: &TimeInterval) -> bool {
        self.is_within_boundary(interval) && self.intervals.can_add(interval)
    }

    /// Removes an occupied interval.
    pub fn remove(&mut self, interval: &TimeInterval) -> Result<()> {
        self.intervals.remove(interval)?;
        self.availability = None;
        Ok(())
    }

    /// Attempts to move an existing member by `minutes`.
    ///
    /// Returns `Ok((false, original))` when the shifted interval would escape
    /// the boundary or collide with another member. On success the shifted
    /// interval is returned; with `commit = false` the schedule itself is
    /// left exactly as found, including its availability cache.
    ///
    /// Fails with [`Error::IntervalNotFound`] when `original` is not a
    /// member — engine bookkeeping gone wrong, not a schedulable outcome.
    pub fn try_move(
        &mut self,
        original: &TimeInterval,
        minutes: i64,
        commit: bool,
    ) -> Result<(bool, TimeInterval)> {
        let index = self
            .intervals
            .position_of(original)
            .ok_or(Error::IntervalNotFound {
                interval: *original,
            })?;

        let shifted = original.shifted_by(minutes);
        if !self.is_within_boundary(&shifted)
            || !self.intervals.can_add_ignoring(&shifted, index)
        {
            return Ok((false, *original));
        }

        if commit {
            self.intervals.replace_at(index, shifted);
            self.availability = None;
        }
        Ok((true, shifted))
    }

    /// Free sub-intervals of the boundary, recomputed on demand.
    pub fn availability(&mut self) -> &[TimeInterval] {
        if self.availability.is_none() {
            self.availability = Some(compute_availability(
                self.boundary,
                self.intervals.intervals(),
            ));
        }
        self.availability.as_deref().unwrap_or_default()
    }

    /// Detached copy of the current availability, safe to whittle down in a
    /// simulation without touching this schedule.
    pub fn availability_snapshot(&mut self) -> Vec<TimeInterval> {
        self.availability().to_vec()
    }

    /// The continuous free block containing `time`, if any.
    pub fn continuous_availability_from(
        &mut self,
        time: chrono::NaiveDateTime,
    ) -> Option<TimeInterval> {
        self.availability()
            .iter()
            .find(|free| free.contains_time(time))
            .copied()
    }
}

/// Boundary minus occupied: repeatedly carve each occupied interval out of
/// whichever free fragment contains it.
fn compute_availability(boundary: TimeInterval, occupied: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut free = vec![boundary];
    for interval in occupied {
        let mut next = Vec::with_capacity(free.len() + 1);
        for fragment in &free {
            if fragment.contains(interval) {
                next.extend(fragment.subtract(interval));
            } else {
                next.push(*fragment);
            }
        }
        free = next;
    }
    free
}

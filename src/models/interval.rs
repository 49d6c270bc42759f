//! Time interval model and interval algebra.
//!
//! `TimeInterval` is the half-open span `[start, end)` that every scheduled
//! event in the planner is built from: shifts, opening windows, breaks,
//! coverage stints, and checkout occupancies.
//!
//! # Time Model
//! Instants are `chrono::NaiveDateTime`. Callers resolve overnight shifts by
//! rolling the end over to the next day before intervals are constructed, so
//! the invariant `start < end` always holds here.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A half-open time span `[start, end)`.
///
/// Value type: shifting produces a new interval rather than mutating in
/// place, so collections stay free to reconcile ordering themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeInterval {
    /// Creates an interval, rejecting `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start >= end {
            return Err(Error::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval start (inclusive).
    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Interval end (exclusive).
    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length in whole minutes.
    #[inline]
    pub fn length_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether `other` lies entirely within this interval.
    #[inline]
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether an instant falls within this interval.
    #[inline]
    pub fn contains_time(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time < self.end
    }

    /// Whether two intervals share any time. Touching endpoints do not count.
    #[inline]
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Removes `other` from this interval, returning the 0–2 residual parts
    /// in chronological order.
    ///
    /// Non-overlapping inputs return the interval unchanged; an `other` that
    /// covers this interval completely returns nothing.
    pub fn subtract(&self, other: &TimeInterval) -> Vec<TimeInterval> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut parts = Vec::with_capacity(2);
        if self.start < other.start {
            parts.push(Self {
                start: self.start,
                end: other.start,
            });
        }
        if other.end < self.end {
            parts.push(Self {
                start: other.end,
                end: self.end,
            });
        }
        parts
    }

    /// A copy of this interval moved by `minutes` (negative = earlier).
    #[inline]
    pub fn shifted_by(&self, minutes: i64) -> TimeInterval {
        let delta = Duration::minutes(minutes);
        Self {
            start: self.start + delta,
            end: self.end + delta,
        }
    }

    /// A copy of this interval lengthened at the end by `minutes`.
    pub fn extended_by(&self, minutes: i64) -> Result<TimeInterval> {
        Self::new(self.start, self.end + Duration::minutes(minutes))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {})", self.start, self.end)
    }
}

/// Rounds an instant to the nearest quarter hour. Ties (7:30 past the
/// quarter) round up.
pub fn round_to_nearest_quarter(time: NaiveDateTime) -> NaiveDateTime {
    let secs_into_quarter = i64::from(time.minute() % 15) * 60 + i64::from(time.second());
    let floor = time - Duration::seconds(secs_into_quarter);
    if secs_into_quarter * 2 >= 15 * 60 {
        floor + Duration::minutes(15)
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
        TimeInterval::new(at(sh, sm), at(eh, em)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let err = TimeInterval::new(at(10, 0), at(9, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { .. }));
        assert!(TimeInterval::new(at(10, 0), at(10, 0)).is_err()); // zero-length
    }

    #[test]
    fn test_length_and_contains() {
        let shift = iv(9, 0, 17, 0);
        assert_eq!(shift.length_minutes(), 480);
        assert!(shift.contains(&iv(12, 0, 12, 15)));
        assert!(shift.contains(&shift));
        assert!(!shift.contains(&iv(16, 45, 17, 15)));
        assert!(shift.contains_time(at(9, 0)));
        assert!(!shift.contains_time(at(17, 0))); // exclusive end
    }

    #[test]
    fn test_overlaps_half_open() {
        let a = iv(9, 0, 10, 0);
        assert!(a.overlaps(&iv(9, 30, 10, 30)));
        assert!(a.overlaps(&iv(8, 0, 11, 0)));
        assert!(!a.overlaps(&iv(10, 0, 11, 0))); // touching
        assert!(!a.overlaps(&iv(7, 0, 9, 0)));
    }

    #[test]
    fn test_subtract_middle_leaves_two_parts() {
        let parts = iv(9, 0, 17, 0).subtract(&iv(12, 0, 12, 30));
        assert_eq!(parts, vec![iv(9, 0, 12, 0), iv(12, 30, 17, 0)]);
    }

    #[test]
    fn test_subtract_edges_and_cover() {
        assert_eq!(iv(9, 0, 12, 0).subtract(&iv(9, 0, 10, 0)), vec![iv(10, 0, 12, 0)]);
        assert_eq!(iv(9, 0, 12, 0).subtract(&iv(11, 0, 12, 0)), vec![iv(9, 0, 11, 0)]);
        assert!(iv(10, 0, 11, 0).subtract(&iv(9, 0, 12, 0)).is_empty());
        // disjoint: unchanged
        assert_eq!(iv(9, 0, 10, 0).subtract(&iv(11, 0, 12, 0)), vec![iv(9, 0, 10, 0)]);
    }

    #[test]
    fn test_shifted_by() {
        let moved = iv(12, 0, 12, 15).shifted_by(-30);
        assert_eq!(moved, iv(11, 30, 11, 45));
        assert_eq!(moved.shifted_by(30), iv(12, 0, 12, 15));
    }

    #[test]
    fn test_round_to_nearest_quarter() {
        assert_eq!(round_to_nearest_quarter(at(10, 7)), at(10, 0));
        assert_eq!(round_to_nearest_quarter(at(10, 8)), at(10, 15));
        assert_eq!(round_to_nearest_quarter(at(10, 22)), at(10, 15));
        assert_eq!(round_to_nearest_quarter(at(10, 23)), at(10, 30));
        assert_eq!(round_to_nearest_quarter(at(10, 53)), at(11, 0));
        assert_eq!(round_to_nearest_quarter(at(10, 45)), at(10, 45));
    }
}

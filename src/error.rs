//! Error types for the planner.
//!
//! Conflict and boundary errors are local: `can_add`/`try_move` fold them
//! into their boolean result, and callers of `add` pick another time or give
//! up. The two infeasibility errors are fatal for the run — partial
//! understaffing is a compliance violation, not something to retry — and
//! carry the slice start time so an operator can add staff or relax
//! constraints.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::TimeInterval;

/// Result type for planner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a staffing plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Interval construction with `start >= end`.
    #[error("invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// Insertion overlaps an existing member of a collection.
    #[error("interval {interval} conflicts with existing entry {existing}")]
    IntervalConflict {
        interval: TimeInterval,
        existing: TimeInterval,
    },

    /// Interval escapes the owning boundary (shift or opening window).
    #[error("interval {interval} lies outside boundary {boundary}")]
    OutsideBoundary {
        interval: TimeInterval,
        boundary: TimeInterval,
    },

    /// Removal or lookup of an interval absent from its collection.
    /// Indicates a defect in engine bookkeeping, not a user error.
    #[error("interval {interval} not found in collection")]
    IntervalNotFound { interval: TimeInterval },

    /// Mandatory and coverage lanes exceed the cashiers on hand at a slice.
    #[error(
        "infeasible staffing at {slice_start}: {mandatory} mandatory/coverage lane(s), \
         {available} cashier(s) available"
    )]
    InfeasibleStaffing {
        slice_start: NaiveDateTime,
        mandatory: usize,
        available: usize,
    },

    /// Tobacco ratio unsatisfiable with the lanes open at a slice.
    #[error(
        "infeasible tobacco ratio at {slice_start}: pool of {pool_size} requires \
         {required} tobacco lane(s), only {tobacco_selected} selectable"
    )]
    InfeasibleRatio {
        slice_start: NaiveDateTime,
        pool_size: usize,
        required: usize,
        tobacco_selected: usize,
    },
}

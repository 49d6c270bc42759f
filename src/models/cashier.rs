//! Cashier entity and statutory break seeding.
//!
//! A cashier owns one [`ScheduleCollection`] bound to the shift interval;
//! breaks and other events are read through the schedule. Statutory breaks
//! are seeded once at setup time by shift-length band:
//!
//! | Shift length (min) | Breaks        |
//! |--------------------|---------------|
//! | < 360              | 15            |
//! | 360 – 420          | 15, 15        |
//! | > 420              | 15, 30, 15    |
//!
//! Breaks are spaced evenly across the shift (gap = length / (n + 1)) and
//! each start is rounded to the nearest quarter hour.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::interval::round_to_nearest_quarter;
use crate::models::{ScheduleCollection, TimeInterval};

/// Statutory break lengths in minutes for a shift of `shift_minutes`.
pub fn statutory_break_lengths(shift_minutes: i64) -> &'static [i64] {
    if shift_minutes < 360 {
        &[15]
    } else if shift_minutes <= 420 {
        &[15, 15]
    } else {
        &[15, 30, 15]
    }
}

/// A cashier on shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cashier {
    name: String,
    schedule: ScheduleCollection,
}

impl Cashier {
    /// Creates a cashier with an empty schedule bound to `shift`.
    pub fn new(name: impl Into<String>, shift: TimeInterval) -> Self {
        Self {
            name: name.into(),
            schedule: ScheduleCollection::new(shift),
        }
    }

    /// Creates a cashier and seeds the statutory breaks in one step.
    pub fn with_statutory_breaks(name: impl Into<String>, shift: TimeInterval) -> Result<Self> {
        let mut cashier = Self::new(name, shift);
        cashier.seed_statutory_breaks()?;
        Ok(cashier)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shift boundary.
    #[inline]
    pub fn shift(&self) -> TimeInterval {
        self.schedule.boundary()
    }

    #[inline]
    pub fn schedule(&self) -> &ScheduleCollection {
        &self.schedule
    }

    #[inline]
    pub fn schedule_mut(&mut self) -> &mut ScheduleCollection {
        &mut self.schedule
    }

    /// Places the statutory breaks for this shift, returning them in order.
    ///
    /// Placement walks the shift with an even gap between breaks; each start
    /// is quarter-rounded and the next placement continues from the rounded
    /// position, so breaks stay on the 15-minute grid.
    pub fn seed_statutory_breaks(&mut self) -> Result<Vec<TimeInterval>> {
        let shift = self.shift();
        let lengths = statutory_break_lengths(shift.length_minutes());

        // Even spacing, tracked in seconds so uneven divisions don't drift.
        let gap = Duration::seconds(shift.length_minutes() * 60 / (lengths.len() as i64 + 1));

        let mut breaks = Vec::with_capacity(lengths.len());
        let mut start = round_to_nearest_quarter(shift.start() + gap);
        for &length in lengths {
            let interval = TimeInterval::new(start, start + Duration::minutes(length))?;
            breaks.push(interval);
            start = round_to_nearest_quarter(start + Duration::minutes(length) + gap);
        }

        for interval in &breaks {
            self.schedule.add(*interval)?;
        }
        Ok(breaks)
    }
}

//! Checkout lane entity.

use serde::{Deserialize, Serialize};

use crate::models::{ScheduleCollection, TimeInterval};

/// A checkout lane with its opening window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkout {
    id: String,
    is_tobacco: bool,
    is_mandatory_open: bool,
    schedule: ScheduleCollection,
}

impl Checkout {
    /// Creates a lane whose schedule is bound to `opening_window`.
    pub fn new(id: impl Into<String>, opening_window: TimeInterval) -> Self {
        Self {
            id: id.into(),
            is_tobacco: false,
            is_mandatory_open: false,
            schedule: ScheduleCollection::new(opening_window),
        }
    }

    /// Marks the lane as authorized to sell tobacco.
    pub fn tobacco(mut self) -> Self {
        self.is_tobacco = true;
        self
    }

    /// Marks the lane as one that must be staffed whenever it is open.
    pub fn mandatory_open(mut self) -> Self {
        self.is_mandatory_open = true;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn is_tobacco(&self) -> bool {
        self.is_tobacco
    }

    #[inline]
    pub fn is_mandatory_open(&self) -> bool {
        self.is_mandatory_open
    }

    /// The opening window.
    #[inline]
    pub fn opening_window(&self) -> TimeInterval {
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

    /// Whether the lane is open for the whole of `slice`.
    #[inline]
    pub fn is_open_during(&self, slice: &TimeInterval) -> bool {
        self.opening_window().contains(slice)
    }
}

//! Domain models for the staffing planner.
//!
//! The interval stack ([`TimeInterval`] → [`IntervalCollection`] →
//! [`ScheduleCollection`]) is shared by every entity: a [`Cashier`] binds a
//! schedule to its shift, a [`Checkout`] to its opening window. The
//! assignment types tag intervals with the people and lanes involved.

mod assignment;
mod cashier;
mod checkout;
mod collection;
pub(crate) mod interval;
mod schedule;

pub use assignment::{BreakAssignment, CheckoutAssignment, CoverageRecord};
pub use cashier::{statutory_break_lengths, Cashier};
pub use checkout::Checkout;
pub use collection::IntervalCollection;
pub use interval::{round_to_nearest_quarter, TimeInterval};
pub use schedule::ScheduleCollection;

//! Staffing planner for a retail store's checkout floor.
//!
//! Given a roster of cashier shifts and a set of checkout lanes, the planner
//! produces one day plan in three deterministic stages: statutory break
//! placement, break coverage (picking the tauottajas who relieve colleagues
//! at their lanes), and slice-by-slice lane allocation.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `TimeInterval`, `IntervalCollection`,
//!   `ScheduleCollection`, `Cashier`, `Checkout`, assignment records
//! - **`engine`**: `BreakCoverageEngine`, `CheckoutAllocationEngine`, and
//!   the [`engine::build_plan`] pipeline
//! - **`config`**: Fill order, tobacco ratio table, coverage tuning
//! - **`timeline`**: Per-cashier / per-checkout tagged event timelines
//! - **`validation`**: Input integrity checks (duplicate ids, fill order,
//!   ratio table)
//!
//! # Determinism
//!
//! Every stage is a fixed greedy heuristic over deterministically ordered
//! collections: identical inputs produce identical plans. Ties are broken by
//! input order, never by hashing or randomness.

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod timeline;
pub mod validation;

pub use config::{CoverageTuning, PlanConfig, RatioBand};
pub use engine::{build_plan, StaffingPlan};
pub use error::{Error, Result};
pub use models::{Cashier, Checkout, TimeInterval};

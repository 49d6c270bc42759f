//! Planning engines and the end-to-end pipeline.
//!
//! A full planning run is three stages:
//!
//! 1. seed statutory breaks for every cashier that has none
//!    ([`Cashier::seed_statutory_breaks`]);
//! 2. pick tauottajas and shift breaks into coverable positions
//!    ([`BreakCoverageEngine`]);
//! 3. staff the checkout lanes slice by slice
//!    ([`CheckoutAllocationEngine`]).
//!
//! [`build_plan`] wires the stages together; each engine is also usable on
//! its own when a caller wants to intervene between stages.

pub mod allocation;
pub mod coverage;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PlanConfig;
use crate::error::Result;
use crate::models::{Cashier, Checkout, CoverageRecord};

pub use allocation::{AllocationOutcome, CheckoutAllocationEngine, LaneTimeline};
pub use coverage::BreakCoverageEngine;

/// Everything a planning run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingPlan {
    /// Tauottaja workloads and uncovered breaks, in selection order.
    pub coverage: Vec<CoverageRecord>,
    /// Lane-by-lane assignment timelines.
    pub allocation: AllocationOutcome,
}

/// Runs the full pipeline over the given roster and lanes.
///
/// Cashiers that already carry schedule events are assumed to have their
/// breaks placed by hand and are not re-seeded.
pub fn build_plan(
    cashiers: &mut [Cashier],
    checkouts: &mut [Checkout],
    config: &PlanConfig,
) -> Result<StaffingPlan> {
    for cashier in cashiers.iter_mut() {
        if cashier.schedule().events().is_empty() {
            cashier.seed_statutory_breaks()?;
        }
    }

    let mut coverage = BreakCoverageEngine::new(config.coverage.clone()).assign(cashiers)?;
    let allocation =
        CheckoutAllocationEngine::new(config).allocate(cashiers, checkouts, &mut coverage)?;
    info!(
        cashiers = cashiers.len(),
        lanes = allocation.lanes.len(),
        relievers = coverage.iter().filter(|r| r.tauottaja.is_some()).count(),
        "plan built"
    );
    Ok(StaffingPlan {
        coverage,
        allocation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeInterval;
    use chrono::{NaiveDate, NaiveDateTime};

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
    fn test_build_plan_end_to_end() {
        let mut cashiers = vec![
            Cashier::new("Anna", iv(8, 0, 16, 0)),
            Cashier::new("Bertta", iv(9, 0, 17, 0)),
            Cashier::new("Celia", iv(10, 0, 18, 0)),
        ];
        let mut checkouts = vec![
            Checkout::new("1", iv(9, 0, 18, 0)).mandatory_open(),
            Checkout::new("2", iv(9, 0, 18, 0)).tobacco(),
        ];
        let config = PlanConfig {
            fill_order: vec!["1".into(), "2".into()],
            ..PlanConfig::default()
        };

        let plan = build_plan(&mut cashiers, &mut checkouts, &config).unwrap();

        // Every cashier got a statutory break set (8h shift: 15 + 30 + 15).
        for record in &plan.coverage {
            for brk in &record.breaks_covered {
                assert!(matches!(brk.interval.length_minutes(), 15 | 30));
            }
        }
        let break_count: usize = plan.coverage.iter().map(|r| r.breaks_covered.len()).sum();
        assert_eq!(break_count, 9);

        // Lane timelines stay inside the opening window and in order.
        for lane in &plan.allocation.lanes {
            let window = checkouts
                .iter()
                .find(|c| c.id() == lane.checkout)
                .unwrap()
                .opening_window();
            for pair in lane.assignments.windows(2) {
                assert!(pair[0].interval.end() <= pair[1].interval.start());
            }
            for asg in &lane.assignments {
                assert!(window.contains(&asg.interval));
                assert_eq!(asg.checkout, lane.checkout);
            }
        }
        // The mandatory lane is staffed wall to wall.
        let mandatory = &plan.allocation.lanes[0];
        let staffed: i64 = mandatory
            .assignments
            .iter()
            .map(|a| a.interval.length_minutes())
            .sum();
        assert_eq!(staffed, 9 * 60);
    }
}

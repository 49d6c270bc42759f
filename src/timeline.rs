//! Per-entity event timelines.
//!
//! Flattens a [`StaffingPlan`] into ordered, tagged event lists: one per
//! cashier (own breaks, covering stints, lane duty) and one per checkout
//! (who manned it and whether the occupant was a tauottaja holding the
//! lane through a break). Rendering these into reports is left to the
//! caller; this module only shapes the data.

use serde::{Deserialize, Serialize};

use crate::engine::StaffingPlan;
use crate::models::{Cashier, TimeInterval};

/// What a cashier is doing during one timeline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CashierEventKind {
    /// The cashier's own break, with the reliever covering it (if any).
    OwnBreak { tauottaja: Option<String> },
    /// Covering `cashier`'s break, keeping `checkout` open if one is linked.
    BreakCoverage {
        cashier: String,
        checkout: Option<String>,
    },
    /// Ordinary duty on a lane.
    CheckoutDuty { checkout: String },
}

/// One tagged span in a cashier's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashierEvent {
    pub interval: TimeInterval,
    pub kind: CashierEventKind,
}

/// A cashier's day, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashierTimeline {
    pub cashier: String,
    pub events: Vec<CashierEvent>,
}

/// Who manned a lane during one timeline event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LaneEventKind {
    /// Ordinary staffing.
    Staffed { cashier: String },
    /// A tauottaja holding the lane while `relieved` takes their break.
    CoverageStint { cashier: String, relieved: String },
}

/// One tagged span in a lane's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneEvent {
    pub interval: TimeInterval,
    pub kind: LaneEventKind,
}

/// A checkout lane's day, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutTimeline {
    pub checkout: String,
    pub events: Vec<LaneEvent>,
}

/// Builds one timeline per cashier, in roster order.
pub fn cashier_timelines(cashiers: &[Cashier], plan: &StaffingPlan) -> Vec<CashierTimeline> {
    cashiers
        .iter()
        .map(|cashier| {
            let name = cashier.name();
            let mut events = Vec::new();

            let mut duties = Vec::new();
            for record in &plan.coverage {
                for brk in &record.breaks_covered {
                    if brk.cashier == name {
                        events.push(CashierEvent {
                            interval: brk.interval,
                            kind: CashierEventKind::OwnBreak {
                                tauottaja: brk.tauottaja.clone(),
                            },
                        });
                    }
                    if brk.tauottaja.as_deref() == Some(name) {
                        duties.push(brk.interval);
                        events.push(CashierEvent {
                            interval: brk.interval,
                            kind: CashierEventKind::BreakCoverage {
                                cashier: brk.cashier.clone(),
                                checkout: brk.checkout.clone(),
                            },
                        });
                    }
                }
            }

            for lane in &plan.allocation.lanes {
                for asg in &lane.assignments {
                    if asg.cashier != name {
                        continue;
                    }
                    // Covering stints already appear as BreakCoverage.
                    if duties.iter().any(|d| d.overlaps(&asg.interval)) {
                        continue;
                    }
                    events.push(CashierEvent {
                        interval: asg.interval,
                        kind: CashierEventKind::CheckoutDuty {
                            checkout: asg.checkout.clone(),
                        },
                    });
                }
            }

            events.sort_by(|a, b| a.interval.cmp(&b.interval));
            CashierTimeline {
                cashier: name.to_owned(),
                events,
            }
        })
        .collect()
}

/// Builds one timeline per checkout, in lane order.
pub fn checkout_timelines(plan: &StaffingPlan) -> Vec<CheckoutTimeline> {
    plan.allocation
        .lanes
        .iter()
        .map(|lane| {
            let events = lane
                .assignments
                .iter()
                .map(|asg| {
                    // An assignment inside one of the occupant's covered
                    // breaks on this lane is a coverage stint.
                    let relieved = plan.coverage.iter().flat_map(|r| &r.breaks_covered).find(
                        |brk| {
                            brk.tauottaja.as_deref() == Some(asg.cashier.as_str())
                                && brk.checkout.as_deref() == Some(lane.checkout.as_str())
                                && brk.interval.overlaps(&asg.interval)
                        },
                    );
                    let kind = match relieved {
                        Some(brk) => LaneEventKind::CoverageStint {
                            cashier: asg.cashier.clone(),
                            relieved: brk.cashier.clone(),
                        },
                        None => LaneEventKind::Staffed {
                            cashier: asg.cashier.clone(),
                        },
                    };
                    LaneEvent {
                        interval: asg.interval,
                        kind,
                    }
                })
                .collect();
            CheckoutTimeline {
                checkout: lane.checkout.clone(),
                events,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AllocationOutcome, LaneTimeline};
    use crate::models::{BreakAssignment, CheckoutAssignment, CoverageRecord};
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

    fn sample_plan() -> StaffingPlan {
        // Anna works lane 1 around her break; Bertta holds the lane for it.
        let mut covered = BreakAssignment::covered(iv(10, 0, 10, 15), "Anna", "Bertta");
        covered.checkout = Some("1".into());
        StaffingPlan {
            coverage: vec![CoverageRecord {
                tauottaja: Some("Bertta".into()),
                total_minutes: 15,
                breaks_covered: vec![covered],
            }],
            allocation: AllocationOutcome {
                lanes: vec![LaneTimeline {
                    checkout: "1".into(),
                    assignments: vec![
                        CheckoutAssignment::new(iv(9, 0, 10, 0), "Anna", "1"),
                        CheckoutAssignment::new(iv(10, 0, 10, 15), "Bertta", "1"),
                        CheckoutAssignment::new(iv(10, 15, 11, 0), "Anna", "1"),
                    ],
                }],
            },
        }
    }

    #[test]
    fn test_cashier_timelines_tag_all_roles() {
        let cashiers = vec![
            Cashier::new("Anna", iv(9, 0, 17, 0)),
            Cashier::new("Bertta", iv(9, 0, 17, 0)),
        ];
        let timelines = cashier_timelines(&cashiers, &sample_plan());

        assert_eq!(
            timelines[0].events,
            vec![
                CashierEvent {
                    interval: iv(9, 0, 10, 0),
                    kind: CashierEventKind::CheckoutDuty {
                        checkout: "1".into()
                    },
                },
                CashierEvent {
                    interval: iv(10, 0, 10, 15),
                    kind: CashierEventKind::OwnBreak {
                        tauottaja: Some("Bertta".into())
                    },
                },
                CashierEvent {
                    interval: iv(10, 15, 11, 0),
                    kind: CashierEventKind::CheckoutDuty {
                        checkout: "1".into()
                    },
                },
            ]
        );
        // Bertta's covering stint shows once, as coverage, not as lane duty.
        assert_eq!(
            timelines[1].events,
            vec![CashierEvent {
                interval: iv(10, 0, 10, 15),
                kind: CashierEventKind::BreakCoverage {
                    cashier: "Anna".into(),
                    checkout: Some("1".into())
                },
            }]
        );
    }

    #[test]
    fn test_checkout_timeline_marks_coverage_stint() {
        let timelines = checkout_timelines(&sample_plan());
        assert_eq!(timelines.len(), 1);
        assert_eq!(
            timelines[0].events[1],
            LaneEvent {
                interval: iv(10, 0, 10, 15),
                kind: LaneEventKind::CoverageStint {
                    cashier: "Bertta".into(),
                    relieved: "Anna".into()
                },
            }
        );
        assert!(matches!(
            timelines[0].events[0].kind,
            LaneEventKind::Staffed { .. }
        ));
        assert!(matches!(
            timelines[0].events[2].kind,
            LaneEventKind::Staffed { .. }
        ));
    }
}

//! Break coverage engine: tauottaja selection.
//!
//! # Algorithm
//!
//! Round-based greedy over a pool of unassigned breaks:
//!
//! 1. Every remaining candidate cashier *simulates* covering all pending
//!    breaks that are not their own, against a detached snapshot of their
//!    availability. Per break the owner's schedule is probed with the five
//!    shifts -30/-15/0/+15/+30 minutes; among owner-accepted shifts that fit
//!    the snapshot, the earliest resulting end wins. Fitted breaks are carved
//!    out of the snapshot so later breaks in the same simulation cannot
//!    double-book the slot.
//! 2. Candidates under the minimum-coverage threshold are rejected.
//! 3. The highest-scoring candidate commits: each planned shift is applied
//!    to the break owner's real schedule, and the shifted break joins the
//!    reliever's own schedule.
//! 4. Repeat until the pool drains or nobody qualifies; leftovers are
//!    emitted as uncovered records.
//!
//! Scoring is covered minutes plus the named bonuses from
//! [`CoverageTuning`]: consecutive coverage, early breaks, late breaks.
//! Ties keep the first candidate in cashier order, so runs are deterministic.

use tracing::{debug, info, warn};

use crate::config::{CoverageTuning, MAX_BREAK_SHIFT_MINUTES, SLICE_MINUTES};
use crate::error::Result;
use crate::models::{BreakAssignment, Cashier, CoverageRecord, TimeInterval};

/// A break waiting for a reliever; `owner` indexes the cashier slice.
#[derive(Debug, Clone, Copy)]
struct PendingBreak {
    owner: usize,
    interval: TimeInterval,
}

/// One break a simulation decided to cover.
#[derive(Debug, Clone, Copy)]
struct PlannedCover {
    pool_index: usize,
    shift: i64,
}

/// Outcome of simulating one candidate over the current pool.
#[derive(Debug, Default)]
struct Simulation {
    plan: Vec<PlannedCover>,
    minutes: i64,
    score: i64,
}

/// Assigns relievers to statutory breaks by iterative greedy selection.
#[derive(Debug, Clone)]
pub struct BreakCoverageEngine {
    tuning: CoverageTuning,
}

impl BreakCoverageEngine {
    pub fn new(tuning: CoverageTuning) -> Self {
        Self { tuning }
    }

    /// Covers as many breaks as possible, mutating cashier schedules.
    ///
    /// Records come out in selection order (largest impact first), with one
    /// uncovered record per leftover break appended last. The union of all
    /// records accounts for every seeded break exactly once.
    pub fn assign(&self, cashiers: &mut [Cashier]) -> Result<Vec<CoverageRecord>> {
        // Every event on a cashier's schedule at this point is a statutory
        // break; the allocation engine has not run yet.
        let mut pool: Vec<PendingBreak> = Vec::new();
        for (owner, cashier) in cashiers.iter().enumerate() {
            for interval in cashier.schedule().events() {
                pool.push(PendingBreak {
                    owner,
                    interval: *interval,
                });
            }
        }

        let mut candidates: Vec<usize> = cashiers
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.schedule().events().is_empty())
            .map(|(i, _)| i)
            .collect();

        let mut records = Vec::new();
        while !pool.is_empty() && !candidates.is_empty() {
            let mut best: Option<(usize, Simulation)> = None;
            for &candidate in &candidates {
                let sim = self.simulate(candidate, cashiers, &pool)?;
                debug!(
                    candidate = cashiers[candidate].name(),
                    minutes = sim.minutes,
                    score = sim.score,
                    breaks = sim.plan.len(),
                    "coverage simulation"
                );
                if sim.minutes < self.tuning.min_coverage_minutes {
                    continue;
                }
                // Strict comparison keeps the first candidate on ties.
                if best.as_ref().is_none_or(|(_, b)| sim.score > b.score) {
                    best = Some((candidate, sim));
                }
            }

            let Some((reliever, sim)) = best else {
                break;
            };

            let record = self.commit(reliever, &sim, cashiers, &mut pool)?;
            info!(
                tauottaja = cashiers[reliever].name(),
                minutes = record.total_minutes,
                breaks = record.breaks_covered.len(),
                "tauottaja selected"
            );
            records.push(record);
            candidates.retain(|&c| c != reliever);
        }

        for pending in pool {
            let owner = cashiers[pending.owner].name();
            warn!(cashier = owner, interval = %pending.interval, "break left uncovered");
            records.push(CoverageRecord {
                tauottaja: None,
                total_minutes: pending.interval.length_minutes(),
                breaks_covered: vec![BreakAssignment::uncovered(pending.interval, owner)],
            });
        }
        Ok(records)
    }

    /// Dry-runs `candidate` over the pool. Owner schedules are only probed
    /// (`commit = false`) and the candidate's availability is a snapshot, so
    /// nothing observable changes.
    fn simulate(
        &self,
        candidate: usize,
        cashiers: &mut [Cashier],
        pool: &[PendingBreak],
    ) -> Result<Simulation> {
        let mut free = cashiers[candidate].schedule_mut().availability_snapshot();

        let mut order: Vec<usize> = (0..pool.len()).collect();
        order.sort_by_key(|&i| pool[i].interval.start());

        let mut sim = Simulation::default();
        let mut last_end = None;
        for pool_index in order {
            let pending = pool[pool_index];
            if pending.owner == candidate {
                continue;
            }

            let Some((shift, shifted)) =
                self.best_shift(&pending, cashiers, &free)?
            else {
                continue;
            };

            carve(&mut free, &shifted);
            sim.minutes += shifted.length_minutes();
            sim.score += shifted.length_minutes();
            if last_end == Some(shifted.start()) {
                sim.score += self.tuning.consecutive_bonus;
            }
            if shifted.end().time() < self.tuning.early_end {
                sim.score += self.tuning.early_bonus;
            }
            if shifted.start().time() > self.tuning.late_start {
                sim.score += self.tuning.late_bonus;
            }
            last_end = Some(shifted.end());
            sim.plan.push(PlannedCover { pool_index, shift });
        }
        Ok(sim)
    }

    /// The best of the five shifts for one break: accepted by the owner's
    /// schedule, fitting the candidate's remaining free slots, earliest
    /// resulting end.
    fn best_shift(
        &self,
        pending: &PendingBreak,
        cashiers: &mut [Cashier],
        free: &[TimeInterval],
    ) -> Result<Option<(i64, TimeInterval)>> {
        let steps = MAX_BREAK_SHIFT_MINUTES / SLICE_MINUTES;
        let mut chosen: Option<(i64, TimeInterval)> = None;
        for step in -steps..=steps {
            let shift = step * SLICE_MINUTES;
            let (ok, shifted) = cashiers[pending.owner]
                .schedule_mut()
                .try_move(&pending.interval, shift, false)?;
            if !ok || !free.iter().any(|slot| slot.contains(&shifted)) {
                continue;
            }
            let earlier = chosen
                .as_ref()
                .is_none_or(|(_, best)| shifted.end() < best.end());
            if earlier {
                chosen = Some((shift, shifted));
            }
        }
        Ok(chosen)
    }

    /// Applies a winning simulation for real. A shift the owner's schedule
    /// unexpectedly refuses leaves that break in the pool for a later round.
    fn commit(
        &self,
        reliever: usize,
        sim: &Simulation,
        cashiers: &mut [Cashier],
        pool: &mut Vec<PendingBreak>,
    ) -> Result<CoverageRecord> {
        let reliever_name = cashiers[reliever].name().to_owned();
        let mut covered = Vec::with_capacity(sim.plan.len());
        let mut committed = Vec::with_capacity(sim.plan.len());
        for planned in &sim.plan {
            let pending = pool[planned.pool_index];
            let (ok, moved) = cashiers[pending.owner].schedule_mut().try_move(
                &pending.interval,
                planned.shift,
                true,
            )?;
            if !ok {
                continue;
            }
            cashiers[reliever].schedule_mut().add(moved)?;
            covered.push(BreakAssignment::covered(
                moved,
                cashiers[pending.owner].name(),
                reliever_name.clone(),
            ));
            committed.push(planned.pool_index);
        }

        committed.sort_unstable();
        for index in committed.into_iter().rev() {
            pool.remove(index);
        }

        let total_minutes = covered.iter().map(|b| b.interval.length_minutes()).sum();
        Ok(CoverageRecord {
            tauottaja: Some(reliever_name),
            breaks_covered: covered,
            total_minutes,
        })
    }
}

/// Removes `interval` from whichever free slot contains it.
fn carve(free: &mut Vec<TimeInterval>, interval: &TimeInterval) {
    if let Some(pos) = free.iter().position(|slot| slot.contains(interval)) {
        let parts = free[pos].subtract(interval);
        free.splice(pos..=pos, parts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn cashier_with_breaks(name: &str, shift: TimeInterval, breaks: &[TimeInterval]) -> Cashier {
        let mut cashier = Cashier::new(name, shift);
        for b in breaks {
            cashier.schedule_mut().add(*b).unwrap();
        }
        cashier
    }

    fn tuning(min_coverage_minutes: i64) -> CoverageTuning {
        CoverageTuning {
            min_coverage_minutes,
            ..CoverageTuning::default()
        }
    }

    #[test]
    fn test_one_reliever_covers_two_contiguous_breaks() {
        let shift = iv(9, 0, 17, 0);
        let mut cashiers = vec![
            cashier_with_breaks("Anna", shift, &[iv(11, 0, 11, 15)]),
            cashier_with_breaks("Bertta", shift, &[iv(11, 15, 11, 30)]),
            cashier_with_breaks("Celia", shift, &[iv(15, 0, 15, 15)]),
        ];

        let records = BreakCoverageEngine::new(tuning(30))
            .assign(&mut cashiers)
            .unwrap();

        // Celia absorbs both morning breaks; the earliest-end preference
        // pulls them forward to 10:30 and keeps them back-to-back. Nobody
        // reaches the threshold for Celia's own afternoon break.
        let first = &records[0];
        assert_eq!(first.tauottaja.as_deref(), Some("Celia"));
        assert_eq!(first.total_minutes, 30);
        assert_eq!(
            first
                .breaks_covered
                .iter()
                .map(|b| b.interval)
                .collect::<Vec<_>>(),
            vec![iv(10, 30, 10, 45), iv(10, 45, 11, 0)]
        );
        // Celia's schedule now carries the coverage stints.
        assert_eq!(
            cashiers[2].schedule().events(),
            &[iv(10, 30, 10, 45), iv(10, 45, 11, 0), iv(15, 0, 15, 15)]
        );
        // The leftover break is an uncovered record.
        let uncovered = &records[records.len() - 1];
        assert!(uncovered.tauottaja.is_none());
        assert_eq!(uncovered.breaks_covered[0].cashier, "Celia");
    }

    #[test]
    fn test_overlapping_breaks_get_shifted_apart() {
        let shift = iv(9, 0, 17, 0);
        let mut cashiers = vec![
            cashier_with_breaks("Anna", shift, &[iv(11, 0, 11, 15)]),
            cashier_with_breaks("Bertta", shift, &[iv(11, 0, 11, 15)]),
            cashier_with_breaks("Celia", shift, &[iv(15, 0, 15, 15)]),
        ];

        let records = BreakCoverageEngine::new(tuning(30))
            .assign(&mut cashiers)
            .unwrap();

        let first = &records[0];
        assert_eq!(first.tauottaja.as_deref(), Some("Celia"));
        assert_eq!(first.total_minutes, 30);
        // Anna's break moves to the earliest free slot; Bertta's identical
        // break then lands right behind it.
        assert_eq!(first.breaks_covered[0].interval, iv(10, 30, 10, 45));
        assert_eq!(first.breaks_covered[0].cashier, "Anna");
        assert_eq!(first.breaks_covered[1].interval, iv(10, 45, 11, 0));
        assert_eq!(first.breaks_covered[1].cashier, "Bertta");
        // The committed shifts landed in the owners' own schedules too.
        assert_eq!(cashiers[0].schedule().events(), &[iv(10, 30, 10, 45)]);
        assert_eq!(cashiers[1].schedule().events(), &[iv(10, 45, 11, 0)]);
    }

    #[test]
    fn test_committed_shifts_stay_within_bounds() {
        let shift = iv(8, 0, 16, 0);
        let originals = [iv(10, 0, 10, 15), iv(10, 0, 10, 30), iv(10, 15, 10, 30)];
        let mut cashiers = vec![
            cashier_with_breaks("Anna", shift, &[originals[0]]),
            cashier_with_breaks("Bertta", shift, &[originals[1]]),
            cashier_with_breaks("Celia", shift, &[originals[2]]),
            cashier_with_breaks("Daria", shift, &[iv(14, 0, 14, 15)]),
        ];

        let records = BreakCoverageEngine::new(tuning(30))
            .assign(&mut cashiers)
            .unwrap();

        let daria_break = iv(14, 0, 14, 15);
        for record in &records {
            for covered in &record.breaks_covered {
                let original = originals
                    .iter()
                    .chain([&daria_break])
                    .find(|o| {
                        (covered.interval.start() - o.start()).num_minutes().abs()
                            <= MAX_BREAK_SHIFT_MINUTES
                            && covered.interval.length_minutes() == o.length_minutes()
                    });
                assert!(original.is_some(), "break moved too far: {}", covered.interval);
            }
        }
    }

    #[test]
    fn test_every_break_accounted_for_exactly_once() {
        let mut cashiers = vec![
            Cashier::with_statutory_breaks("Anna", iv(9, 0, 17, 0)).unwrap(),
            Cashier::with_statutory_breaks("Bertta", iv(10, 0, 18, 0)).unwrap(),
            Cashier::with_statutory_breaks("Celia", iv(7, 0, 13, 0)).unwrap(),
        ];
        let seeded: usize = cashiers.iter().map(|c| c.schedule().events().len()).sum();

        let records = BreakCoverageEngine::new(tuning(30))
            .assign(&mut cashiers)
            .unwrap();

        let mut accounted: Vec<(String, TimeInterval)> = records
            .iter()
            .flat_map(|r| r.breaks_covered.iter())
            .map(|b| (b.cashier.clone(), b.interval))
            .collect();
        assert_eq!(accounted.len(), seeded);
        let before = accounted.len();
        accounted.sort();
        accounted.dedup();
        assert_eq!(accounted.len(), before, "a break was reported twice");
    }

    #[test]
    fn test_unreachable_threshold_leaves_all_uncovered() {
        let shift = iv(9, 0, 14, 0);
        let mut cashiers = vec![
            cashier_with_breaks("Anna", shift, &[iv(11, 0, 11, 15)]),
            cashier_with_breaks("Bertta", shift, &[iv(12, 0, 12, 15)]),
        ];

        let records = BreakCoverageEngine::new(tuning(240))
            .assign(&mut cashiers)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.tauottaja.is_none()));
        assert!(records.iter().all(|r| r.breaks_covered.len() == 1));
        assert_eq!(records[0].total_minutes, 15);
        // Schedules were left untouched.
        assert_eq!(cashiers[0].schedule().events(), &[iv(11, 0, 11, 15)]);
        assert_eq!(cashiers[1].schedule().events(), &[iv(12, 0, 12, 15)]);
    }

    #[test]
    fn test_early_bonus_requires_end_before_boundary() {
        // Anna's and Bertta's breaks equal their whole shifts, so they are
        // pinned in place and neither owner can cover anything. Celia can
        // only reach Anna's break (ends exactly at the 10:00 early edge);
        // Daria can only reach Bertta's (ends 09:45). Equal minutes, so the
        // early bonus decides — and a break ending exactly on the boundary
        // must not earn it, despite Celia coming first in cashier order.
        let mut cashiers = vec![
            cashier_with_breaks("Anna", iv(9, 45, 10, 0), &[iv(9, 45, 10, 0)]),
            cashier_with_breaks("Bertta", iv(9, 30, 9, 45), &[iv(9, 30, 9, 45)]),
            cashier_with_breaks("Celia", iv(9, 45, 11, 0), &[iv(10, 30, 10, 45)]),
            cashier_with_breaks("Daria", iv(9, 0, 9, 45), &[iv(9, 0, 9, 15)]),
        ];

        let records = BreakCoverageEngine::new(tuning(15))
            .assign(&mut cashiers)
            .unwrap();

        let first = &records[0];
        assert_eq!(first.tauottaja.as_deref(), Some("Daria"));
        assert_eq!(first.total_minutes, 15);
        assert_eq!(first.breaks_covered[0].cashier, "Bertta");
        assert_eq!(first.breaks_covered[0].interval, iv(9, 30, 9, 45));
    }

    #[test]
    fn test_consecutive_bonus_prefers_back_to_back_plans() {
        let shift = iv(9, 0, 17, 0);
        // Daria and Ella can each cover 30 minutes, but only Daria's plan is
        // back-to-back. Equal minutes, so the consecutive bonus must break
        // the tie toward the contiguous plan regardless of cashier order.
        let mut cashiers = vec![
            cashier_with_breaks("Anna", shift, &[iv(11, 0, 11, 15)]),
            cashier_with_breaks("Bertta", shift, &[iv(11, 15, 11, 30)]),
            // Ella's own break sits on top of Anna's, so her simulation must
            // shift Anna's break and loses contiguity.
            cashier_with_breaks("Ella", shift, &[iv(11, 0, 11, 15)]),
            cashier_with_breaks("Daria", shift, &[iv(15, 0, 15, 15)]),
        ];

        let records = BreakCoverageEngine::new(tuning(30))
            .assign(&mut cashiers)
            .unwrap();
        assert_eq!(records[0].tauottaja.as_deref(), Some("Daria"));
    }
}

//! Checkout allocation engine: slice-by-slice lane staffing.
//!
//! # Algorithm
//!
//! The day is walked in fixed 15-minute slices from the earliest checkout
//! opening to the latest closing. Per slice:
//!
//! 1. Collect available cashiers: on shift and not on a break, or actively
//!    relieving one.
//! 2. Collect open lanes; required = min(available, open).
//! 3. Rank open lanes in priority tiers (lower = higher priority, stable
//!    within a tier):
//!    - 0: mandatory-open lanes;
//!    - 1: lanes whose prior occupant is on a covered break (the tauottaja
//!      keeps the lane open) or whose tauottaja is mid-takeover;
//!    - 2: lanes whose prior occupant is still free and on shift
//!      (continuity);
//!    - 3: tobacco-authorized lanes in fill order;
//!    - 4: remaining lanes in fill order;
//!    - 5: any other open lane.
//! 4. Tiers 0–1 are non-negotiable: more of them than cashiers is an
//!    infeasible plan and aborts the run.
//! 5. Select the top `required` lanes, then repair the tobacco ratio by
//!    swapping the lowest-priority swappable non-tobacco selection for the
//!    best unselected tobacco lane.
//! 6. Assign: extend continuing occupancies in place, hand coverage lanes to
//!    the tauottaja, then fill the rest with free cashiers in list order.
//!
//! Completed occupancies are committed into the checkout's schedule, and
//! into the cashier's schedule when they are ordinary work (a tauottaja's
//! covering stint is already on their schedule as the covered break).

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{PlanConfig, SLICE_MINUTES};
use crate::error::{Error, Result};
use crate::models::{Cashier, Checkout, CheckoutAssignment, CoverageRecord, TimeInterval};

/// All assignments for one lane, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneTimeline {
    pub checkout: String,
    pub assignments: Vec<CheckoutAssignment>,
}

/// Result of a full allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub lanes: Vec<LaneTimeline>,
}

/// What a cashier is doing during one slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SliceStatus {
    OffShift,
    /// Having their own break, covered or not.
    OnBreak,
    /// Covering someone else's break.
    Relieving,
    Free,
}

/// Location of a `BreakAssignment` inside the coverage records.
type BreakLoc = (usize, usize);

/// Who held a lane in the previous slice.
#[derive(Debug, Clone, Copy)]
struct LaneState {
    cashier: usize,
    /// Index into the lane's timeline.
    assignment: usize,
    /// Set while the occupant is a tauottaja covering this break.
    covering: Option<BreakLoc>,
}

/// A lane ranked for the current slice.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    lane: usize,
    tier: u8,
    /// Reliever waiting to take the lane over, with their break's location.
    handover: Option<(usize, BreakLoc)>,
}

/// One cashier's break-related commitments, indexed from coverage records.
#[derive(Debug, Default)]
struct BreakDiary {
    /// Own breaks: interval plus the covering cashier, if any.
    own: Vec<(TimeInterval, Option<usize>, BreakLoc)>,
    /// Breaks this cashier covers for others.
    duties: Vec<(TimeInterval, BreakLoc)>,
}

/// Allocates open checkout lanes to available cashiers slice by slice.
#[derive(Debug, Clone)]
pub struct CheckoutAllocationEngine<'a> {
    config: &'a PlanConfig,
}

impl<'a> CheckoutAllocationEngine<'a> {
    pub fn new(config: &'a PlanConfig) -> Self {
        Self { config }
    }

    /// Runs the allocation across the whole day.
    ///
    /// `coverage` is the break coverage result; covered breaks gain their
    /// `checkout` link when the tauottaja keeps a lane open. Cashier and
    /// checkout schedules receive the finished occupancies.
    pub fn allocate(
        &self,
        cashiers: &mut [Cashier],
        checkouts: &mut [Checkout],
        coverage: &mut [CoverageRecord],
    ) -> Result<AllocationOutcome> {
        let mut timelines: Vec<Vec<CheckoutAssignment>> =
            checkouts.iter().map(|_| Vec::new()).collect();

        let Some(span) = opening_span(checkouts) else {
            return Ok(AllocationOutcome { lanes: Vec::new() });
        };

        let diaries = build_diaries(cashiers, coverage);
        let mut last: Vec<Option<LaneState>> = vec![None; checkouts.len()];

        let mut slice_start = span.start();
        while slice_start < span.end() {
            let slice = TimeInterval::new(slice_start, slice_start + Duration::minutes(SLICE_MINUTES))?;

            let statuses: Vec<SliceStatus> = cashiers
                .iter()
                .enumerate()
                .map(|(i, c)| slice_status(c, &diaries[i], &slice))
                .collect();
            let available: Vec<usize> = statuses
                .iter()
                .enumerate()
                .filter(|(_, s)| matches!(**s, SliceStatus::Relieving | SliceStatus::Free))
                .map(|(i, _)| i)
                .collect();
            let open: Vec<usize> = checkouts
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_open_during(&slice))
                .map(|(i, _)| i)
                .collect();
            let required = available.len().min(open.len());

            let candidates = self.rank_lanes(&open, checkouts, &statuses, &diaries, &last, &slice);

            let mandatory = candidates.iter().filter(|c| c.tier <= 1).count();
            if mandatory > required {
                return Err(Error::InfeasibleStaffing {
                    slice_start,
                    mandatory,
                    available: available.len(),
                });
            }

            let mut selected: Vec<bool> = (0..candidates.len()).map(|i| i < required).collect();
            self.repair_tobacco_ratio(&candidates, &mut selected, checkouts, slice_start)?;
            trace!(
                slice = %slice,
                open = open.len(),
                available = available.len(),
                selected = required,
                "slice ranked"
            );

            let new_last = self.assign_slice(
                &candidates,
                &selected,
                &statuses,
                &available,
                &slice,
                cashiers,
                checkouts,
                coverage,
                &last,
                &mut timelines,
            )?;

            // Occupancies that did not carry over are complete.
            for lane in 0..checkouts.len() {
                if let Some(prev) = last[lane] {
                    let carried = new_last[lane]
                        .is_some_and(|next| next.assignment == prev.assignment);
                    if !carried {
                        finalize(lane, prev, &timelines, cashiers, checkouts)?;
                    }
                }
            }
            last = new_last;
            slice_start += Duration::minutes(SLICE_MINUTES);
        }

        for lane in 0..checkouts.len() {
            if let Some(prev) = last[lane] {
                finalize(lane, prev, &timelines, cashiers, checkouts)?;
            }
        }

        let lanes = checkouts
            .iter()
            .zip(timelines)
            .map(|(checkout, assignments)| LaneTimeline {
                checkout: checkout.id().to_owned(),
                assignments,
            })
            .collect();
        Ok(AllocationOutcome { lanes })
    }

    /// Priority-tiered candidate list for one slice; every open lane appears
    /// exactly once, at its strongest tier.
    fn rank_lanes(
        &self,
        open: &[usize],
        checkouts: &[Checkout],
        statuses: &[SliceStatus],
        diaries: &[BreakDiary],
        last: &[Option<LaneState>],
        slice: &TimeInterval,
    ) -> Vec<Candidate> {
        let lane_of: HashMap<&str, usize> = checkouts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id(), i))
            .collect();
        let is_open = |lane: usize| open.contains(&lane);

        let mut added = vec![false; checkouts.len()];
        let mut candidates = Vec::with_capacity(open.len());
        let push = |candidates: &mut Vec<Candidate>, added: &mut Vec<bool>, lane: usize, tier: u8| {
            if is_open(lane) && !added[lane] {
                added[lane] = true;
                candidates.push(Candidate {
                    lane,
                    tier,
                    handover: lane_handover(last[lane], statuses, diaries, slice),
                });
            }
        };

        // Tier 0: mandatory-open lanes.
        for (lane, checkout) in checkouts.iter().enumerate() {
            if checkout.is_mandatory_open() {
                push(&mut candidates, &mut added, lane, 0);
            }
        }
        // Tier 1: coverage — the prior occupant's tauottaja takes or keeps
        // the lane.
        for lane in 0..checkouts.len() {
            let coverage_lane = match last[lane] {
                Some(prev) => match prev.covering {
                    Some((r, b)) => {
                        // Reliever stays while the covered break runs.
                        diaries
                            .iter()
                            .flat_map(|d| &d.own)
                            .any(|(iv, _, loc)| *loc == (r, b) && iv.overlaps(slice))
                    }
                    None => lane_handover(last[lane], statuses, diaries, slice).is_some(),
                },
                None => false,
            };
            if coverage_lane {
                push(&mut candidates, &mut added, lane, 1);
            }
        }
        // Tier 2: continuity — prior occupant still free.
        for lane in 0..checkouts.len() {
            if let Some(prev) = last[lane] {
                if statuses[prev.cashier] == SliceStatus::Free {
                    push(&mut candidates, &mut added, lane, 2);
                }
            }
        }
        // Tiers 3-4: the configured fill order, tobacco lanes first.
        for id in &self.config.fill_order {
            if let Some(&lane) = lane_of.get(id.as_str()) {
                if checkouts[lane].is_tobacco() {
                    push(&mut candidates, &mut added, lane, 3);
                }
            }
        }
        for id in &self.config.fill_order {
            if let Some(&lane) = lane_of.get(id.as_str()) {
                push(&mut candidates, &mut added, lane, 4);
            }
        }
        // Tier 5: whatever is open and still unranked (self-service and
        // other lanes outside the fill order).
        for lane in 0..checkouts.len() {
            push(&mut candidates, &mut added, lane, 5);
        }
        candidates
    }

    /// Swaps non-tobacco selections for tobacco ones until the ratio table
    /// is satisfied. Mandatory and coverage lanes are never swapped out.
    fn repair_tobacco_ratio(
        &self,
        candidates: &[Candidate],
        selected: &mut [bool],
        checkouts: &[Checkout],
        slice_start: chrono::NaiveDateTime,
    ) -> Result<()> {
        // Bounded to guarantee termination even if a swap grows the pool.
        let limit = 2 * candidates.len();
        for _ in 0..=limit {
            let pool_size = candidates
                .iter()
                .zip(selected.iter())
                .filter(|(c, &sel)| sel && self.config.in_ratio_pool(checkouts[c.lane].id()))
                .count();
            let required = self.config.required_tobacco(pool_size);
            let tobacco_selected = candidates
                .iter()
                .zip(selected.iter())
                .filter(|(c, &sel)| {
                    sel && self.config.in_ratio_pool(checkouts[c.lane].id())
                        && checkouts[c.lane].is_tobacco()
                })
                .count();
            if tobacco_selected >= required {
                return Ok(());
            }

            let swap_out = (0..candidates.len()).rev().find(|&i| {
                selected[i] && candidates[i].tier >= 2 && !checkouts[candidates[i].lane].is_tobacco()
            });
            let swap_in = (0..candidates.len())
                .find(|&i| !selected[i] && checkouts[candidates[i].lane].is_tobacco());
            match (swap_out, swap_in) {
                (Some(out), Some(into)) => {
                    debug!(
                        out = checkouts[candidates[out].lane].id(),
                        into = checkouts[candidates[into].lane].id(),
                        "tobacco ratio swap"
                    );
                    selected[out] = false;
                    selected[into] = true;
                }
                _ => {
                    return Err(Error::InfeasibleRatio {
                        slice_start,
                        pool_size,
                        required,
                        tobacco_selected,
                    });
                }
            }
        }
        let pool_size = candidates
            .iter()
            .zip(selected.iter())
            .filter(|(c, &sel)| sel && self.config.in_ratio_pool(checkouts[c.lane].id()))
            .count();
        Err(Error::InfeasibleRatio {
            slice_start,
            pool_size,
            required: self.config.required_tobacco(pool_size),
            tobacco_selected: 0,
        })
    }

    /// Staffs the selected lanes: continuity extensions first, coverage
    /// handovers second, fresh assignments last.
    #[allow(clippy::too_many_arguments)]
    fn assign_slice(
        &self,
        candidates: &[Candidate],
        selected: &[bool],
        statuses: &[SliceStatus],
        available: &[usize],
        slice: &TimeInterval,
        cashiers: &[Cashier],
        checkouts: &[Checkout],
        coverage: &mut [CoverageRecord],
        last: &[Option<LaneState>],
        timelines: &mut [Vec<CheckoutAssignment>],
    ) -> Result<Vec<Option<LaneState>>> {
        let mut new_last: Vec<Option<LaneState>> = vec![None; checkouts.len()];
        let mut taken = vec![false; cashiers.len()];

        // (a) Prior occupants keep their lanes where they can.
        for (candidate, _) in candidates.iter().zip(selected).filter(|(_, &s)| s) {
            let lane = candidate.lane;
            let Some(prev) = last[lane] else { continue };
            if taken[prev.cashier] {
                continue;
            }
            match prev.covering {
                // Ordinary work continues.
                None if statuses[prev.cashier] == SliceStatus::Free => {
                    timelines[lane][prev.assignment].extend(SLICE_MINUTES)?;
                    taken[prev.cashier] = true;
                    new_last[lane] = Some(prev);
                }
                // The covered break is still running; the tauottaja stays.
                Some(loc) if break_at(coverage, loc).interval.overlaps(slice) => {
                    timelines[lane][prev.assignment].extend(SLICE_MINUTES)?;
                    taken[prev.cashier] = true;
                    new_last[lane] = Some(prev);
                }
                // The break ended but the tauottaja is free: they keep the
                // lane, switching to an ordinary occupancy of their own.
                Some(_) if statuses[prev.cashier] == SliceStatus::Free => {
                    timelines[lane].push(CheckoutAssignment::new(
                        *slice,
                        cashiers[prev.cashier].name(),
                        checkouts[lane].id(),
                    ));
                    taken[prev.cashier] = true;
                    new_last[lane] = Some(LaneState {
                        cashier: prev.cashier,
                        assignment: timelines[lane].len() - 1,
                        covering: None,
                    });
                }
                _ => {}
            }
        }

        // (b) Coverage lanes go to the tauottaja.
        for (candidate, _) in candidates.iter().zip(selected).filter(|(_, &s)| s) {
            let lane = candidate.lane;
            if new_last[lane].is_some() {
                continue;
            }
            let Some((reliever, loc)) = candidate.handover else {
                continue;
            };
            if taken[reliever] || statuses[reliever] != SliceStatus::Relieving {
                continue;
            }
            timelines[lane].push(CheckoutAssignment::new(
                *slice,
                cashiers[reliever].name(),
                checkouts[lane].id(),
            ));
            break_at_mut(coverage, loc).checkout = Some(checkouts[lane].id().to_owned());
            taken[reliever] = true;
            new_last[lane] = Some(LaneState {
                cashier: reliever,
                assignment: timelines[lane].len() - 1,
                covering: Some(loc),
            });
        }

        // (c) Remaining lanes get the remaining cashiers in list order.
        let mut queue = available.iter().filter(|&&c| !taken[c]).copied();
        for (candidate, _) in candidates.iter().zip(selected).filter(|(_, &s)| s) {
            let lane = candidate.lane;
            if new_last[lane].is_some() {
                continue;
            }
            let Some(cashier) = queue.next() else { break };
            // A relieving cashier picking up a lane is still break-linked.
            let covering = (statuses[cashier] == SliceStatus::Relieving)
                .then(|| active_duty(coverage, cashiers[cashier].name(), slice))
                .flatten();
            if let Some(loc) = covering {
                break_at_mut(coverage, loc).checkout = Some(checkouts[lane].id().to_owned());
            }
            timelines[lane].push(CheckoutAssignment::new(
                *slice,
                cashiers[cashier].name(),
                checkouts[lane].id(),
            ));
            new_last[lane] = Some(LaneState {
                cashier,
                assignment: timelines[lane].len() - 1,
                covering,
            });
        }

        Ok(new_last)
    }
}

/// Earliest opening to latest closing across all lanes.
fn opening_span(checkouts: &[Checkout]) -> Option<TimeInterval> {
    let start = checkouts.iter().map(|c| c.opening_window().start()).min()?;
    let end = checkouts.iter().map(|c| c.opening_window().end()).max()?;
    TimeInterval::new(start, end).ok()
}

/// Splits the coverage records into per-cashier diaries.
fn build_diaries(cashiers: &[Cashier], coverage: &[CoverageRecord]) -> Vec<BreakDiary> {
    let index_of: HashMap<&str, usize> = cashiers
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name(), i))
        .collect();

    let mut diaries: Vec<BreakDiary> = cashiers.iter().map(|_| BreakDiary::default()).collect();
    for (r, record) in coverage.iter().enumerate() {
        for (b, brk) in record.breaks_covered.iter().enumerate() {
            let loc = (r, b);
            let reliever = brk
                .tauottaja
                .as_deref()
                .and_then(|name| index_of.get(name).copied());
            if let Some(&owner) = index_of.get(brk.cashier.as_str()) {
                diaries[owner].own.push((brk.interval, reliever, loc));
            }
            if let Some(reliever) = reliever {
                diaries[reliever].duties.push((brk.interval, loc));
            }
        }
    }
    diaries
}

fn slice_status(cashier: &Cashier, diary: &BreakDiary, slice: &TimeInterval) -> SliceStatus {
    if !cashier.shift().contains(slice) {
        return SliceStatus::OffShift;
    }
    if diary.own.iter().any(|(iv, _, _)| iv.overlaps(slice)) {
        return SliceStatus::OnBreak;
    }
    if diary.duties.iter().any(|(iv, _)| iv.overlaps(slice)) {
        return SliceStatus::Relieving;
    }
    SliceStatus::Free
}

/// The tauottaja waiting to take over a lane whose occupant just went on a
/// covered break.
fn lane_handover(
    prev: Option<LaneState>,
    statuses: &[SliceStatus],
    diaries: &[BreakDiary],
    slice: &TimeInterval,
) -> Option<(usize, BreakLoc)> {
    let prev = prev?;
    if prev.covering.is_some() || statuses[prev.cashier] != SliceStatus::OnBreak {
        return None;
    }
    diaries[prev.cashier]
        .own
        .iter()
        .find(|(iv, reliever, _)| iv.overlaps(slice) && reliever.is_some())
        .and_then(|(_, reliever, loc)| reliever.map(|r| (r, *loc)))
}

#[inline]
fn break_at(coverage: &[CoverageRecord], loc: BreakLoc) -> &crate::models::BreakAssignment {
    &coverage[loc.0].breaks_covered[loc.1]
}

#[inline]
fn break_at_mut(
    coverage: &mut [CoverageRecord],
    loc: BreakLoc,
) -> &mut crate::models::BreakAssignment {
    &mut coverage[loc.0].breaks_covered[loc.1]
}

/// Location of the duty a relieving cashier is serving during `slice`.
fn active_duty(
    coverage: &[CoverageRecord],
    reliever: &str,
    slice: &TimeInterval,
) -> Option<BreakLoc> {
    for (r, record) in coverage.iter().enumerate() {
        if record.tauottaja.as_deref() != Some(reliever) {
            continue;
        }
        for (b, brk) in record.breaks_covered.iter().enumerate() {
            if brk.interval.overlaps(slice) {
                return Some((r, b));
            }
        }
    }
    None
}

/// Commits a finished occupancy into the entity schedules.
fn finalize(
    lane: usize,
    state: LaneState,
    timelines: &[Vec<CheckoutAssignment>],
    cashiers: &mut [Cashier],
    checkouts: &mut [Checkout],
) -> Result<()> {
    let assignment = &timelines[lane][state.assignment];
    checkouts[lane].schedule_mut().add(assignment.interval)?;
    // A covering stint already sits on the tauottaja's schedule as the
    // covered break itself.
    if state.covering.is_none() {
        cashiers[state.cashier].schedule_mut().add(assignment.interval)?;
    }
    Ok(())
}

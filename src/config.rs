//! Planner configuration.
//!
//! All tunable behavior lives here: the checkout fill order, the tobacco
//! ratio pool and table, and the coverage-engine scoring knobs that were
//! magic numbers in earlier revisions of the planner. Everything is
//! serde-deserializable so a loader can read it straight from a config file;
//! every field has a sensible default.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Minutes per allocation slice. The whole planner runs on this grid.
pub const SLICE_MINUTES: i64 = 15;

/// The furthest a break may be pushed in either direction, in minutes.
/// Probed in [`SLICE_MINUTES`] steps: -30, -15, 0, +15, +30.
pub const MAX_BREAK_SHIFT_MINUTES: i64 = 30;

/// One row of the tobacco ratio table: with up to `max_open` pool lanes
/// open, at least `required_tobacco` of them must be tobacco-authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioBand {
    pub max_open: usize,
    pub required_tobacco: usize,
}

/// Scoring knobs for the break coverage engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageTuning {
    /// Bonus when a break starts exactly where the candidate's previous
    /// covered break ends (back-to-back relieving keeps one lane manned).
    pub consecutive_bonus: i64,
    /// Bonus for breaks ending before `early_end`.
    pub early_bonus: i64,
    /// Bonus for breaks starting after `late_start`.
    pub late_bonus: i64,
    /// Boundary for the early-break bonus.
    pub early_end: NaiveTime,
    /// Boundary for the late-break bonus.
    pub late_start: NaiveTime,
    /// A candidate must absorb at least this many break minutes to be
    /// worth dedicating as a tauottaja.
    pub min_coverage_minutes: i64,
}

impl Default for CoverageTuning {
    fn default() -> Self {
        Self {
            consecutive_bonus: 10,
            early_bonus: 5,
            late_bonus: 5,
            early_end: NaiveTime::from_hms_opt(10, 0, 0).expect("valid literal"),
            late_start: NaiveTime::from_hms_opt(19, 0, 0).expect("valid literal"),
            min_coverage_minutes: 30,
        }
    }
}

/// Full planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Priority order for opening standard lanes; each standard checkout id
    /// appears exactly once.
    pub fill_order: Vec<String>,
    /// Checkout ids counted when evaluating the tobacco ratio.
    pub ratio_pool: Vec<String>,
    /// Ascending `max_open -> required_tobacco` bands.
    pub ratio_table: Vec<RatioBand>,
    /// Coverage engine scoring.
    pub coverage: CoverageTuning,
}

impl PlanConfig {
    /// Required tobacco lanes for `pool_size` open pool lanes: the smallest
    /// qualifying band, saturating at the largest when the pool outgrows the
    /// table. An empty selection requires nothing.
    pub fn required_tobacco(&self, pool_size: usize) -> usize {
        if pool_size == 0 {
            return 0;
        }
        self.ratio_table
            .iter()
            .find(|band| pool_size <= band.max_open)
            .or_else(|| self.ratio_table.last())
            .map(|band| band.required_tobacco)
            .unwrap_or(0)
    }

    /// Position of a checkout in the fill order, if it is a standard lane.
    pub fn fill_position(&self, checkout_id: &str) -> Option<usize> {
        self.fill_order.iter().position(|id| id == checkout_id)
    }

    /// Whether a checkout counts toward the tobacco ratio.
    pub fn in_ratio_pool(&self, checkout_id: &str) -> bool {
        self.ratio_pool.iter().any(|id| id == checkout_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_table(bands: &[(usize, usize)]) -> PlanConfig {
        PlanConfig {
            ratio_table: bands
                .iter()
                .map(|&(max_open, required_tobacco)| RatioBand {
                    max_open,
                    required_tobacco,
                })
                .collect(),
            ..PlanConfig::default()
        }
    }

    #[test]
    fn test_required_tobacco_lookup() {
        let cfg = config_with_table(&[(3, 1), (6, 2), (10, 3)]);
        assert_eq!(cfg.required_tobacco(0), 0);
        assert_eq!(cfg.required_tobacco(1), 1);
        assert_eq!(cfg.required_tobacco(3), 1);
        assert_eq!(cfg.required_tobacco(4), 2);
        assert_eq!(cfg.required_tobacco(10), 3);
        // Beyond the table: the largest band's requirement applies.
        assert_eq!(cfg.required_tobacco(25), 3);
    }

    #[test]
    fn test_required_tobacco_empty_table() {
        let cfg = config_with_table(&[]);
        assert_eq!(cfg.required_tobacco(5), 0);
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let cfg: PlanConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, PlanConfig::default());
        assert_eq!(cfg.coverage.min_coverage_minutes, 30);

        let cfg: PlanConfig = serde_json::from_str(
            r#"{
                "fill_order": ["1", "2", "3"],
                "ratio_pool": ["1", "2"],
                "ratio_table": [{ "max_open": 3, "required_tobacco": 1 }],
                "coverage": { "min_coverage_minutes": 45 }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.fill_position("2"), Some(1));
        assert!(cfg.in_ratio_pool("1"));
        assert!(!cfg.in_ratio_pool("3"));
        assert_eq!(cfg.coverage.min_coverage_minutes, 45);
        // Unspecified tuning fields keep their defaults.
        assert_eq!(cfg.coverage.consecutive_bonus, 10);
    }
}

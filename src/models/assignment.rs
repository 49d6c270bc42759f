//! Assignment records produced by the engines.
//!
//! A cashier is always a [`Cashier`](crate::models::Cashier); relieving is a
//! role played in one particular assignment. `BreakAssignment` therefore
//! carries the break owner and the optional tauottaja as separate references
//! by name instead of changing anyone's type.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::TimeInterval;

/// One cashier's break, possibly covered by a tauottaja.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakAssignment {
    /// The break span, after any committed shift.
    pub interval: TimeInterval,
    /// Break owner.
    pub cashier: String,
    /// Reliever covering the break; `None` for an uncovered break.
    pub tauottaja: Option<String>,
    /// Checkout lane the tauottaja keeps open during the break, if any.
    pub checkout: Option<String>,
}

impl BreakAssignment {
    /// An uncovered break for `cashier`.
    pub fn uncovered(interval: TimeInterval, cashier: impl Into<String>) -> Self {
        Self {
            interval,
            cashier: cashier.into(),
            tauottaja: None,
            checkout: None,
        }
    }

    /// A break covered by `tauottaja`.
    pub fn covered(
        interval: TimeInterval,
        cashier: impl Into<String>,
        tauottaja: impl Into<String>,
    ) -> Self {
        Self {
            interval,
            cashier: cashier.into(),
            tauottaja: Some(tauottaja.into()),
            checkout: None,
        }
    }
}

/// A cashier manning a checkout lane for a span of slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutAssignment {
    pub interval: TimeInterval,
    pub cashier: String,
    pub checkout: String,
}

impl CheckoutAssignment {
    /// Creates an assignment covering `interval`.
    pub fn new(
        interval: TimeInterval,
        cashier: impl Into<String>,
        checkout: impl Into<String>,
    ) -> Self {
        Self {
            interval,
            cashier: cashier.into(),
            checkout: checkout.into(),
        }
    }

    /// Lengthens the assignment in place — the continuity path when the same
    /// cashier keeps the lane across consecutive slices.
    pub fn extend(&mut self, minutes: i64) -> Result<()> {
        self.interval = self.interval.extended_by(minutes)?;
        Ok(())
    }
}

/// One reliever's workload (or one uncovered break) in selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    /// The reliever, or `None` when the breaks simply go uncovered.
    pub tauottaja: Option<String>,
    /// Breaks this record accounts for.
    pub breaks_covered: Vec<BreakAssignment>,
    /// Total covered minutes across `breaks_covered`.
    pub total_minutes: i64,
}

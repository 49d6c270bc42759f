//! Input validation for a planning run.
//!
//! Checks structural integrity of the roster, the lanes, and the
//! configuration before any engine runs. Detects:
//! - Duplicate cashier names and checkout ids
//! - Fill order entries that repeat or reference unknown checkouts
//! - Ratio pool entries that reference unknown checkouts
//! - Ratio tables that are not strictly ascending

use std::collections::HashSet;

use crate::config::PlanConfig;
use crate::models::{Cashier, Checkout};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two cashiers share a name, or two checkouts share an id.
    DuplicateId,
    /// The fill order repeats a checkout or names one that doesn't exist.
    InvalidFillOrder,
    /// The ratio pool names a checkout that doesn't exist.
    InvalidRatioPoolEntry,
    /// The ratio table bands are not strictly ascending.
    MalformedRatioTable,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the inputs of a planning run.
///
/// Checks:
/// 1. No duplicate cashier names
/// 2. No duplicate checkout ids
/// 3. Fill order references existing checkouts, each at most once
/// 4. Ratio pool references existing checkouts
/// 5. Ratio table bands strictly ascending in `max_open`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    cashiers: &[Cashier],
    checkouts: &[Checkout],
    config: &PlanConfig,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    for cashier in cashiers {
        if !names.insert(cashier.name()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate cashier name: {}", cashier.name()),
            ));
        }
    }

    let mut ids = HashSet::new();
    for checkout in checkouts {
        if !ids.insert(checkout.id()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate checkout id: {}", checkout.id()),
            ));
        }
    }

    let mut seen_in_order = HashSet::new();
    for id in &config.fill_order {
        if !ids.contains(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFillOrder,
                format!("Fill order references unknown checkout '{id}'"),
            ));
        }
        if !seen_in_order.insert(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidFillOrder,
                format!("Fill order lists checkout '{id}' more than once"),
            ));
        }
    }

    for id in &config.ratio_pool {
        if !ids.contains(id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidRatioPoolEntry,
                format!("Ratio pool references unknown checkout '{id}'"),
            ));
        }
    }

    for pair in config.ratio_table.windows(2) {
        if pair[1].max_open <= pair[0].max_open {
            errors.push(ValidationError::new(
                ValidationErrorKind::MalformedRatioTable,
                format!(
                    "Ratio table bands must be strictly ascending: {} after {}",
                    pair[1].max_open, pair[0].max_open
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

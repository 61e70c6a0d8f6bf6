//! Error types for billing operations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by invoice totals computation and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Invoice has no line items.
    #[error("invoice must have at least one line item")]
    EmptyItems,

    /// Line item description is empty.
    #[error("line item {index} has an empty description")]
    EmptyDescription {
        /// Zero-based index of the offending item.
        index: usize,
    },

    /// Line item quantity is zero or negative.
    #[error("line item {index} has non-positive quantity {quantity}")]
    InvalidQuantity {
        /// Zero-based index of the offending item.
        index: usize,
        /// The rejected quantity.
        quantity: Decimal,
    },

    /// Line item rate is negative.
    #[error("line item {index} has negative rate {rate}")]
    InvalidRate {
        /// Zero-based index of the offending item.
        index: usize,
        /// The rejected rate.
        rate: Decimal,
    },

    /// Tax rate is outside 0..=100.
    #[error("tax rate {0} must be between 0 and 100")]
    InvalidTaxRate(Decimal),

    /// Caller-supplied totals disagree with the server-side computation.
    #[error("supplied {field} {supplied} does not match computed {computed}")]
    TotalsMismatch {
        /// Which totals field disagreed.
        field: &'static str,
        /// The caller's value.
        supplied: Decimal,
        /// The computed value.
        computed: Decimal,
    },
}

//! Server-side computation of line item amounts and invoice totals.
//!
//! Amounts are always recomputed here rather than trusted from the caller;
//! a caller that also supplies totals gets them checked against the
//! computation and rejected on mismatch.

use rust_decimal::Decimal;

use super::error::BillingError;
use super::types::{ComputedLineItem, InvoiceTotals, LineItemInput};

/// Validates line items and computes each item's amount (quantity × rate,
/// rounded to 2 decimal places).
///
/// # Errors
///
/// Returns an error if the list is empty, a description is blank, a
/// quantity is non-positive, or a rate is negative.
pub fn compute_line_items(items: &[LineItemInput]) -> Result<Vec<ComputedLineItem>, BillingError> {
    if items.is_empty() {
        return Err(BillingError::EmptyItems);
    }

    let mut computed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(BillingError::EmptyDescription { index });
        }
        if item.quantity <= Decimal::ZERO {
            return Err(BillingError::InvalidQuantity {
                index,
                quantity: item.quantity,
            });
        }
        if item.rate < Decimal::ZERO {
            return Err(BillingError::InvalidRate {
                index,
                rate: item.rate,
            });
        }

        computed.push(ComputedLineItem {
            description: item.description.clone(),
            quantity: item.quantity,
            rate: item.rate,
            amount: (item.quantity * item.rate).round_dp(2),
        });
    }

    Ok(computed)
}

/// Computes invoice totals from computed line items and a percentage tax rate.
///
/// `tax_amount = (subtotal × tax_rate / 100).round_dp(2)`, `total = subtotal + tax_amount`.
///
/// # Errors
///
/// Returns `BillingError::InvalidTaxRate` if the rate is outside 0..=100.
pub fn compute_totals(
    items: &[ComputedLineItem],
    tax_rate: Decimal,
) -> Result<InvoiceTotals, BillingError> {
    if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE_HUNDRED {
        return Err(BillingError::InvalidTaxRate(tax_rate));
    }

    let subtotal: Decimal = items.iter().map(|i| i.amount).sum();
    let tax_amount = (subtotal * tax_rate / Decimal::ONE_HUNDRED).round_dp(2);

    Ok(InvoiceTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    })
}

/// Checks any caller-supplied totals against the computed ones.
///
/// Fields the caller did not supply are not checked.
///
/// # Errors
///
/// Returns `BillingError::TotalsMismatch` naming the first field that
/// disagrees.
pub fn verify_supplied_totals(
    computed: &InvoiceTotals,
    subtotal: Option<Decimal>,
    tax_amount: Option<Decimal>,
    total: Option<Decimal>,
) -> Result<(), BillingError> {
    if let Some(supplied) = subtotal
        && supplied != computed.subtotal
    {
        return Err(BillingError::TotalsMismatch {
            field: "subtotal",
            supplied,
            computed: computed.subtotal,
        });
    }
    if let Some(supplied) = tax_amount
        && supplied != computed.tax_amount
    {
        return Err(BillingError::TotalsMismatch {
            field: "tax_amount",
            supplied,
            computed: computed.tax_amount,
        });
    }
    if let Some(supplied) = total
        && supplied != computed.total
    {
        return Err(BillingError::TotalsMismatch {
            field: "total",
            supplied,
            computed: computed.total,
        });
    }
    Ok(())
}

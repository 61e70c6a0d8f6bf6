//! Payment-driven status reconciliation and due-amount aggregation.
//!
//! Reconciliation always re-evaluates from the full payment set rather than
//! keeping an incremental balance, so replaying the same payments reaches
//! the same status.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use faktura_shared::types::InvoiceId;

use super::types::{InvoiceStatus, InvoiceSummary};

/// Returns true once cumulative payments cover the invoice total.
#[must_use]
pub fn is_paid_in_full(total: Decimal, paid: Decimal) -> bool {
    paid >= total
}

/// Re-evaluates an invoice's status from its total and cumulative payments.
///
/// Covers-the-total moves any status to `Paid`; otherwise the current
/// status is kept unchanged.
#[must_use]
pub fn reconcile_status(current: InvoiceStatus, total: Decimal, paid: Decimal) -> InvoiceStatus {
    if is_paid_in_full(total, paid) {
        InvoiceStatus::Paid
    } else {
        current
    }
}

/// Remaining balance on an invoice, clamped at zero for overpayments.
#[must_use]
pub fn outstanding_balance(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

/// Whether an invoice counts as overdue at read time.
///
/// Overdue is never stored: an invoice is overdue iff it is still `Sent`
/// and its due date has passed.
#[must_use]
pub fn is_overdue(status: InvoiceStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == InvoiceStatus::Sent && due_date < today
}

/// Aggregated due-amount figures for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueSummary {
    /// Sum of positive outstanding balances over `sent` invoices.
    pub due_amount: Decimal,
    /// Number of `sent` invoices with a positive outstanding balance.
    pub due_count: u64,
}

/// Aggregates the due amount and count over a company's invoices.
///
/// Only invoices with stored status `Sent` participate; an invoice whose
/// payments already cover its total contributes nothing even if its status
/// was never reconciled to `Paid`.
#[must_use]
pub fn aggregate_due(
    invoices: &[InvoiceSummary],
    paid_by_invoice: &HashMap<InvoiceId, Decimal>,
) -> DueSummary {
    let mut due_amount = Decimal::ZERO;
    let mut due_count = 0;

    for invoice in invoices {
        if invoice.status != InvoiceStatus::Sent {
            continue;
        }
        let paid = paid_by_invoice
            .get(&invoice.id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        let outstanding = outstanding_balance(invoice.total, paid);
        if outstanding > Decimal::ZERO {
            due_amount += outstanding;
            due_count += 1;
        }
    }

    DueSummary {
        due_amount,
        due_count,
    }
}

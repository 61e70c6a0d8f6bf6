//! Invoice billing logic: totals, numbering, and payment reconciliation.
//!
//! Everything in this module is pure: the database layer feeds it rows and
//! persists what it returns.

pub mod error;
pub mod numbering;
pub mod reconcile;
pub mod totals;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BillingError;
pub use numbering::{format_invoice_number, next_invoice_number, parse_invoice_number};
pub use reconcile::{
    DueSummary, aggregate_due, is_overdue, is_paid_in_full, outstanding_balance, reconcile_status,
};
pub use totals::{compute_line_items, compute_totals, verify_supplied_totals};
pub use types::{ComputedLineItem, InvoiceStatus, InvoiceSummary, InvoiceTotals, LineItemInput};

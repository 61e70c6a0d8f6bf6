//! Domain types for invoice billing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use faktura_shared::types::InvoiceId;

/// Invoice lifecycle status.
///
/// `Overdue` exists only for legacy stored rows; the core logic never writes
/// it. Whether an invoice is overdue is derived at read time from the due
/// date (see [`crate::billing::reconcile::is_overdue`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Invoice drafted but not issued.
    Draft,
    /// Invoice issued to the client.
    Sent,
    /// Invoice settled in full by payments.
    Paid,
    /// Legacy stored status; derived at read time in current logic.
    Overdue,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::Paid => write!(f, "paid"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!("Unknown invoice status: {s}")),
        }
    }
}

/// A line item as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    /// What the line bills for.
    pub description: String,
    /// Quantity billed.
    pub quantity: Decimal,
    /// Unit rate.
    pub rate: Decimal,
}

/// A line item with its server-computed amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLineItem {
    /// What the line bills for.
    pub description: String,
    /// Quantity billed.
    pub quantity: Decimal,
    /// Unit rate.
    pub rate: Decimal,
    /// quantity × rate, rounded to 2 decimal places.
    pub amount: Decimal,
}

/// Monetary totals of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceTotals {
    /// Sum of line item amounts.
    pub subtotal: Decimal,
    /// subtotal × tax rate, rounded to 2 decimal places.
    pub tax_amount: Decimal,
    /// subtotal + tax amount.
    pub total: Decimal,
}

/// The slice of an invoice the due-amount aggregation needs.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceSummary {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Stored status.
    pub status: InvoiceStatus,
    /// Invoice total.
    pub total: Decimal,
}

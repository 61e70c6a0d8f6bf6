//! Dashboard repository: derived statistics over invoices and payments.
//!
//! Everything here is recomputed from source rows on every call. There is
//! no cached aggregate, which bounds staleness at zero for the row counts
//! a tenant realistically has.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use faktura_core::billing::{InvoiceSummary, aggregate_due};
use faktura_shared::types::{Currency, InvoiceId, Money};

use crate::entities::{clients, invoices, payments, settings};

/// Error types for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One row of the recent-transactions feed.
#[derive(Debug, Clone, Serialize)]
pub struct RecentTransaction {
    /// Payment ID.
    pub payment_id: Uuid,
    /// Payment amount.
    pub amount: Decimal,
    /// When the payment was made.
    pub payment_date: chrono::DateTime<chrono::FixedOffset>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// The paid invoice.
    pub invoice_id: Uuid,
    /// The paid invoice's number.
    pub invoice_number: String,
    /// The billed client's name.
    pub client_name: String,
}

/// Dashboard statistics for a company.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Sum of all payments on the company's invoices.
    pub total_income: Money,
    /// Sum of positive outstanding balances over `sent` invoices.
    pub due_amount: Money,
    /// Number of `sent` invoices with a positive outstanding balance.
    pub due_count: u64,
    /// The 10 most recent payments with invoice and client context.
    pub recent_transactions: Vec<RecentTransaction>,
}

/// How many payments the recent-transactions feed shows.
const RECENT_LIMIT: usize = 10;

/// Maps invoice rows to the summaries the due aggregation consumes.
fn to_summaries(rows: &[invoices::Model]) -> Vec<InvoiceSummary> {
    rows.iter()
        .map(|i| InvoiceSummary {
            id: InvoiceId::from_uuid(i.id),
            status: i.status.into(),
            total: i.total,
        })
        .collect()
}

/// Sums payments per invoice.
fn paid_by_invoice(rows: &[payments::Model]) -> HashMap<InvoiceId, Decimal> {
    let mut sums: HashMap<InvoiceId, Decimal> = HashMap::new();
    for p in rows {
        *sums
            .entry(InvoiceId::from_uuid(p.invoice_id))
            .or_insert(Decimal::ZERO) += p.amount;
    }
    sums
}

/// Builds the recent-transactions feed from prefetched rows.
fn build_recent(
    rows: &[payments::Model],
    invoice_by_id: &HashMap<Uuid, invoices::Model>,
    client_name_by_id: &HashMap<Uuid, String>,
    limit: usize,
) -> Vec<RecentTransaction> {
    let mut sorted: Vec<&payments::Model> = rows.iter().collect();
    sorted.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));

    sorted
        .into_iter()
        .take(limit)
        .filter_map(|p| {
            let invoice = invoice_by_id.get(&p.invoice_id)?;
            let client_name = client_name_by_id
                .get(&invoice.client_id)
                .cloned()
                .unwrap_or_else(|| "Unknown client".to_string());

            Some(RecentTransaction {
                payment_id: p.id,
                amount: p.amount,
                payment_date: p.payment_date,
                notes: p.notes.clone(),
                invoice_id: invoice.id,
                invoice_number: invoice.number.clone(),
                client_name,
            })
        })
        .collect()
}

/// Dashboard repository for statistics queries.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes dashboard statistics for a company from source rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn dashboard_stats(&self, company_id: Uuid) -> Result<DashboardStats, DashboardError> {
        // Display currency comes from the settings row when one exists
        let currency = settings::Entity::find()
            .filter(settings::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .and_then(|s| s.currency.parse::<Currency>().ok())
            .unwrap_or_default();

        let invoice_rows = invoices::Entity::find()
            .filter(invoices::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;

        if invoice_rows.is_empty() {
            return Ok(DashboardStats {
                total_income: Money::zero(currency),
                due_amount: Money::zero(currency),
                due_count: 0,
                recent_transactions: vec![],
            });
        }

        let invoice_ids: Vec<Uuid> = invoice_rows.iter().map(|i| i.id).collect();
        let payment_rows = payments::Entity::find()
            .filter(payments::Column::InvoiceId.is_in(invoice_ids))
            .all(&self.db)
            .await?;

        let client_rows = clients::Entity::find()
            .filter(clients::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;

        let total_income: Decimal = payment_rows.iter().map(|p| p.amount).sum();

        let due = aggregate_due(&to_summaries(&invoice_rows), &paid_by_invoice(&payment_rows));

        let invoice_by_id: HashMap<Uuid, invoices::Model> =
            invoice_rows.into_iter().map(|i| (i.id, i)).collect();
        let client_name_by_id: HashMap<Uuid, String> =
            client_rows.into_iter().map(|c| (c.id, c.name)).collect();

        let recent_transactions = build_recent(
            &payment_rows,
            &invoice_by_id,
            &client_name_by_id,
            RECENT_LIMIT,
        );

        Ok(DashboardStats {
            total_income: Money::new(total_income, currency),
            due_amount: Money::new(due.due_amount, currency),
            due_count: due.due_count,
            recent_transactions,
        })
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod dashboard_tests;

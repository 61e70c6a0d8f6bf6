//! Payment repository: records payments and reconciles invoice status.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_core::billing::reconcile_status;

use crate::entities::{invoices, payments};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Invoice not found in the acting company.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Payment amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording a payment against an invoice.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// The invoice being paid.
    pub invoice_id: Uuid,
    /// Payment amount.
    pub amount: Decimal,
    /// When the payment was made; defaults to now.
    pub payment_date: Option<chrono::DateTime<chrono::Utc>>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment and re-evaluates the invoice's paid status.
    ///
    /// The insert and the status update happen in one transaction. The
    /// status decision always re-sums the full payment set rather than
    /// keeping a running balance, so replaying the same payments converges
    /// on the same status.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvoiceNotFound` for absent or cross-tenant
    /// invoices and `PaymentError::InvalidAmount` for non-positive amounts.
    pub async fn record_payment(
        &self,
        company_id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<(payments::Model, invoices::Model), PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(input.amount));
        }

        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(input.invoice_id)
            .filter(invoices::Column::CompanyId.eq(company_id))
            .one(&txn)
            .await?
            .ok_or(PaymentError::InvoiceNotFound(input.invoice_id))?;

        let now = chrono::Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice.id),
            amount: Set(input.amount),
            payment_date: Set(input.payment_date.unwrap_or(now).into()),
            notes: Set(input.notes),
            created_at: Set(now.into()),
        };
        let payment = payment.insert(&txn).await?;

        // Full re-evaluation over every payment, including the one just
        // inserted
        let all_payments = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice.id))
            .all(&txn)
            .await?;
        let paid: Decimal = all_payments.iter().map(|p| p.amount).sum();

        let new_status = reconcile_status(invoice.status.into(), invoice.total, paid);

        let invoice = if new_status == invoice.status.into() {
            invoice
        } else {
            let mut active: invoices::ActiveModel = invoice.into();
            active.status = Set(new_status.into());
            active.updated_at = Set(now.into());
            active.update(&txn).await?
        };

        txn.commit().await?;

        Ok((payment, invoice))
    }

    /// Lists an invoice's payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvoiceNotFound` for absent or cross-tenant
    /// invoices.
    pub async fn list_for_invoice(
        &self,
        company_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Vec<payments::Model>, PaymentError> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .filter(invoices::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;
        if invoice.is_none() {
            return Err(PaymentError::InvoiceNotFound(invoice_id));
        }

        let list = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(payments::Column::PaymentDate)
            .all(&self.db)
            .await?;
        Ok(list)
    }

    /// Lists a company's most recent payments with their invoices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recent(
        &self,
        company_id: Uuid,
        limit: u64,
    ) -> Result<Vec<(payments::Model, invoices::Model)>, PaymentError> {
        let rows = payments::Entity::find()
            .find_also_related(invoices::Entity)
            .filter(invoices::Column::CompanyId.eq(company_id))
            .order_by_desc(payments::Column::PaymentDate)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(payment, invoice)| invoice.map(|i| (payment, i)))
            .collect())
    }
}

//! Invoice repository: creation with items, lifecycle updates, numbering,
//! and cascade deletion.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use faktura_core::billing::{
    self, BillingError, LineItemInput, next_invoice_number,
};
use faktura_shared::types::PageRequest;

use crate::entities::{
    clients, invoice_items, invoices, payments, sea_orm_active_enums::InvoiceStatus, settings,
};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found in the acting company.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Referenced client not found in the acting company.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Invoice number already used within the company.
    #[error("Invoice number '{0}' already exists")]
    DuplicateNumber(String),

    /// Line item or totals validation failed.
    #[error(transparent)]
    Validation(#[from] BillingError),

    /// Update contained no fields.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice with its line items.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Owning company.
    pub company_id: Uuid,
    /// Billed client (must belong to the same company).
    pub client_id: Uuid,
    /// Explicit invoice number; derived from the company sequence if absent.
    pub number: Option<String>,
    /// Percentage tax rate.
    pub tax_rate: Decimal,
    /// Payment due date.
    pub due_date: chrono::NaiveDate,
    /// Line items; amounts are recomputed server-side.
    pub items: Vec<LineItemInput>,
    /// Caller-supplied subtotal, checked against the computation if present.
    pub subtotal: Option<Decimal>,
    /// Caller-supplied tax amount, checked against the computation if present.
    pub tax_amount: Option<Decimal>,
    /// Caller-supplied total, checked against the computation if present.
    pub total: Option<Decimal>,
}

/// Input for updating an invoice (merge-patch).
///
/// No transition validation is applied to `status`: the product has always
/// allowed arbitrary status edits here, including moving a paid invoice
/// back to draft.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// Invoice number.
    pub number: Option<String>,
    /// Billed client.
    pub client_id: Option<Uuid>,
    /// Stored status.
    pub status: Option<InvoiceStatus>,
    /// Subtotal.
    pub subtotal: Option<Decimal>,
    /// Percentage tax rate.
    pub tax_rate: Option<Decimal>,
    /// Tax amount.
    pub tax_amount: Option<Decimal>,
    /// Total.
    pub total: Option<Decimal>,
    /// Payment due date.
    pub due_date: Option<chrono::NaiveDate>,
}

impl UpdateInvoiceInput {
    fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.client_id.is_none()
            && self.status.is_none()
            && self.subtotal.is_none()
            && self.tax_rate.is_none()
            && self.tax_amount.is_none()
            && self.total.is_none()
            && self.due_date.is_none()
    }
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by stored status.
    pub status: Option<InvoiceStatus>,
    /// Filter by client.
    pub client_id: Option<Uuid>,
}

/// The complete bundle an external document renderer needs.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    /// The invoice row.
    pub invoice: invoices::Model,
    /// Its line items.
    pub items: Vec<invoice_items::Model>,
    /// The billed client.
    pub client: clients::Model,
    /// The issuing company's settings (branding, currency).
    pub settings: settings::Model,
}

/// Derives the next invoice number from the company's existing numbers.
async fn derive_next_number<C: ConnectionTrait>(
    conn: &C,
    company_id: Uuid,
) -> Result<String, DbErr> {
    let numbers: Vec<String> = invoices::Entity::find()
        .filter(invoices::Column::CompanyId.eq(company_id))
        .select_only()
        .column(invoices::Column::Number)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(next_invoice_number(numbers.iter().map(String::as_str)))
}

/// Invoice repository for CRUD and lifecycle operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the next invoice number for a company without reserving it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn next_number(&self, company_id: Uuid) -> Result<String, InvoiceError> {
        let number = derive_next_number(&self.db, company_id).await?;
        Ok(number)
    }

    /// Creates an invoice together with its line items in one transaction.
    ///
    /// Item amounts and invoice totals are recomputed server-side; any
    /// caller-supplied totals must match. New invoices are stored as `sent`
    /// so they immediately count toward due-amount totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is absent from the acting company,
    /// validation fails, or the number is already taken.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<(invoices::Model, Vec<invoice_items::Model>), InvoiceError> {
        let computed_items = billing::compute_line_items(&input.items)?;
        let totals = billing::compute_totals(&computed_items, input.tax_rate)?;
        billing::verify_supplied_totals(&totals, input.subtotal, input.tax_amount, input.total)?;

        let txn = self.db.begin().await?;

        // Client must belong to the acting company
        let client = clients::Entity::find_by_id(input.client_id)
            .filter(clients::Column::CompanyId.eq(input.company_id))
            .one(&txn)
            .await?;
        if client.is_none() {
            return Err(InvoiceError::ClientNotFound(input.client_id));
        }

        let number = match input.number {
            Some(number) => {
                let taken = invoices::Entity::find()
                    .filter(invoices::Column::CompanyId.eq(input.company_id))
                    .filter(invoices::Column::Number.eq(&number))
                    .one(&txn)
                    .await?
                    .is_some();
                if taken {
                    return Err(InvoiceError::DuplicateNumber(number));
                }
                number
            }
            None => derive_next_number(&txn, input.company_id).await?,
        };

        let now = chrono::Utc::now().into();
        let invoice_id = Uuid::new_v4();

        let invoice = invoices::ActiveModel {
            id: Set(invoice_id),
            company_id: Set(input.company_id),
            client_id: Set(input.client_id),
            number: Set(number.clone()),
            // Issued immediately: new invoices count toward due totals
            status: Set(InvoiceStatus::Sent),
            subtotal: Set(totals.subtotal),
            tax_rate: Set(input.tax_rate),
            tax_amount: Set(totals.tax_amount),
            total: Set(totals.total),
            due_date: Set(input.due_date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let invoice = match invoice.insert(&txn).await {
            Ok(invoice) => invoice,
            // The (company_id, number) constraint backstops concurrent
            // creation racing past the pre-check
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(InvoiceError::DuplicateNumber(number));
            }
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::with_capacity(computed_items.len());
        for item in computed_items {
            let row = invoice_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_id: Set(invoice_id),
                description: Set(item.description),
                quantity: Set(item.quantity),
                rate: Set(item.rate),
                amount: Set(item.amount),
                created_at: Set(now),
            };
            items.push(row.insert(&txn).await?);
        }

        txn.commit().await?;

        Ok((invoice, items))
    }

    /// Finds an invoice by ID within the acting company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_invoice(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<invoices::Model>, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .filter(invoices::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;
        Ok(invoice)
    }

    /// Finds an invoice with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_with_items(
        &self,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<(invoices::Model, Vec<invoice_items::Model>)>, InvoiceError> {
        let Some(invoice) = self.find_invoice(company_id, id).await? else {
            return Ok(None);
        };

        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
            .order_by_asc(invoice_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(Some((invoice, items)))
    }

    /// Lists a company's invoices, newest first.
    ///
    /// The company filter is unconditional.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        company_id: Uuid,
        filter: InvoiceFilter,
        page: &PageRequest,
    ) -> Result<(Vec<invoices::Model>, u64), InvoiceError> {
        let mut query = invoices::Entity::find().filter(invoices::Column::CompanyId.eq(company_id));

        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(status));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(invoices::Column::ClientId.eq(client_id));
        }

        let total = query.clone().count(&self.db).await?;

        let data = query
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((data, total))
    }

    /// Updates an invoice with a merge-patch of the provided fields.
    ///
    /// Totals fields are stored as supplied: the creation-time invariant is
    /// not re-checked on update, and no status transition rules apply.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` for absent or cross-tenant invoices.
    pub async fn update_invoice(
        &self,
        company_id: Uuid,
        id: Uuid,
        input: UpdateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        if input.is_empty() {
            return Err(InvoiceError::EmptyUpdate);
        }

        let invoice = self
            .find_invoice(company_id, id)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        if let Some(ref number) = input.number
            && *number != invoice.number
        {
            let taken = invoices::Entity::find()
                .filter(invoices::Column::CompanyId.eq(company_id))
                .filter(invoices::Column::Number.eq(number))
                .one(&self.db)
                .await?
                .is_some();
            if taken {
                return Err(InvoiceError::DuplicateNumber(number.clone()));
            }
        }

        if let Some(client_id) = input.client_id {
            let client = clients::Entity::find_by_id(client_id)
                .filter(clients::Column::CompanyId.eq(company_id))
                .one(&self.db)
                .await?;
            if client.is_none() {
                return Err(InvoiceError::ClientNotFound(client_id));
            }
        }

        let mut active: invoices::ActiveModel = invoice.into();

        if let Some(number) = input.number {
            active.number = Set(number);
        }
        if let Some(client_id) = input.client_id {
            active.client_id = Set(client_id);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(subtotal) = input.subtotal {
            active.subtotal = Set(subtotal);
        }
        if let Some(tax_rate) = input.tax_rate {
            active.tax_rate = Set(tax_rate);
        }
        if let Some(tax_amount) = input.tax_amount {
            active.tax_amount = Set(tax_amount);
        }
        if let Some(total) = input.total {
            active.total = Set(total);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let invoice = active.update(&self.db).await?;
        Ok(invoice)
    }

    /// Deletes an invoice and everything hanging off it.
    ///
    /// Payments and items go first, then the invoice row, all in one
    /// transaction, so referential integrity holds on every exit path.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` for absent or cross-tenant invoices.
    pub async fn delete_invoice(&self, company_id: Uuid, id: Uuid) -> Result<(), InvoiceError> {
        let invoice = self
            .find_invoice(company_id, id)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let txn = self.db.begin().await?;

        payments::Entity::delete_many()
            .filter(payments::Column::InvoiceId.eq(invoice.id))
            .exec(&txn)
            .await?;
        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
            .exec(&txn)
            .await?;
        invoices::Entity::delete_by_id(invoice.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

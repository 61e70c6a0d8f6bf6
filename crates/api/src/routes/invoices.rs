//! Invoice management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::CompanyScope};
use faktura_core::billing::{self, LineItemInput};
use faktura_db::{
    ClientRepository, InvoiceRepository, SettingsRepository,
    entities::{invoice_items, invoices, sea_orm_active_enums::InvoiceStatus},
    repositories::invoice::{
        CreateInvoiceInput, InvoiceDocument, InvoiceError, InvoiceFilter, UpdateInvoiceInput,
    },
    repositories::settings::SettingsError,
};
use faktura_shared::types::{PageRequest, PageResponse};

/// Creates the invoices router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/next-number", get(next_number))
        .route(
            "/invoices/{invoice_id}",
            get(get_invoice).patch(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{invoice_id}/document", get(get_document))
}

#[derive(Debug, Deserialize)]
struct LineItemRequest {
    description: String,
    quantity: Decimal,
    rate: Decimal,
}

#[derive(Debug, Deserialize)]
struct CreateInvoiceRequest {
    client_id: uuid::Uuid,
    number: Option<String>,
    #[serde(default)]
    tax_rate: Decimal,
    due_date: chrono::NaiveDate,
    items: Vec<LineItemRequest>,
    subtotal: Option<Decimal>,
    tax_amount: Option<Decimal>,
    total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct UpdateInvoiceRequest {
    number: Option<String>,
    client_id: Option<uuid::Uuid>,
    status: Option<String>,
    subtotal: Option<Decimal>,
    tax_rate: Option<Decimal>,
    tax_amount: Option<Decimal>,
    total: Option<Decimal>,
    due_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ListInvoicesQuery {
    status: Option<String>,
    client_id: Option<uuid::Uuid>,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl ListInvoicesQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

fn parse_status(s: &str) -> Option<InvoiceStatus> {
    s.parse::<faktura_core::billing::InvoiceStatus>()
        .ok()
        .map(Into::into)
}

/// Serializes an invoice, deriving the read-time `is_overdue` flag.
fn invoice_json(invoice: &invoices::Model) -> serde_json::Value {
    let today = chrono::Utc::now().date_naive();
    let is_overdue = billing::is_overdue(invoice.status.into(), invoice.due_date, today);

    json!({
        "id": invoice.id,
        "client_id": invoice.client_id,
        "number": invoice.number,
        "status": invoice.status,
        "is_overdue": is_overdue,
        "subtotal": invoice.subtotal,
        "tax_rate": invoice.tax_rate,
        "tax_amount": invoice.tax_amount,
        "total": invoice.total,
        "due_date": invoice.due_date,
        "created_at": invoice.created_at,
        "updated_at": invoice.updated_at
    })
}

fn invoice_with_items_json(
    invoice: &invoices::Model,
    items: &[invoice_items::Model],
) -> serde_json::Value {
    let mut value = invoice_json(invoice);
    value["items"] = json!(
        items
            .iter()
            .map(|i| {
                json!({
                    "id": i.id,
                    "description": i.description,
                    "quantity": i.quantity,
                    "rate": i.rate,
                    "amount": i.amount
                })
            })
            .collect::<Vec<_>>()
    );
    value
}

fn error_response(err: &InvoiceError) -> Response {
    match err {
        InvoiceError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Invoice not found"
            })),
        )
            .into_response(),
        InvoiceError::ClientNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "client_not_found",
                "message": "Client not found"
            })),
        )
            .into_response(),
        InvoiceError::DuplicateNumber(number) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_number",
                "message": format!("Invoice number '{number}' already exists")
            })),
        )
            .into_response(),
        InvoiceError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response(),
        InvoiceError::EmptyUpdate => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No fields provided for update"
            })),
        )
            .into_response(),
        InvoiceError::Database(e) => {
            error!(error = %e, "Database error in invoice operation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// POST /invoices - Create an invoice with its line items.
async fn create_invoice(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let items = payload
        .items
        .into_iter()
        .map(|i| LineItemInput {
            description: i.description,
            quantity: i.quantity,
            rate: i.rate,
        })
        .collect();

    match repo
        .create_invoice(CreateInvoiceInput {
            company_id,
            client_id: payload.client_id,
            number: payload.number,
            tax_rate: payload.tax_rate,
            due_date: payload.due_date,
            items,
            subtotal: payload.subtotal,
            tax_amount: payload.tax_amount,
            total: payload.total,
        })
        .await
    {
        Ok((invoice, items)) => {
            info!(
                company_id = %company_id,
                invoice_id = %invoice.id,
                number = %invoice.number,
                total = %invoice.total,
                "Invoice created"
            );
            (
                StatusCode::CREATED,
                Json(invoice_with_items_json(&invoice, &items)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /invoices - List the company's invoices.
async fn list_invoices(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Query(query): Query<ListInvoicesQuery>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match parse_status(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: draft, sent, paid, overdue"
                    })),
                )
                    .into_response();
            }
        },
    };

    let filter = InvoiceFilter {
        status,
        client_id: query.client_id,
    };

    let page = query.page_request();
    match repo.list_invoices(company_id, filter, &page).await {
        Ok((invoices, total)) => {
            let data: Vec<_> = invoices.iter().map(invoice_json).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(data, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /invoices/next-number - Preview the next invoice number.
async fn next_number(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.next_number(company_id).await {
        Ok(number) => (StatusCode::OK, Json(json!({ "number": number }))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Fetch one invoice with its items.
async fn get_invoice(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(invoice_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.find_with_items(company_id, invoice_id).await {
        Ok(Some((invoice, items))) => (
            StatusCode::OK,
            Json(invoice_with_items_json(&invoice, &items)),
        )
            .into_response(),
        Ok(None) => error_response(&InvoiceError::NotFound(invoice_id)),
        Err(e) => error_response(&e),
    }
}

/// PATCH `/invoices/{invoice_id}` - Merge-patch an invoice.
async fn update_invoice(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(invoice_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let status = match payload.status.as_deref() {
        None => None,
        Some(s) => match parse_status(s) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_status",
                        "message": "Status must be one of: draft, sent, paid, overdue"
                    })),
                )
                    .into_response();
            }
        },
    };

    match repo
        .update_invoice(
            company_id,
            invoice_id,
            UpdateInvoiceInput {
                number: payload.number,
                client_id: payload.client_id,
                status,
                subtotal: payload.subtotal,
                tax_rate: payload.tax_rate,
                tax_amount: payload.tax_amount,
                total: payload.total,
                due_date: payload.due_date,
            },
        )
        .await
    {
        Ok(invoice) => {
            info!(company_id = %company_id, invoice_id = %invoice_id, "Invoice updated");
            (StatusCode::OK, Json(invoice_json(&invoice))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/invoices/{invoice_id}` - Delete an invoice and its dependents.
async fn delete_invoice(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(invoice_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.delete_invoice(company_id, invoice_id).await {
        Ok(()) => {
            info!(company_id = %company_id, invoice_id = %invoice_id, "Invoice deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}/document` - The bundle an external renderer
/// needs: invoice, items, client, and the company's settings.
async fn get_document(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(invoice_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let invoice_repo = InvoiceRepository::new((*state.db).clone());
    let client_repo = ClientRepository::new((*state.db).clone());
    let settings_repo = SettingsRepository::new((*state.db).clone());

    let (invoice, items) = match invoice_repo.find_with_items(company_id, invoice_id).await {
        Ok(Some(found)) => found,
        Ok(None) => return error_response(&InvoiceError::NotFound(invoice_id)),
        Err(e) => return error_response(&e),
    };

    let client = match client_repo.find_client(company_id, invoice.client_id).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            error!(
                company_id = %company_id,
                invoice_id = %invoice_id,
                client_id = %invoice.client_id,
                "Invoice references a deleted client"
            );
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "client_not_found",
                    "message": "The invoice's client no longer exists"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error fetching document client");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }
    };

    let settings = match settings_repo.get_or_create(company_id).await {
        Ok(settings) => settings,
        Err(SettingsError::CompanyNotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Company not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error resolving settings for document");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(InvoiceDocument {
            invoice,
            items,
            client,
            settings,
        }),
    )
        .into_response()
}

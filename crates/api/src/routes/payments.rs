//! Payment recording and listing routes.

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
use faktura_db::{
    PaymentRepository,
    entities::payments,
    repositories::payment::{PaymentError, RecordPaymentInput},
};

/// Creates the payments router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(record_payment))
        .route("/invoices/{invoice_id}/payments", get(list_invoice_payments))
}

#[derive(Debug, Deserialize)]
struct RecordPaymentRequest {
    invoice_id: uuid::Uuid,
    amount: Decimal,
    payment_date: Option<chrono::DateTime<chrono::Utc>>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListPaymentsQuery {
    limit: Option<u64>,
}

fn payment_json(payment: &payments::Model) -> serde_json::Value {
    json!({
        "id": payment.id,
        "invoice_id": payment.invoice_id,
        "amount": payment.amount,
        "payment_date": payment.payment_date,
        "notes": payment.notes,
        "created_at": payment.created_at
    })
}

fn error_response(err: &PaymentError) -> Response {
    match err {
        PaymentError::InvoiceNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "invoice_not_found",
                "message": "Invoice not found"
            })),
        )
            .into_response(),
        PaymentError::InvalidAmount(amount) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": format!("Payment amount must be positive, got {amount}")
            })),
        )
            .into_response(),
        PaymentError::Database(e) => {
            error!(error = %e, "Database error in payment operation");
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

/// POST /payments - Record a payment and reconcile the invoice status.
async fn record_payment(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Json(payload): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo
        .record_payment(
            company_id,
            RecordPaymentInput {
                invoice_id: payload.invoice_id,
                amount: payload.amount,
                payment_date: payload.payment_date,
                notes: payload.notes,
            },
        )
        .await
    {
        Ok((payment, invoice)) => {
            info!(
                company_id = %company_id,
                invoice_id = %invoice.id,
                payment_id = %payment.id,
                amount = %payment.amount,
                status = ?invoice.status,
                "Payment recorded"
            );
            let mut body = payment_json(&payment);
            body["invoice_status"] = json!(invoice.status);
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /payments - The company's most recent payments.
async fn list_payments(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Query(query): Query<ListPaymentsQuery>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());
    let limit = query.limit.unwrap_or(20).min(100);

    match repo.list_recent(company_id, limit).await {
        Ok(rows) => {
            let data: Vec<_> = rows
                .iter()
                .map(|(payment, invoice)| {
                    let mut body = payment_json(payment);
                    body["invoice_number"] = json!(invoice.number);
                    body
                })
                .collect();
            (StatusCode::OK, Json(json!({ "payments": data }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}/payments` - Payments applied to one invoice.
async fn list_invoice_payments(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(invoice_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new((*state.db).clone());

    match repo.list_for_invoice(company_id, invoice_id).await {
        Ok(rows) => {
            let data: Vec<_> = rows.iter().map(payment_json).collect();
            (StatusCode::OK, Json(json!({ "payments": data }))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

//! Company settings routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use serde_with::rust::double_option;
use tracing::{error, info};

use crate::{AppState, middleware::CompanyScope};
use faktura_db::{
    SettingsRepository,
    entities::settings,
    repositories::settings::{SettingsError, UpdateSettingsInput},
};

/// Creates the settings router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).patch(update_settings))
}

#[derive(Debug, Deserialize)]
struct UpdateSettingsRequest {
    company_name: Option<String>,
    email: Option<String>,
    #[serde(default, with = "double_option")]
    phone: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    address: Option<Option<String>>,
    currency: Option<String>,
    default_tax_rate: Option<Decimal>,
    #[serde(default, with = "double_option")]
    logo_url: Option<Option<String>>,
}

fn settings_json(settings: &settings::Model) -> serde_json::Value {
    json!({
        "id": settings.id,
        "company_name": settings.company_name,
        "email": settings.email,
        "phone": settings.phone,
        "address": settings.address,
        "currency": settings.currency,
        "default_tax_rate": settings.default_tax_rate,
        "logo_url": settings.logo_url,
        "created_at": settings.created_at,
        "updated_at": settings.updated_at
    })
}

fn error_response(err: &SettingsError) -> Response {
    match err {
        SettingsError::CompanyNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Company not found"
            })),
        )
            .into_response(),
        SettingsError::InvalidCurrency(code) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_currency",
                "message": format!("Invalid currency code: {code}")
            })),
        )
            .into_response(),
        SettingsError::InvalidTaxRate(rate) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_tax_rate",
                "message": format!("Default tax rate {rate} must be between 0 and 100")
            })),
        )
            .into_response(),
        SettingsError::EmptyUpdate => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No fields provided for update"
            })),
        )
            .into_response(),
        SettingsError::Database(e) => {
            error!(error = %e, "Database error in settings operation");
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

/// GET /settings - The company's settings, created with defaults on first read.
async fn get_settings(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
) -> impl IntoResponse {
    let repo = SettingsRepository::new((*state.db).clone());

    match repo.get_or_create(company_id).await {
        Ok(settings) => (StatusCode::OK, Json(settings_json(&settings))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PATCH /settings - Merge-patch the company's settings.
async fn update_settings(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Json(payload): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let repo = SettingsRepository::new((*state.db).clone());

    match repo
        .update_settings(
            company_id,
            UpdateSettingsInput {
                company_name: payload.company_name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                currency: payload.currency,
                default_tax_rate: payload.default_tax_rate,
                logo_url: payload.logo_url,
            },
        )
        .await
    {
        Ok(settings) => {
            info!(company_id = %company_id, "Settings updated");
            (StatusCode::OK, Json(settings_json(&settings))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

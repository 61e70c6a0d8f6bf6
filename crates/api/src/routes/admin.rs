//! Tenant-directory routes for the super-admin role.
//!
//! These are the only routes exempt from company scoping. Non-admin
//! identities are rejected with 403 before any repository is touched.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use serde_with::rust::double_option;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use faktura_core::auth::hash_password;
use faktura_db::{
    CompanyRepository,
    entities::companies,
    repositories::company::{CompanyError, CreateCompanyInput, UpdateCompanyInput},
};
use faktura_shared::types::{PageRequest, PageResponse};

/// Creates the admin router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/companies", get(list_companies).post(create_company))
        .route(
            "/admin/companies/{company_id}",
            get(get_company).patch(update_company).delete(delete_company),
        )
}

#[derive(Debug, Deserialize)]
struct CreateCompanyRequest {
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    owner_email: String,
    owner_password: String,
    owner_full_name: String,
}

#[derive(Debug, Deserialize)]
struct UpdateCompanyRequest {
    name: Option<String>,
    email: Option<String>,
    #[serde(default, with = "double_option")]
    phone: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    address: Option<Option<String>>,
    is_active: Option<bool>,
}

fn company_json(company: &companies::Model) -> serde_json::Value {
    json!({
        "id": company.id,
        "name": company.name,
        "email": company.email,
        "phone": company.phone,
        "address": company.address,
        "is_active": company.is_active,
        "created_at": company.created_at,
        "updated_at": company.updated_at
    })
}

/// Rejects non-super-admin identities.
fn require_super_admin(auth: &AuthUser) -> Result<(), Response> {
    if auth.is_super_admin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Super-admin role required"
            })),
        )
            .into_response())
    }
}

fn error_response(err: &CompanyError) -> Response {
    match err {
        CompanyError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Company not found"
            })),
        )
            .into_response(),
        CompanyError::InvalidName => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Name must be between 1 and 255 characters"
            })),
        )
            .into_response(),
        CompanyError::DuplicateEmail(email) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_email",
                "message": format!("A user with email '{email}' already exists")
            })),
        )
            .into_response(),
        CompanyError::HasChildRecords { clients, invoices } => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "has_child_records",
                "message": format!(
                    "Company still owns {clients} clients and {invoices} invoices"
                )
            })),
        )
            .into_response(),
        CompanyError::EmptyUpdate => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No fields provided for update"
            })),
        )
            .into_response(),
        CompanyError::Database(e) => {
            error!(error = %e, "Database error in company operation");
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

/// GET /admin/companies - List all tenants.
async fn list_companies(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_super_admin(&auth) {
        return rejection;
    }

    let repo = CompanyRepository::new((*state.db).clone());

    match repo.list_companies(&page).await {
        Ok((companies, total)) => {
            let data: Vec<_> = companies.iter().map(company_json).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(data, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST /admin/companies - Provision a tenant with its first staff user.
async fn create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCompanyRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_super_admin(&auth) {
        return rejection;
    }

    let owner_password_hash = match hash_password(&payload.owner_password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash owner password");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred creating the company"
                })),
            )
                .into_response();
        }
    };

    let repo = CompanyRepository::new((*state.db).clone());

    match repo
        .create_with_owner(CreateCompanyInput {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            owner_email: payload.owner_email,
            owner_password_hash,
            owner_full_name: payload.owner_full_name,
        })
        .await
    {
        Ok((company, owner)) => {
            info!(
                company_id = %company.id,
                owner_id = %owner.id,
                created_by = %auth.user_id(),
                "Company provisioned"
            );
            let mut body = company_json(&company);
            body["owner"] = json!({
                "id": owner.id,
                "email": owner.email,
                "full_name": owner.full_name
            });
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/admin/companies/{company_id}` - Fetch one tenant.
async fn get_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if let Err(rejection) = require_super_admin(&auth) {
        return rejection;
    }

    let repo = CompanyRepository::new((*state.db).clone());

    match repo.find_by_id(company_id).await {
        Ok(Some(company)) => (StatusCode::OK, Json(company_json(&company))).into_response(),
        Ok(None) => error_response(&CompanyError::NotFound(company_id)),
        Err(e) => error_response(&e),
    }
}

/// PATCH `/admin/companies/{company_id}` - Merge-patch a tenant.
async fn update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_super_admin(&auth) {
        return rejection;
    }

    let repo = CompanyRepository::new((*state.db).clone());

    match repo
        .update_company(
            company_id,
            UpdateCompanyInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                is_active: payload.is_active,
            },
        )
        .await
    {
        Ok(company) => {
            info!(company_id = %company_id, updated_by = %auth.user_id(), "Company updated");
            (StatusCode::OK, Json(company_json(&company))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/admin/companies/{company_id}` - Delete an empty tenant.
async fn delete_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(company_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if let Err(rejection) = require_super_admin(&auth) {
        return rejection;
    }

    let repo = CompanyRepository::new((*state.db).clone());

    match repo.delete_company(company_id).await {
        Ok(()) => {
            info!(company_id = %company_id, deleted_by = %auth.user_id(), "Company deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

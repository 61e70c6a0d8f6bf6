//! Client management routes.

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

use crate::{AppState, middleware::CompanyScope};
use faktura_db::{
    ClientRepository,
    entities::clients,
    repositories::client::{ClientError, CreateClientInput, UpdateClientInput},
};
use faktura_shared::types::{PageRequest, PageResponse};

/// Creates the clients router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{client_id}",
            get(get_client).patch(update_client).delete(delete_client),
        )
}

#[derive(Debug, Deserialize)]
struct CreateClientRequest {
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateClientRequest {
    name: Option<String>,
    email: Option<String>,
    #[serde(default, with = "double_option")]
    phone: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    address: Option<Option<String>>,
}

fn client_json(client: &clients::Model) -> serde_json::Value {
    json!({
        "id": client.id,
        "name": client.name,
        "email": client.email,
        "phone": client.phone,
        "address": client.address,
        "created_at": client.created_at,
        "updated_at": client.updated_at
    })
}

fn error_response(err: &ClientError) -> Response {
    match err {
        ClientError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Client not found"
            })),
        )
            .into_response(),
        ClientError::InvalidName => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Name must be between 1 and 255 characters"
            })),
        )
            .into_response(),
        ClientError::InvalidEmail(email) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_email",
                "message": format!("Invalid email address: {email}")
            })),
        )
            .into_response(),
        ClientError::EmptyUpdate => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_update",
                "message": "No fields provided for update"
            })),
        )
            .into_response(),
        ClientError::Database(e) => {
            error!(error = %e, "Database error in client operation");
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

/// POST /clients - Create a client.
async fn create_client(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Json(payload): Json<CreateClientRequest>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo
        .create_client(CreateClientInput {
            company_id,
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })
        .await
    {
        Ok(client) => {
            info!(company_id = %company_id, client_id = %client.id, "Client created");
            (StatusCode::CREATED, Json(client_json(&client))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /clients - List the company's clients.
async fn list_clients(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo.list_clients(company_id, &page).await {
        Ok((clients, total)) => {
            let data: Vec<_> = clients.iter().map(client_json).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(data, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/clients/{client_id}` - Fetch one client.
async fn get_client(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(client_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo.find_client(company_id, client_id).await {
        Ok(Some(client)) => (StatusCode::OK, Json(client_json(&client))).into_response(),
        Ok(None) => error_response(&ClientError::NotFound(client_id)),
        Err(e) => error_response(&e),
    }
}

/// PATCH `/clients/{client_id}` - Merge-patch a client.
async fn update_client(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(client_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo
        .update_client(
            company_id,
            client_id,
            UpdateClientInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
            },
        )
        .await
    {
        Ok(client) => {
            info!(company_id = %company_id, client_id = %client_id, "Client updated");
            (StatusCode::OK, Json(client_json(&client))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/clients/{client_id}` - Delete a client.
async fn delete_client(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
    Path(client_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = ClientRepository::new((*state.db).clone());

    match repo.delete_client(company_id, client_id).await {
        Ok(()) => {
            info!(company_id = %company_id, client_id = %client_id, "Client deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(&e),
    }
}

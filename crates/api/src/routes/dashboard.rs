//! Dashboard statistics routes.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::CompanyScope};
use faktura_db::DashboardRepository;

/// Creates the dashboard router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(stats))
}

/// GET /dashboard/stats - Derived statistics, recomputed on every call.
async fn stats(
    State(state): State<AppState>,
    CompanyScope(company_id): CompanyScope,
) -> impl IntoResponse {
    let repo = DashboardRepository::new((*state.db).clone());

    match repo.dashboard_stats(company_id).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to compute dashboard stats");
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

use axum::{extract::State, Json};

use crate::{dto::dashboard::DashboardSummary, errors::ServiceError, handlers::AppState};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    summary = "Dashboard aggregates",
    description = "Item count, low-stock count, total stock value and the five most recent movements",
    responses(
        (status = 200, description = "Dashboard computed", body = DashboardSummary),
        (status = 503, description = "Database unavailable", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ServiceError> {
    Ok(Json(state.services.dashboard.summary().await?))
}

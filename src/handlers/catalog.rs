use axum::{extract::State, Json};

use crate::{
    dto::catalog::CategoryWithCount,
    entities::{location, supplier},
    errors::ServiceError,
    handlers::AppState,
};

#[utoipa::path(
    get,
    path = "/api/suppliers",
    summary = "List suppliers",
    responses(
        (status = 200, description = "Suppliers retrieved", body = [supplier::Model]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
) -> Result<Json<Vec<supplier::Model>>, ServiceError> {
    Ok(Json(state.services.catalog.list_suppliers().await?))
}

#[utoipa::path(
    get,
    path = "/api/locations",
    summary = "List locations",
    responses(
        (status = 200, description = "Locations retrieved", body = [location::Model]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<location::Model>>, ServiceError> {
    Ok(Json(state.services.catalog.list_locations().await?))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    summary = "List categories",
    description = "Categories annotated with the number of items in each",
    responses(
        (status = 200, description = "Categories retrieved", body = [CategoryWithCount]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryWithCount>>, ServiceError> {
    Ok(Json(state.services.catalog.list_categories().await?))
}

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    dto::items::{ItemPayload, ItemWithRelations, MessageResponse},
    entities::item,
    errors::ServiceError,
    handlers::AppState,
};

/// Parses the `:id` path segment; anything but an integer is a 400.
fn parse_item_id(raw: &str) -> Result<i32, ServiceError> {
    raw.parse::<i32>()
        .map_err(|_| ServiceError::ValidationError(format!("Invalid item id: {:?}", raw)))
}

#[utoipa::path(
    get,
    path = "/api/items",
    summary = "List items",
    description = "All items with their category, supplier and location joined",
    responses(
        (status = 200, description = "Items retrieved", body = [ItemWithRelations],
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 503, description = "Database unavailable", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemWithRelations>>, ServiceError> {
    let items = state.services.items.list_with_relations().await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/items",
    summary = "Create item",
    description = "Create an item, resolving category, supplier and location by name. \
                   A positive starting quantity is logged as an IN movement.",
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item created", body = item::Model),
        (status = 400, description = "Missing or invalid field", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<item::Model>, ServiceError> {
    let draft = payload.into_create_draft()?;
    let item = state.services.items.create(draft).await?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    summary = "Update item",
    description = "Replace an item's fields. A quantity change is logged as an IN or OUT movement; \
                   empty lookup names keep the current reference.",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemPayload,
    responses(
        (status = 200, description = "Item updated", body = item::Model),
        (status = 400, description = "Invalid id or field", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU already in use", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<item::Model>, ServiceError> {
    let id = parse_item_id(&id)?;
    let draft = payload.into_update_draft()?;
    let item = state.services.items.update(id, draft).await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    summary = "Delete item",
    description = "Delete an item and its movement history",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let id = parse_item_id(&id)?;
    state.services.items.delete(id).await?;
    Ok(Json(MessageResponse::new("Item deleted")))
}

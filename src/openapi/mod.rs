use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Path the generated document is served from.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockpile API",
        description = r#"
# Hardware inventory API

CRUD over items, categories, suppliers and locations.

- Categories, suppliers and locations are created on first reference by name.
- Every quantity change on an item is recorded as an `IN` or `OUT` movement.

## Error Handling

Errors share one body shape:

```json
{
  "error": "Not found: Item not found",
  "code": "not_found",
  "requestId": "2f0c6a5e-8c59-4d1b-9a43-0f6c5a1d2b7e",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "dashboard", description = "Inventory aggregates"),
        (name = "items", description = "Item CRUD with movement logging"),
        (name = "catalog", description = "Categories, suppliers and locations"),
    ),
    paths(
        crate::handlers::dashboard::get_dashboard,
        crate::handlers::items::list_items,
        crate::handlers::items::create_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::catalog::list_suppliers,
        crate::handlers::catalog::list_locations,
        crate::handlers::catalog::list_categories,
    ),
    components(
        schemas(
            crate::entities::item::Model,
            crate::entities::category::Model,
            crate::entities::supplier::Model,
            crate::entities::location::Model,
            crate::entities::movement::Model,
            crate::entities::movement::MovementType,
            crate::dto::items::ItemPayload,
            crate::dto::items::ItemWithRelations,
            crate::dto::items::MessageResponse,
            crate::dto::catalog::CategoryWithCount,
            crate::dto::dashboard::DashboardSummary,
            crate::dto::dashboard::RecentMovement,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}

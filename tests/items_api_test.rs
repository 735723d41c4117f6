mod common;

use axum::http::{Method, StatusCode};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};
use stockpile_api::entities::{category, movement};
use stockpile_api::repositories::MovementRepository;

use common::TestApp;

fn fan() -> Value {
    json!({
        "name": "Fan",
        "sku": "FAN-1",
        "categoryName": "Cooling",
        "quantity": 10,
        "price": 15.5,
        "minStockLevel": 2
    })
}

#[tokio::test]
async fn create_item_resolves_category_and_logs_movement() {
    let app = TestApp::new().await;

    let (status, created) = app.post("/api/items", fan()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Fan");
    assert_eq!(created["sku"], "FAN-1");
    assert_eq!(created["quantity"], 10);
    assert_eq!(created["price"].as_f64(), Some(15.5));
    assert_eq!(created["minStockLevel"], 2);
    assert!(created["supplierId"].is_null());
    assert!(created["locationId"].is_null());

    let (status, items) = app.get("/api/items").await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().expect("item list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category"]["name"], "Cooling");
    assert_eq!(items[0]["category"]["id"], created["categoryId"]);
    assert!(items[0]["supplier"].is_null());
    assert!(items[0]["location"].is_null());

    let (_, categories) = app.get("/api/categories").await;
    assert_eq!(categories, json!([{ "id": created["categoryId"], "name": "Cooling", "itemCount": 1 }]));

    let (_, dashboard) = app.get("/api/dashboard").await;
    assert_eq!(dashboard["totalItems"], 1);
    assert_eq!(dashboard["lowStockItems"], 0);
    assert_eq!(dashboard["totalValue"].as_f64(), Some(155.0));
    let recent = dashboard["recentMovements"].as_array().expect("movements");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["type"], "IN");
    assert_eq!(recent[0]["quantity"], 10);
    assert_eq!(recent[0]["item"]["sku"], "FAN-1");
}

#[tokio::test]
async fn zero_quantity_create_still_logs_opening_movement() {
    let app = TestApp::new().await;

    let mut empty = fan();
    empty["quantity"] = json!(0);
    let id = app.create_item(empty).await;

    let movements = MovementRepository::list_for_item(app.db(), id as i32)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type.as_str(), "IN");
    assert_eq!(movements[0].quantity, 0);

    let (_, dashboard) = app.get("/api/dashboard").await;
    assert_eq!(dashboard["recentMovements"][0]["quantity"], 0);
    assert_eq!(dashboard["recentMovements"][0]["type"], "IN");
    assert_eq!(dashboard["lowStockItems"], 1);
}

#[tokio::test]
async fn lookups_are_reused_by_name() {
    let app = TestApp::new().await;

    let mut first = fan();
    first["supplierName"] = json!("Acme");
    first["locationName"] = json!("Shelf A");
    app.create_item(first).await;

    let mut second = fan();
    second["sku"] = json!("FAN-2");
    second["supplierName"] = json!("Acme");
    second["locationName"] = json!("Shelf B");
    app.create_item(second).await;

    let (_, suppliers) = app.get("/api/suppliers").await;
    assert_eq!(suppliers.as_array().map(Vec::len), Some(1));
    assert_eq!(suppliers[0]["name"], "Acme");

    let (_, locations) = app.get("/api/locations").await;
    let names: Vec<_> = locations
        .as_array()
        .expect("locations")
        .iter()
        .map(|l| l["name"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(names, vec!["Shelf A", "Shelf B"]);

    let (_, categories) = app.get("/api/categories").await;
    assert_eq!(categories[0]["itemCount"], 2);
}

#[tokio::test]
async fn duplicate_sku_is_conflict_and_changes_nothing() {
    let app = TestApp::new().await;
    app.create_item(fan()).await;

    let mut dup = fan();
    dup["name"] = json!("Other fan");
    dup["categoryName"] = json!("Brand new category");
    let (status, body) = app.post("/api/items", dup).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (_, items) = app.get("/api/items").await;
    assert_eq!(items.as_array().map(Vec::len), Some(1));
    assert_eq!(items[0]["name"], "Fan");

    let categories = category::Entity::find().count(app.db()).await.unwrap();
    assert_eq!(categories, 1);
    let movements = movement::Entity::find().count(app.db()).await.unwrap();
    assert_eq!(movements, 1);
}

#[tokio::test]
async fn update_logs_in_and_out_movements() {
    let app = TestApp::new().await;
    let id = app.create_item(fan()).await;

    let mut restock = fan();
    restock["quantity"] = json!(25);
    let (status, updated) = app.put(&format!("/api/items/{id}"), restock).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 25);

    let mut sale = fan();
    sale["quantity"] = json!(1);
    app.put(&format!("/api/items/{id}"), sale).await;

    // Same quantity: no movement.
    let mut rename = fan();
    rename["name"] = json!("Case fan");
    rename["quantity"] = json!(1);
    let (_, renamed) = app.put(&format!("/api/items/{id}"), rename).await;
    assert_eq!(renamed["name"], "Case fan");

    let movements = MovementRepository::list_for_item(app.db(), id as i32)
        .await
        .unwrap();
    let summary: Vec<_> = movements
        .iter()
        .map(|m| (m.movement_type.as_str(), m.quantity))
        .collect();
    assert_eq!(summary, vec![("IN", 10), ("IN", 15), ("OUT", 24)]);

    let (_, dashboard) = app.get("/api/dashboard").await;
    assert_eq!(dashboard["lowStockItems"], 1);
}

#[tokio::test]
async fn update_can_move_item_to_new_category() {
    let app = TestApp::new().await;
    let id = app.create_item(fan()).await;

    let mut change = fan();
    change["categoryName"] = json!("Power");
    change["locationName"] = json!("Bin 7");
    let (status, updated) = app.put(&format!("/api/items/{id}"), change).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["locationId"].is_i64());

    let (_, categories) = app.get("/api/categories").await;
    let counts: Vec<_> = categories
        .as_array()
        .expect("categories")
        .iter()
        .map(|c| (c["name"].clone(), c["itemCount"].clone()))
        .collect();
    assert_eq!(
        counts,
        vec![(json!("Cooling"), json!(0)), (json!("Power"), json!(1))]
    );
}

#[tokio::test]
async fn update_to_taken_sku_is_conflict() {
    let app = TestApp::new().await;
    app.create_item(fan()).await;
    let mut other = fan();
    other["sku"] = json!("FAN-2");
    let id = app.create_item(other).await;

    let mut clash = fan();
    clash["quantity"] = json!(99);
    clash["categoryName"] = json!("Only in the failed write");
    let (status, body) = app.put(&format!("/api/items/{id}"), clash).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    // The movement and the new category were rolled back with the item write.
    let movements = movement::Entity::find().count(app.db()).await.unwrap();
    assert_eq!(movements, 2);
    let categories = category::Entity::find().count(app.db()).await.unwrap();
    assert_eq!(categories, 1);

    let (_, items) = app.get("/api/items").await;
    assert_eq!(items[1]["sku"], "FAN-2");
    assert_eq!(items[1]["quantity"], 10);
}

#[tokio::test]
async fn missing_item_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.put("/api/items/999", fan()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert!(body["error"].as_str().unwrap_or_default().contains("Item not found"));

    let (status, _) = app.delete("/api/items/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app.delete("/api/items/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");

    let (status, _) = app.put("/api/items/1.5", fan()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_item_and_movements() {
    let app = TestApp::new().await;
    let id = app.create_item(fan()).await;
    let mut other = fan();
    other["sku"] = json!("FAN-2");
    app.create_item(other).await;

    let (status, body) = app.delete(&format!("/api/items/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Item deleted" }));

    let (_, items) = app.get("/api/items").await;
    assert_eq!(items.as_array().map(Vec::len), Some(1));
    assert_eq!(items[0]["sku"], "FAN-2");

    let remaining = MovementRepository::list_for_item(app.db(), id as i32)
        .await
        .unwrap();
    assert!(remaining.is_empty());

    // The category outlives its items.
    let (_, categories) = app.get("/api/categories").await;
    assert_eq!(categories[0]["itemCount"], 1);
}

#[tokio::test]
async fn form_encoded_numbers_are_accepted() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/api/items",
            json!({
                "name": "Bolt",
                "sku": "B-1",
                "categoryName": "Fasteners",
                "supplierName": "",
                "locationName": "",
                "quantity": "25",
                "price": "0.10",
                "minStockLevel": "5"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["quantity"], 25);
    assert_eq!(created["price"].as_f64(), Some(0.1));
    assert!(created["supplierId"].is_null());

    let (_, suppliers) = app.get("/api/suppliers").await;
    assert_eq!(suppliers, json!([]));
}

#[tokio::test]
async fn invalid_bodies_are_rejected_with_error_body() {
    let app = TestApp::new().await;

    let cases = [
        ("name", Value::Null),
        ("sku", json!("")),
        ("categoryName", json!("")),
        ("quantity", json!(-1)),
        ("price", json!("free")),
        ("minStockLevel", json!(2.5)),
    ];

    for (field, value) in cases {
        let mut body = fan();
        if value.is_null() {
            body.as_object_mut().unwrap().remove(field);
        } else {
            body[field] = value;
        }
        let (status, error) = app.post("/api/items", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
        assert_eq!(error["code"], "validation_error");
        assert!(error["timestamp"].is_string());
    }

    let (_, items) = app.get("/api/items").await;
    assert_eq!(items, json!([]));
}

#[tokio::test]
async fn errors_echo_the_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::DELETE, "/api/items/404", None)
        .await;
    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id header");
    let body = common::response_json(response).await;
    assert_eq!(body["requestId"], header.as_str());
}

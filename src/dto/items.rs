use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{category, item, location, supplier};
use crate::errors::ServiceError;

/// A numeric form field: either a JSON number or its string rendering.
///
/// Browser forms submit every input as a string, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(serde_json::Number),
    Text(String),
}

impl From<i64> for NumberInput {
    fn from(value: i64) -> Self {
        NumberInput::Number(value.into())
    }
}

impl From<&str> for NumberInput {
    fn from(value: &str) -> Self {
        NumberInput::Text(value.to_string())
    }
}

impl NumberInput {
    /// Textual form of the value; `None` for an empty string.
    fn as_text(&self) -> Option<String> {
        match self {
            NumberInput::Number(n) => Some(n.to_string()),
            NumberInput::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

/// Body of `POST /api/items` and `PUT /api/items/:id`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "name": "Fan",
    "sku": "FAN-1",
    "categoryName": "Cooling",
    "supplierName": "Acme",
    "locationName": "Shelf A",
    "quantity": 10,
    "price": 15.5,
    "minStockLevel": 2
}))]
pub struct ItemPayload {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub location_name: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub quantity: Option<NumberInput>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<NumberInput>,
    #[schema(value_type = Option<i32>)]
    pub min_stock_level: Option<NumberInput>,
}

/// Item fields after coercion. Lookup names are `None` when absent or empty.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ItemDraft {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "sku is required"))]
    pub sku: String,
    pub category_name: Option<String>,
    pub supplier_name: Option<String>,
    pub location_name: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub min_stock_level: i32,
}

/// An item with its lookups joined, as listed by `GET /api/items`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ItemWithRelations {
    #[serde(flatten)]
    pub item: item::Model,
    pub category: Option<category::Model>,
    pub supplier: Option<supplier::Model>,
    pub location: Option<location::Model>,
}

/// Body of a successful `DELETE /api/items/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Largest value a `DECIMAL(12, 2)` column holds.
fn max_price() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

impl ItemPayload {
    /// Coerces a create request; `categoryName` is mandatory.
    pub fn into_create_draft(self) -> Result<ItemDraft, ServiceError> {
        self.into_draft(true)
    }

    /// Coerces an update request; lookup names are all optional.
    pub fn into_update_draft(self) -> Result<ItemDraft, ServiceError> {
        self.into_draft(false)
    }

    fn into_draft(self, require_category: bool) -> Result<ItemDraft, ServiceError> {
        let category_name = non_empty(self.category_name);
        let draft = ItemDraft {
            name: self.name.unwrap_or_default(),
            sku: self.sku.unwrap_or_default(),
            category_name,
            supplier_name: non_empty(self.supplier_name),
            location_name: non_empty(self.location_name),
            quantity: coerce_count("quantity", self.quantity.as_ref())?,
            price: coerce_price("price", self.price.as_ref())?,
            min_stock_level: coerce_count("minStockLevel", self.min_stock_level.as_ref())?,
        };

        draft.validate()?;
        if require_category && draft.category_name.is_none() {
            return Err(ServiceError::ValidationError(
                "categoryName is required".to_string(),
            ));
        }

        Ok(draft)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required_text(field: &str, input: Option<&NumberInput>) -> Result<String, ServiceError> {
    input
        .and_then(NumberInput::as_text)
        .ok_or_else(|| ServiceError::ValidationError(format!("{} is required", field)))
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Non-negative whole number that fits an `INTEGER` column.
pub fn coerce_count(field: &str, input: Option<&NumberInput>) -> Result<i32, ServiceError> {
    let text = required_text(field, input)?;
    let value = parse_decimal(&text).ok_or_else(|| {
        ServiceError::ValidationError(format!("{} must be a number, got {:?}", field, text))
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    if !value.fract().is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must be a whole number",
            field
        )));
    }

    value
        .to_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| ServiceError::ValidationError(format!("{} is too large", field)))
}

/// Non-negative price, rounded half away from zero to cents.
pub fn coerce_price(field: &str, input: Option<&NumberInput>) -> Result<Decimal, ServiceError> {
    let text = required_text(field, input)?;
    let value = parse_decimal(&text).ok_or_else(|| {
        ServiceError::ValidationError(format!("{} must be a number, got {:?}", field, text))
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }

    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded > max_price() {
        return Err(ServiceError::ValidationError(format!("{} is too large", field)));
    }
    // Normalize "-0" to zero.
    Ok(rounded.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> ItemPayload {
        serde_json::from_value(value).unwrap()
    }

    fn fan() -> serde_json::Value {
        json!({
            "name": "Fan",
            "sku": "FAN-1",
            "categoryName": "Cooling",
            "quantity": 10,
            "price": 15.5,
            "minStockLevel": 2
        })
    }

    #[test]
    fn create_draft_from_numbers() {
        let draft = payload(fan()).into_create_draft().unwrap();
        assert_eq!(draft.name, "Fan");
        assert_eq!(draft.category_name.as_deref(), Some("Cooling"));
        assert_eq!(draft.supplier_name, None);
        assert_eq!(draft.quantity, 10);
        assert_eq!(draft.price, dec!(15.50));
        assert_eq!(draft.min_stock_level, 2);
    }

    #[test]
    fn form_strings_are_coerced() {
        let draft = payload(json!({
            "name": "Bolt",
            "sku": "B-1",
            "categoryName": "Fasteners",
            "supplierName": "",
            "locationName": "Bin 4",
            "quantity": "25",
            "price": " 0.10 ",
            "minStockLevel": "5"
        }))
        .into_create_draft()
        .unwrap();

        assert_eq!(draft.quantity, 25);
        assert_eq!(draft.price, dec!(0.10));
        assert_eq!(draft.min_stock_level, 5);
        assert_eq!(draft.supplier_name, None);
        assert_eq!(draft.location_name.as_deref(), Some("Bin 4"));
    }

    #[rstest]
    #[case("name")]
    #[case("sku")]
    #[case("categoryName")]
    #[case("quantity")]
    #[case("price")]
    #[case("minStockLevel")]
    fn missing_field_is_rejected_on_create(#[case] field: &str) {
        let mut body = fan();
        body.as_object_mut().unwrap().remove(field);
        let err = payload(body).into_create_draft().unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains(field));
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut body = fan();
        body["name"] = json!("");
        assert_matches!(
            payload(body).into_create_draft(),
            Err(ServiceError::ValidationError(msg)) if msg.contains("name is required")
        );
    }

    #[test]
    fn update_does_not_require_category() {
        let mut body = fan();
        body.as_object_mut().unwrap().remove("categoryName");
        let draft = payload(body).into_update_draft().unwrap();
        assert_eq!(draft.category_name, None);
    }

    #[rstest]
    #[case(json!(-1))]
    #[case(json!("-3"))]
    #[case(json!("ten"))]
    #[case(json!(2.5))]
    #[case(json!(""))]
    #[case(json!(3_000_000_000_i64))]
    fn bad_quantity_is_rejected(#[case] quantity: serde_json::Value) {
        let mut body = fan();
        body["quantity"] = quantity;
        assert_matches!(
            payload(body).into_create_draft(),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[rstest]
    #[case(json!(4.0), 4)]
    #[case(json!("7.00"), 7)]
    #[case(json!(0), 0)]
    #[case(json!("-0"), 0)]
    fn integral_quantities_are_accepted(#[case] quantity: serde_json::Value, #[case] expected: i32) {
        let mut body = fan();
        body["quantity"] = quantity;
        assert_eq!(payload(body).into_create_draft().unwrap().quantity, expected);
    }

    #[rstest]
    #[case(json!(9.99), dec!(9.99))]
    #[case(json!("19.995"), dec!(20.00))]
    #[case(json!("1e2"), dec!(100))]
    #[case(json!(0), dec!(0))]
    fn prices_are_exact_cents(#[case] price: serde_json::Value, #[case] expected: Decimal) {
        let mut body = fan();
        body["price"] = price;
        assert_eq!(payload(body).into_create_draft().unwrap().price, expected);
    }

    #[rstest]
    #[case(json!(-0.01))]
    #[case(json!("abc"))]
    #[case(json!("10000000000"))]
    fn bad_price_is_rejected(#[case] price: serde_json::Value) {
        let mut body = fan();
        body["price"] = price;
        assert_matches!(
            payload(body).into_create_draft(),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn lookup_names_are_not_normalized() {
        let mut body = fan();
        body["categoryName"] = json!(" cooling ");
        let draft = payload(body).into_create_draft().unwrap();
        assert_eq!(draft.category_name.as_deref(), Some(" cooling "));
    }
}

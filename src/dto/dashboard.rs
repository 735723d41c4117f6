use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{item, movement};

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_items: u64,
    pub low_stock_items: u64,
    /// Sum of `price * quantity` over all items
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total_value: Decimal,
    pub recent_movements: Vec<RecentMovement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecentMovement {
    #[serde(flatten)]
    pub movement: movement::Model,
    pub item: Option<item::Model>,
}

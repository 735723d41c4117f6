use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::category;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: category::Model,
    pub item_count: i64,
}

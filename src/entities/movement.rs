use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
pub enum MovementType {
    #[sea_orm(string_value = "IN")]
    #[serde(rename = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    #[serde(rename = "OUT")]
    Out,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }

    /// Movement that records a quantity change from `old` to `new`, if any.
    ///
    /// Returns the direction and the (strictly positive) magnitude.
    pub fn for_change(old: i32, new: i32) -> Option<(MovementType, i32)> {
        let diff = i64::from(new) - i64::from(old);
        if diff == 0 {
            return None;
        }
        let kind = if diff > 0 {
            MovementType::In
        } else {
            MovementType::Out
        };
        // Both bounds are non-negative i32, so |diff| fits.
        Some((kind, diff.unsigned_abs() as i32))
    }
}

/// Append-only ledger entry for one item's stock change.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "movements")]
#[serde(rename_all = "camelCase")]
#[schema(as = Movement)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_id: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: i32,
    pub date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entities::{
    item,
    movement::{self, MovementType},
};
use crate::errors::ServiceError;

/// Append-only access to the movement ledger.
pub struct MovementRepository;

impl MovementRepository {
    /// Records a quantity change. The magnitude must be positive.
    pub async fn record<C>(
        conn: &C,
        item_id: i32,
        movement_type: MovementType,
        quantity: i32,
    ) -> Result<movement::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        if quantity <= 0 {
            return Err(ServiceError::InternalError(format!(
                "movement quantity must be positive, got {}",
                quantity
            )));
        }
        Self::insert(conn, item_id, movement_type, quantity).await
    }

    /// Records an item's starting stock as an IN movement.
    ///
    /// Written for every new item, so a zero opening quantity is allowed here.
    pub async fn record_opening<C>(
        conn: &C,
        item_id: i32,
        quantity: i32,
    ) -> Result<movement::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        if quantity < 0 {
            return Err(ServiceError::InternalError(format!(
                "opening quantity must not be negative, got {}",
                quantity
            )));
        }
        Self::insert(conn, item_id, MovementType::In, quantity).await
    }

    async fn insert<C>(
        conn: &C,
        item_id: i32,
        movement_type: MovementType,
        quantity: i32,
    ) -> Result<movement::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        let active = movement::ActiveModel {
            item_id: Set(item_id),
            movement_type: Set(movement_type),
            quantity: Set(quantity),
            date: Set(Utc::now()),
            ..Default::default()
        };
        Ok(active.insert(conn).await?)
    }

    pub async fn delete_for_item<C>(conn: &C, item_id: i32) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait,
    {
        let result = movement::Entity::delete_many()
            .filter(movement::Column::ItemId.eq(item_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_for_item<C>(conn: &C, item_id: i32) -> Result<Vec<movement::Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(movement::Entity::find()
            .filter(movement::Column::ItemId.eq(item_id))
            .order_by_asc(movement::Column::Id)
            .all(conn)
            .await?)
    }

    /// Newest movements first (date, then insertion order), each with its item.
    pub async fn recent_with_items<C>(
        conn: &C,
        limit: u64,
    ) -> Result<Vec<(movement::Model, Option<item::Model>)>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(movement::Entity::find()
            .find_also_related(item::Entity)
            .order_by_desc(movement::Column::Date)
            .order_by_desc(movement::Column::Id)
            .limit(limit)
            .all(conn)
            .await?)
    }
}

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;

use crate::dto::items::ItemWithRelations;
use crate::entities::item;
use crate::errors::ServiceError;

use super::{CategoryRepository, LocationRepository, SupplierRepository};

pub struct ItemRepository;

impl ItemRepository {
    pub async fn find_by_id<C>(conn: &C, id: i32) -> Result<Option<item::Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(item::Entity::find_by_id(id).one(conn).await?)
    }

    pub async fn find_by_sku<C>(conn: &C, sku: &str) -> Result<Option<item::Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(item::Entity::find()
            .filter(item::Column::Sku.eq(sku))
            .one(conn)
            .await?)
    }

    pub async fn insert<C>(conn: &C, active: item::ActiveModel) -> Result<item::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(active.insert(conn).await?)
    }

    pub async fn update<C>(conn: &C, active: item::ActiveModel) -> Result<item::Model, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(active.update(conn).await?)
    }

    pub async fn delete_by_id<C>(conn: &C, id: i32) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait,
    {
        let result = item::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }

    /// Every item, ordered by id.
    pub async fn list<C>(conn: &C) -> Result<Vec<item::Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(item::Entity::find()
            .order_by_asc(item::Column::Id)
            .all(conn)
            .await?)
    }

    /// Every item joined with its category, supplier and location.
    ///
    /// Each lookup table is read once with an `IN` query over the ids in use.
    pub async fn list_with_relations<C>(conn: &C) -> Result<Vec<ItemWithRelations>, ServiceError>
    where
        C: ConnectionTrait,
    {
        let items = Self::list(conn).await?;

        let categories =
            CategoryRepository::find_by_ids(conn, items.iter().map(|i| i.category_id)).await?;
        let suppliers =
            SupplierRepository::find_by_ids(conn, items.iter().filter_map(|i| i.supplier_id))
                .await?;
        let locations =
            LocationRepository::find_by_ids(conn, items.iter().filter_map(|i| i.location_id))
                .await?;

        Ok(items
            .into_iter()
            .map(|item| ItemWithRelations {
                category: categories.get(&item.category_id).cloned(),
                supplier: item.supplier_id.and_then(|id| suppliers.get(&id).cloned()),
                location: item.location_id.and_then(|id| locations.get(&id).cloned()),
                item,
            })
            .collect())
    }

    pub async fn count<C>(conn: &C) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(item::Entity::find().count(conn).await?)
    }

    /// Items whose quantity is below their minimum stock level, compared in the store.
    pub async fn count_low_stock<C>(conn: &C) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(item::Entity::find()
            .filter(Expr::col(item::Column::Quantity).lt(Expr::col(item::Column::MinStockLevel)))
            .count(conn)
            .await?)
    }

    /// Number of items per category id. Categories without items are absent.
    pub async fn count_by_category<C>(conn: &C) -> Result<HashMap<i32, i64>, ServiceError>
    where
        C: ConnectionTrait,
    {
        let rows: Vec<(i32, i64)> = item::Entity::find()
            .select_only()
            .column(item::Column::CategoryId)
            .column_as(Expr::col(item::Column::Id).count(), "item_count")
            .group_by(item::Column::CategoryId)
            .into_tuple()
            .all(conn)
            .await?;

        Ok(rows.into_iter().collect())
    }
}

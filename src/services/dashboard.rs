use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

use crate::{
    db::DbPool,
    dto::dashboard::{DashboardSummary, RecentMovement},
    entities::item,
    errors::ServiceError,
    repositories::{ItemRepository, MovementRepository},
};

/// Number of movements listed on the dashboard.
pub const RECENT_MOVEMENTS_LIMIT: u64 = 5;

/// Exact sum of `price * quantity`, rounded to cents.
pub fn total_value<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a item::Model>,
{
    items
        .into_iter()
        .map(item::Model::stock_value)
        .sum::<Decimal>()
        .round_dp(2)
}

/// Computes the dashboard aggregates on every call; nothing is cached.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db_pool;

        let total_items = ItemRepository::count(db).await?;
        let low_stock_items = ItemRepository::count_low_stock(db).await?;
        let items = ItemRepository::list(db).await?;
        let recent_movements = MovementRepository::recent_with_items(db, RECENT_MOVEMENTS_LIMIT)
            .await?
            .into_iter()
            .map(|(movement, item)| RecentMovement { movement, item })
            .collect();

        Ok(DashboardSummary {
            total_items,
            low_stock_items,
            total_value: total_value(&items),
            recent_movements,
        })
    }
}

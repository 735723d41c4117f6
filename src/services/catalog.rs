use std::sync::Arc;
use tracing::instrument;

use crate::{
    db::DbPool,
    dto::catalog::CategoryWithCount,
    entities::{location, supplier},
    errors::ServiceError,
    repositories::{CategoryRepository, ItemRepository, LocationRepository, SupplierRepository},
};

/// Read access to the lookup tables.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        SupplierRepository::list(&*self.db_pool).await
    }

    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<location::Model>, ServiceError> {
        LocationRepository::list(&*self.db_pool).await
    }

    /// Categories with the number of items filed under each.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, ServiceError> {
        let db = &*self.db_pool;
        let categories = CategoryRepository::list(db).await?;
        let counts = ItemRepository::count_by_category(db).await?;

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithCount {
                item_count: counts.get(&category.id).copied().unwrap_or(0),
                category,
            })
            .collect())
    }
}

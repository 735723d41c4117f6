pub mod catalog;
pub mod dashboard;
pub mod items;

use crate::{
    db::DbPool,
    services::{CatalogService, DashboardService, ItemService},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub items: Arc<ItemService>,
    pub dashboard: Arc<DashboardService>,
    pub catalog: Arc<CatalogService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            items: Arc::new(ItemService::new(db_pool.clone())),
            dashboard: Arc::new(DashboardService::new(db_pool.clone())),
            catalog: Arc::new(CatalogService::new(db_pool)),
        }
    }
}

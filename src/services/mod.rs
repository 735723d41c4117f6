pub mod catalog;
pub mod dashboard;
pub mod items;

pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use items::ItemService;

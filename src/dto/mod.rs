//! Request payloads, their coercion into validated drafts, and response shapes.

pub mod catalog;
pub mod dashboard;
pub mod items;

pub use catalog::CategoryWithCount;
pub use dashboard::{DashboardSummary, RecentMovement};
pub use items::{ItemDraft, ItemPayload, ItemWithRelations, MessageResponse, NumberInput};

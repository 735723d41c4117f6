//! SeaORM entities for the inventory store.

pub mod category;
pub mod item;
pub mod location;
pub mod movement;
pub mod supplier;

pub use category::Entity as Category;
pub use item::Entity as Item;
pub use location::Entity as Location;
pub use movement::Entity as Movement;
pub use supplier::Entity as Supplier;

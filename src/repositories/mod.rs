//! Data access for the inventory store.
//!
//! Repository functions are associated functions generic over
//! `ConnectionTrait`, so the same call works on the pool and inside a
//! transaction.

pub mod item_repository;
pub mod lookup_repository;
pub mod movement_repository;

pub use item_repository::ItemRepository;
pub use lookup_repository::{
    CategoryRepository, LocationRepository, LookupRepository, NamedEntity, SupplierRepository,
};
pub use movement_repository::MovementRepository;

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ConnectionTrait, TransactionTrait};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    dto::items::{ItemDraft, ItemWithRelations},
    entities::{
        item,
        movement::{self, MovementType},
    },
    errors::ServiceError,
    metrics,
    repositories::{
        CategoryRepository, ItemRepository, LocationRepository, MovementRepository,
        SupplierRepository,
    },
};

/// Foreign keys resolved from the lookup names in a draft.
///
/// `created` lists the lookup kinds inserted by this resolution, so metrics
/// are only recorded once the surrounding transaction commits.
#[derive(Debug, Default)]
struct ResolvedRefs {
    category_id: Option<i32>,
    supplier_id: Option<i32>,
    location_id: Option<i32>,
    created: Vec<&'static str>,
}

async fn resolve_refs<C>(conn: &C, draft: &ItemDraft) -> Result<ResolvedRefs, ServiceError>
where
    C: ConnectionTrait,
{
    let mut refs = ResolvedRefs::default();

    if let Some(name) = draft.category_name.as_deref() {
        let (category, created) = CategoryRepository::get_or_create(conn, name).await?;
        refs.category_id = Some(category.id);
        if created {
            refs.created.push("category");
        }
    }
    if let Some(name) = draft.supplier_name.as_deref() {
        let (supplier, created) = SupplierRepository::get_or_create(conn, name).await?;
        refs.supplier_id = Some(supplier.id);
        if created {
            refs.created.push("supplier");
        }
    }
    if let Some(name) = draft.location_name.as_deref() {
        let (location, created) = LocationRepository::get_or_create(conn, name).await?;
        refs.location_id = Some(location.id);
        if created {
            refs.created.push("location");
        }
    }

    Ok(refs)
}

/// Outcome of a committed item write, used for post-commit bookkeeping.
struct WriteOutcome {
    item: item::Model,
    movement: Option<movement::Model>,
    created_lookups: Vec<&'static str>,
}

fn record_write(operation: &str, outcome: &WriteOutcome) {
    metrics::record_item_write(operation);
    if let Some(movement) = &outcome.movement {
        metrics::record_movement(movement.movement_type);
    }
    for kind in &outcome.created_lookups {
        metrics::record_lookup_created(kind);
    }
}

/// Item writes. Each operation runs in a single transaction: lookups,
/// the item row and its movement commit together or not at all.
#[derive(Clone)]
pub struct ItemService {
    db_pool: Arc<DbPool>,
}

impl ItemService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Every item with its category, supplier and location.
    #[instrument(skip(self))]
    pub async fn list_with_relations(&self) -> Result<Vec<ItemWithRelations>, ServiceError> {
        ItemRepository::list_with_relations(&*self.db_pool).await
    }

    /// Creates an item and its opening IN movement, zero quantities included.
    #[instrument(skip(self, draft), fields(sku = %draft.sku))]
    pub async fn create(&self, draft: ItemDraft) -> Result<item::Model, ServiceError> {
        if draft.category_name.is_none() {
            return Err(ServiceError::ValidationError(
                "categoryName is required".to_string(),
            ));
        }

        let outcome = self
            .db_pool
            .transaction::<_, WriteOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let refs = resolve_refs(txn, &draft).await?;
                    let category_id = refs.category_id.ok_or_else(|| {
                        ServiceError::ValidationError("categoryName is required".to_string())
                    })?;

                    let now = Utc::now();
                    let item = ItemRepository::insert(
                        txn,
                        item::ActiveModel {
                            name: Set(draft.name),
                            sku: Set(draft.sku),
                            quantity: Set(draft.quantity),
                            price: Set(draft.price),
                            min_stock_level: Set(draft.min_stock_level),
                            category_id: Set(category_id),
                            supplier_id: Set(refs.supplier_id),
                            location_id: Set(refs.location_id),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        },
                    )
                    .await?;

                    let movement =
                        MovementRepository::record_opening(txn, item.id, item.quantity).await?;

                    Ok(WriteOutcome {
                        item,
                        movement: Some(movement),
                        created_lookups: refs.created,
                    })
                })
            })
            .await?;

        record_write("create", &outcome);
        info!(item_id = outcome.item.id, sku = %outcome.item.sku, "Item created");
        Ok(outcome.item)
    }

    /// Replaces an item's fields, logging a movement when the quantity changes.
    ///
    /// Lookup names that are absent or empty keep the current reference.
    #[instrument(skip(self, draft), fields(item_id = id))]
    pub async fn update(&self, id: i32, draft: ItemDraft) -> Result<item::Model, ServiceError> {
        let outcome = self
            .db_pool
            .transaction::<_, WriteOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = ItemRepository::find_by_id(txn, id)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound("Item not found".to_string()))?;

                    let movement = match MovementType::for_change(existing.quantity, draft.quantity)
                    {
                        Some((kind, quantity)) => {
                            Some(MovementRepository::record(txn, id, kind, quantity).await?)
                        }
                        None => None,
                    };

                    let refs = resolve_refs(txn, &draft).await?;

                    let mut active: item::ActiveModel = existing.into();
                    active.name = Set(draft.name);
                    active.sku = Set(draft.sku);
                    active.quantity = Set(draft.quantity);
                    active.price = Set(draft.price);
                    active.min_stock_level = Set(draft.min_stock_level);
                    if let Some(category_id) = refs.category_id {
                        active.category_id = Set(category_id);
                    }
                    if let Some(supplier_id) = refs.supplier_id {
                        active.supplier_id = Set(Some(supplier_id));
                    }
                    if let Some(location_id) = refs.location_id {
                        active.location_id = Set(Some(location_id));
                    }
                    active.updated_at = Set(Utc::now());

                    let item = ItemRepository::update(txn, active).await?;

                    Ok(WriteOutcome {
                        item,
                        movement,
                        created_lookups: refs.created,
                    })
                })
            })
            .await?;

        record_write("update", &outcome);
        info!(item_id = id, "Item updated");
        Ok(outcome.item)
    }

    /// Deletes an item together with its movements.
    #[instrument(skip(self), fields(item_id = id))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let removed_movements = self
            .db_pool
            .transaction::<_, u64, ServiceError>(move |txn| {
                Box::pin(async move {
                    if ItemRepository::find_by_id(txn, id).await?.is_none() {
                        return Err(ServiceError::NotFound("Item not found".to_string()));
                    }

                    let removed = MovementRepository::delete_for_item(txn, id).await?;
                    ItemRepository::delete_by_id(txn, id).await?;
                    Ok(removed)
                })
            })
            .await?;

        metrics::record_item_write("delete");
        info!(item_id = id, removed_movements, "Item deleted");
        Ok(())
    }

    /// Whether an item with this SKU exists.
    pub async fn sku_exists(&self, sku: &str) -> Result<bool, ServiceError> {
        Ok(ItemRepository::find_by_sku(&*self.db_pool, sku)
            .await?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use crate::entities::category;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{EntityTrait, PaginatorTrait};

    async fn service() -> (ItemService, Arc<DbPool>) {
        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();
        let pool = Arc::new(pool);
        (ItemService::new(pool.clone()), pool)
    }

    fn draft(sku: &str, quantity: i32) -> ItemDraft {
        ItemDraft {
            name: "Hex bolt".into(),
            sku: sku.into(),
            category_name: Some("Fasteners".into()),
            supplier_name: Some("Acme".into()),
            location_name: None,
            quantity,
            price: dec!(0.25),
            min_stock_level: 10,
        }
    }

    #[tokio::test]
    async fn create_then_update_logs_movements() {
        let (svc, pool) = service().await;

        let item = svc.create(draft("HB-1", 40)).await.unwrap();
        assert_eq!(item.quantity, 40);
        assert!(item.supplier_id.is_some());
        assert_eq!(item.location_id, None);

        svc.update(item.id, draft("HB-1", 15)).await.unwrap();

        let movements = MovementRepository::list_for_item(&*pool, item.id)
            .await
            .unwrap();
        let summary: Vec<_> = movements
            .iter()
            .map(|m| (m.movement_type, m.quantity))
            .collect();
        assert_eq!(
            summary,
            vec![(MovementType::In, 40), (MovementType::Out, 25)]
        );
    }

    #[tokio::test]
    async fn zero_quantity_create_writes_opening_movement() {
        let (svc, pool) = service().await;
        let item = svc.create(draft("HB-0", 0)).await.unwrap();
        let movements = MovementRepository::list_for_item(&*pool, item.id)
            .await
            .unwrap();
        let summary: Vec<_> = movements
            .iter()
            .map(|m| (m.movement_type, m.quantity))
            .collect();
        assert_eq!(summary, vec![(MovementType::In, 0)]);

        // Restocking from zero is an ordinary IN change.
        svc.update(item.id, draft("HB-0", 6)).await.unwrap();
        let movements = MovementRepository::list_for_item(&*pool, item.id)
            .await
            .unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[1].quantity, 6);
    }

    #[tokio::test]
    async fn change_movements_must_be_positive() {
        let (svc, pool) = service().await;
        let item = svc.create(draft("HB-1", 1)).await.unwrap();
        assert_matches!(
            MovementRepository::record(&*pool, item.id, MovementType::Out, 0).await,
            Err(ServiceError::InternalError(_))
        );
        assert_matches!(
            MovementRepository::record_opening(&*pool, item.id, -1).await,
            Err(ServiceError::InternalError(_))
        );
    }

    #[tokio::test]
    async fn duplicate_sku_rolls_back_new_lookups() {
        let (svc, pool) = service().await;
        svc.create(draft("HB-1", 5)).await.unwrap();

        let mut dup = draft("HB-1", 5);
        dup.category_name = Some("Brand new".into());
        let err = svc.create(dup).await.unwrap_err();
        assert_matches!(err, ServiceError::Conflict(_));

        let categories = category::Entity::find().count(&*pool).await.unwrap();
        assert_eq!(categories, 1);
    }

    #[tokio::test]
    async fn update_and_delete_missing_item_are_not_found() {
        let (svc, _pool) = service().await;
        assert_matches!(
            svc.update(999, draft("X", 1)).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(svc.delete(999).await, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_without_lookup_names_keeps_references() {
        let (svc, _pool) = service().await;
        let item = svc.create(draft("HB-1", 5)).await.unwrap();

        let mut change = draft("HB-1", 5);
        change.category_name = None;
        change.supplier_name = None;
        let updated = svc.update(item.id, change).await.unwrap();

        assert_eq!(updated.category_id, item.category_id);
        assert_eq!(updated.supplier_id, item.supplier_id);
    }
}

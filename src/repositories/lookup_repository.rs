use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
};
use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use tracing::debug;

use crate::entities::{category, location, supplier};
use crate::errors::ServiceError;

/// A lookup table keyed by a unique `name` column.
pub trait NamedEntity: EntityTrait {
    /// Label used in logs and metrics.
    const KIND: &'static str;

    type Active: ActiveModelTrait<Entity = Self> + Send;

    fn id_column() -> Self::Column;
    fn name_column() -> Self::Column;
    fn active_model_named(name: &str) -> Self::Active;
    fn model_id(model: &Self::Model) -> i32;
}

macro_rules! named_entity {
    ($module:ident, $kind:literal) => {
        impl NamedEntity for $module::Entity {
            const KIND: &'static str = $kind;

            type Active = $module::ActiveModel;

            fn id_column() -> Self::Column {
                $module::Column::Id
            }

            fn name_column() -> Self::Column {
                $module::Column::Name
            }

            fn active_model_named(name: &str) -> Self::Active {
                $module::ActiveModel {
                    name: Set(name.to_owned()),
                    ..Default::default()
                }
            }

            fn model_id(model: &Self::Model) -> i32 {
                model.id
            }
        }
    };
}

named_entity!(category, "category");
named_entity!(supplier, "supplier");
named_entity!(location, "location");

/// Find-or-create access to a [`NamedEntity`] table.
pub struct LookupRepository<E>(PhantomData<E>);

pub type CategoryRepository = LookupRepository<category::Entity>;
pub type SupplierRepository = LookupRepository<supplier::Entity>;
pub type LocationRepository = LookupRepository<location::Entity>;

impl<E> LookupRepository<E>
where
    E: NamedEntity,
    E::Model: IntoActiveModel<E::Active> + Send + Sync,
{
    /// Returns the row named exactly `name`, creating it if absent.
    ///
    /// The insert is `ON CONFLICT (name) DO NOTHING`, so concurrent callers
    /// racing on a new name all end up reading the single row that won. The
    /// flag is true when this call inserted the row.
    pub async fn get_or_create<C>(conn: &C, name: &str) -> Result<(E::Model, bool), ServiceError>
    where
        C: ConnectionTrait,
    {
        let inserted = E::insert(E::active_model_named(name))
            .on_conflict(OnConflict::column(E::name_column()).do_nothing().to_owned())
            .exec_without_returning(conn)
            .await?;

        let model = Self::find_by_name(conn, name).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("{} {:?} vanished after upsert", E::KIND, name))
        })?;

        let created = inserted > 0;
        if created {
            debug!(kind = E::KIND, name, "created lookup row");
        }
        Ok((model, created))
    }

    pub async fn find_by_name<C>(conn: &C, name: &str) -> Result<Option<E::Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(E::find()
            .filter(E::name_column().eq(name))
            .one(conn)
            .await?)
    }

    /// All rows, ordered by id.
    pub async fn list<C>(conn: &C) -> Result<Vec<E::Model>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(E::find().order_by_asc(E::id_column()).all(conn).await?)
    }

    /// Rows for the given ids, keyed by id. Unknown ids are absent from the map.
    pub async fn find_by_ids<C, I>(conn: &C, ids: I) -> Result<HashMap<i32, E::Model>, ServiceError>
    where
        C: ConnectionTrait,
        I: IntoIterator<Item = i32>,
    {
        let ids: BTreeSet<i32> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = E::find()
            .filter(E::id_column().is_in(ids))
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|model| (E::model_id(&model), model))
            .collect())
    }
}

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_lookup_tables::Migration),
            Box::new(m20240601_000002_create_items_table::Migration),
            Box::new(m20240601_000003_create_movements_table::Migration),
        ]
    }
}

mod m20240601_000001_create_lookup_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_lookup_tables"
        }
    }

    /// Categories, suppliers and locations share one shape: a surrogate id
    /// and a unique name.
    fn lookup_table<T: IntoIden + Copy + 'static>(
        table: T,
        id: T,
        name: T,
    ) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(
                ColumnDef::new(id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(name).string().not_null().unique_key())
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(lookup_table(
                    Categories::Table,
                    Categories::Id,
                    Categories::Name,
                ))
                .await?;
            manager
                .create_table(lookup_table(
                    Suppliers::Table,
                    Suppliers::Id,
                    Suppliers::Name,
                ))
                .await?;
            manager
                .create_table(lookup_table(
                    Locations::Table,
                    Locations::Id,
                    Locations::Name,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Categories {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Locations {
        Table,
        Id,
        Name,
    }
}

mod m20240601_000002_create_items_table {
    use super::m20240601_000001_create_lookup_tables::{Categories, Locations, Suppliers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Foreign keys are declared inline so the statement also works on SQLite.
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Sku).string().not_null().unique_key())
                        .col(
                            ColumnDef::new(Items::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::MinStockLevel)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Items::CategoryId).integer().not_null())
                        .col(ColumnDef::new(Items::SupplierId).integer().null())
                        .col(ColumnDef::new(Items::LocationId).integer().null())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_category_id")
                                .from(Items::Table, Items::CategoryId)
                                .to(Categories::Table, Categories::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_supplier_id")
                                .from(Items::Table, Items::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_location_id")
                                .from(Items::Table, Items::LocationId)
                                .to(Locations::Table, Locations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_category_id")
                        .table(Items::Table)
                        .col(Items::CategoryId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        Name,
        Sku,
        Quantity,
        Price,
        MinStockLevel,
        CategoryId,
        SupplierId,
        LocationId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_movements_table {
    use super::m20240601_000002_create_items_table::Items;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // No ON DELETE CASCADE: the item delete path removes movements explicitly.
            manager
                .create_table(
                    Table::create()
                        .table(Movements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Movements::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Movements::ItemId).integer().not_null())
                        .col(ColumnDef::new(Movements::Type).string_len(3).not_null())
                        .col(ColumnDef::new(Movements::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(Movements::Date)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_movements_item_id")
                                .from(Movements::Table, Movements::ItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_item_id")
                        .table(Movements::Table)
                        .col(Movements::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_movements_date")
                        .table(Movements::Table)
                        .col(Movements::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Movements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Movements {
        Table,
        Id,
        ItemId,
        Type,
        Quantity,
        Date,
    }
}

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_products_table::Migration),
            Box::new(m20240101_000002_create_product_history_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(
                            ColumnDef::new(Products::Kind)
                                .string_len(16)
                                .not_null()
                                .default("product"),
                        )
                        .col(ColumnDef::new(Products::ImportPrice).decimal().not_null())
                        .col(ColumnDef::new(Products::SellPrice).decimal().not_null())
                        .col(
                            ColumnDef::new(Products::ImportQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::SoldQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // List endpoint sorts on creation time
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_created_at")
                        .table(Products::Table)
                        .col(Products::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Kind,
        ImportPrice,
        SellPrice,
        ImportQuantity,
        SoldQuantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_product_history_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_product_history_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // No foreign key to products: the reference is weak and history
            // must survive product deletion.
            manager
                .create_table(
                    Table::create()
                        .table(ProductHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductHistory::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductHistory::ChangeType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductHistory::PreviousValues).json().null())
                        .col(ColumnDef::new(ProductHistory::NewValues).json().null())
                        .col(ColumnDef::new(ProductHistory::Note).string().null())
                        .col(
                            ColumnDef::new(ProductHistory::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // History is always read per product, newest first
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_product_history_product_id_created_at")
                        .table(ProductHistory::Table)
                        .col(ProductHistory::ProductId)
                        .col(ProductHistory::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductHistory {
        Table,
        Id,
        ProductId,
        ChangeType,
        PreviousValues,
        NewValues,
        Note,
        CreatedAt,
    }
}

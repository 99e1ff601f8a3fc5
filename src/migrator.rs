use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_production_orders_table::Migration),
            Box::new(m20240301_000002_create_production_order_lines_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_production_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_production_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::ExternalId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::OrderNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::CompanyName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::OrderDate).timestamp())
                        .col(ColumnDef::new(ProductionOrders::DeliveryDate).timestamp())
                        .col(
                            ColumnDef::new(ProductionOrders::TotalAmount)
                                .decimal_len(18, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::Currency)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                        .col(ColumnDef::new(ProductionOrders::ImportedBy).uuid())
                        .col(
                            ColumnDef::new(ProductionOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::UpdatedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_production_orders_external_id")
                        .table(ProductionOrders::Table)
                        .col(ProductionOrders::ExternalId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ProductionOrders {
        Table,
        Id,
        ExternalId,
        OrderNumber,
        CompanyName,
        OrderDate,
        DeliveryDate,
        TotalAmount,
        Currency,
        Status,
        ImportedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_production_order_lines_table {

    use sea_orm_migration::prelude::*;

    use super::m20240301_000001_create_production_orders_table::ProductionOrders;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_production_order_lines_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrderLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::OrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::ExternalId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::Code)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::Name)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::ModelCode)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrderLines::Unit).string())
                        .col(
                            ColumnDef::new(ProductionOrderLines::UnitPrice)
                                .decimal_len(18, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::LineTotal)
                                .decimal_len(18, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrderLines::Note1).string())
                        .col(ColumnDef::new(ProductionOrderLines::Note2).string())
                        .col(ColumnDef::new(ProductionOrderLines::Note3).string())
                        .col(ColumnDef::new(ProductionOrderLines::Note4).string())
                        .col(ColumnDef::new(ProductionOrderLines::RecipeName).string())
                        .col(ColumnDef::new(ProductionOrderLines::DeliveryDate).timestamp())
                        .col(
                            ColumnDef::new(ProductionOrderLines::Sequence)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrderLines::UpdatedAt)
                                .timestamp_with_time_zone(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_production_order_lines_order")
                                .from(
                                    ProductionOrderLines::Table,
                                    ProductionOrderLines::OrderId,
                                )
                                .to(ProductionOrders::Table, ProductionOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_production_order_lines_order_id")
                        .table(ProductionOrderLines::Table)
                        .col(ProductionOrderLines::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionOrderLines::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ProductionOrderLines {
        Table,
        Id,
        OrderId,
        ExternalId,
        Code,
        Name,
        ModelCode,
        Quantity,
        Unit,
        UnitPrice,
        LineTotal,
        Note1,
        Note2,
        Note3,
        Note4,
        RecipeName,
        DeliveryDate,
        Sequence,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

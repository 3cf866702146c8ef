#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_catalog_tables::Migration),
            Box::new(m20260101_000002_create_merch_table::Migration),
            Box::new(m20260101_000003_create_cart_tables::Migration),
            Box::new(m20260101_000004_create_order_tables::Migration),
            Box::new(m20260101_000005_create_contact_messages_table::Migration),
        ]
    }
}

mod m20260101_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Artists::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Artists::Id).string().primary_key().not_null())
                        .col(ColumnDef::new(Artists::Name).string().not_null())
                        .col(ColumnDef::new(Artists::Country).string().null())
                        .col(ColumnDef::new(Artists::Bio).text().null())
                        .col(
                            ColumnDef::new(Artists::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Artists::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Labels::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Labels::Id).string().primary_key().not_null())
                        .col(ColumnDef::new(Labels::Name).string().not_null())
                        .col(ColumnDef::new(Labels::Country).string().null())
                        .col(
                            ColumnDef::new(Labels::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Labels::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Releases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Releases::Id)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Releases::Title).string().not_null())
                        .col(ColumnDef::new(Releases::ArtistId).string().not_null())
                        .col(ColumnDef::new(Releases::LabelId).string().null())
                        .col(ColumnDef::new(Releases::CatalogNumber).string().null())
                        .col(ColumnDef::new(Releases::Barcode).string().null())
                        .col(ColumnDef::new(Releases::ReleaseDate).string().null())
                        .col(ColumnDef::new(Releases::CoverUrl).string().null())
                        .col(ColumnDef::new(Releases::Mbid).string().null())
                        .col(ColumnDef::new(Releases::Country).string().null())
                        .col(ColumnDef::new(Releases::Description).text().null())
                        .col(
                            ColumnDef::new(Releases::IsArchived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Releases::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Releases::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_releases_artist")
                                .from(Releases::Table, Releases::ArtistId)
                                .to(Artists::Table, Artists::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_releases_label")
                                .from(Releases::Table, Releases::LabelId)
                                .to(Labels::Table, Labels::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReleaseFormats::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReleaseFormats::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReleaseFormats::ReleaseId).string().not_null())
                        .col(ColumnDef::new(ReleaseFormats::Sku).string().not_null())
                        .col(ColumnDef::new(ReleaseFormats::FormatType).string().not_null())
                        .col(ColumnDef::new(ReleaseFormats::Variant).string().null())
                        .col(
                            ColumnDef::new(ReleaseFormats::Price)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReleaseFormats::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ReleaseFormats::StripePriceId).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_release_formats_release")
                                .from(ReleaseFormats::Table, ReleaseFormats::ReleaseId)
                                .to(Releases::Table, Releases::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // SKUs are unique within one release
            manager
                .create_index(
                    Index::create()
                        .name("uq_release_formats_release_sku")
                        .table(ReleaseFormats::Table)
                        .col(ReleaseFormats::ReleaseId)
                        .col(ReleaseFormats::Sku)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReleaseFormats::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Releases::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Labels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Artists::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Artists {
        Table,
        Id,
        Name,
        Country,
        Bio,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Labels {
        Table,
        Id,
        Name,
        Country,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Releases {
        Table,
        Id,
        Title,
        ArtistId,
        LabelId,
        CatalogNumber,
        Barcode,
        ReleaseDate,
        CoverUrl,
        Mbid,
        Country,
        Description,
        IsArchived,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum ReleaseFormats {
        Table,
        Id,
        ReleaseId,
        Sku,
        FormatType,
        Variant,
        Price,
        Stock,
        StripePriceId,
    }
}

mod m20260101_000002_create_merch_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_merch_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MerchItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MerchItems::Id)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MerchItems::Name).string().not_null())
                        .col(
                            ColumnDef::new(MerchItems::Price)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MerchItems::Stock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(MerchItems::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(MerchItems::IsArchived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(MerchItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MerchItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MerchItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum MerchItems {
        Table,
        Id,
        Name,
        Price,
        Stock,
        ImageUrl,
        IsArchived,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260101_000003_create_cart_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_cart_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Carts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Carts::UserId)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Carts::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Carts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CartItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CartItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CartItems::CartUserId).string().not_null())
                        .col(ColumnDef::new(CartItems::ReleaseId).string().not_null())
                        .col(ColumnDef::new(CartItems::Sku).string().not_null())
                        .col(ColumnDef::new(CartItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(CartItems::UnitPrice)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CartItems::Title).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cart_items_cart")
                                .from(CartItems::Table, CartItems::CartUserId)
                                .to(Carts::Table, Carts::UserId)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CartItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Carts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Carts {
        Table,
        UserId,
        Currency,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum CartItems {
        Table,
        Id,
        CartUserId,
        ReleaseId,
        Sku,
        Quantity,
        UnitPrice,
        Title,
    }
}

mod m20260101_000004_create_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::UserId).string().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::Currency).string().not_null())
                        .col(
                            ColumnDef::new(Orders::Subtotal)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippingTotal)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::TaxTotal)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::GrandTotal)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::CustomerName).string().null())
                        .col(ColumnDef::new(Orders::CustomerEmail).string().null())
                        .col(ColumnDef::new(Orders::PaymentProvider).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentIntentId).string().null())
                        .col(
                            ColumnDef::new(Orders::CheckoutSessionId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ReleaseId).string().not_null())
                        .col(ColumnDef::new(OrderItems::Sku).string().not_null())
                        .col(ColumnDef::new(OrderItems::Title).string().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Subtotal)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        UserId,
        Status,
        Currency,
        Subtotal,
        ShippingTotal,
        TaxTotal,
        GrandTotal,
        CustomerName,
        CustomerEmail,
        PaymentProvider,
        PaymentStatus,
        PaymentIntentId,
        CheckoutSessionId,
        CreatedAt,
    }

    #[derive(Iden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ReleaseId,
        Sku,
        Title,
        Quantity,
        UnitPrice,
        Subtotal,
    }
}

mod m20260101_000005_create_contact_messages_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000005_create_contact_messages_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ContactMessages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContactMessages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContactMessages::Name).string().not_null())
                        .col(ColumnDef::new(ContactMessages::Email).string().not_null())
                        .col(ColumnDef::new(ContactMessages::Subject).string().null())
                        .col(ColumnDef::new(ContactMessages::Body).text().not_null())
                        .col(
                            ColumnDef::new(ContactMessages::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ContactMessages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ContactMessages::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ContactMessages {
        Table,
        Id,
        Name,
        Email,
        Subject,
        Body,
        IsRead,
        CreatedAt,
    }
}

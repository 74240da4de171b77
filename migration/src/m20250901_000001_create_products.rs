use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    Title,
    Description,
    ArtistName,
    ProducerName,
    LabelName,
    Category,
    Genre,
    TotalBudget,
    CurrentFunding,
    MinimumInvestment,
    CoverImage,
    AlbumArt,
    PosterImage,
    VideoThumbnail,
    VideoFile,
    GalleryImages,
    DemoTrack,
    FullTrack,
    ExpectedDuration,
    Status,
    TargetAudience,
    IsFeatured,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Description).text().not_null())
                    .col(ColumnDef::new(Products::ArtistName).string_len(255).not_null())
                    .col(ColumnDef::new(Products::ProducerName).string_len(255).null())
                    .col(ColumnDef::new(Products::LabelName).string_len(255).null())
                    .col(ColumnDef::new(Products::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Products::Genre).string_len(32).null())
                    // 金额均为美分
                    .col(ColumnDef::new(Products::TotalBudget).big_integer().not_null())
                    .col(
                        ColumnDef::new(Products::CurrentFunding)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Products::MinimumInvestment)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::CoverImage).string_len(512).null())
                    .col(ColumnDef::new(Products::AlbumArt).string_len(512).null())
                    .col(ColumnDef::new(Products::PosterImage).string_len(512).null())
                    .col(ColumnDef::new(Products::VideoThumbnail).string_len(512).null())
                    .col(ColumnDef::new(Products::VideoFile).string_len(512).null())
                    .col(ColumnDef::new(Products::GalleryImages).json().not_null())
                    .col(ColumnDef::new(Products::DemoTrack).string_len(512).null())
                    .col(ColumnDef::new(Products::FullTrack).string_len(512).null())
                    .col(ColumnDef::new(Products::ExpectedDuration).string_len(64).null())
                    .col(
                        ColumnDef::new(Products::Status)
                            .string_len(32)
                            .not_null()
                            .default("funding"),
                    )
                    .col(ColumnDef::new(Products::TargetAudience).json().not_null())
                    .col(
                        ColumnDef::new(Products::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Products::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Products::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_category")
                    .table(Products::Table)
                    .col(Products::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_status")
                    .table(Products::Table)
                    .col(Products::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_created_at")
                    .table(Products::Table)
                    .col(Products::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

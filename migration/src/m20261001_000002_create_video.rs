use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Video::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Video::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Video::VideoUrl).string().not_null())
                    .col(ColumnDef::new(Video::VideoPublicId).string().not_null())
                    .col(ColumnDef::new(Video::ThumbnailUrl).string().not_null())
                    .col(ColumnDef::new(Video::ThumbnailPublicId).string().not_null())
                    .col(ColumnDef::new(Video::Title).string().not_null())
                    .col(ColumnDef::new(Video::Description).text().not_null())
                    .col(
                        ColumnDef::new(Video::Duration)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Video::Views)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Video::IsPublished)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Video::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Video::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_owner")
                            .from(Video::Table, Video::OwnerId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Channel feeds filter by owner and sort by creation time
        manager
            .create_index(
                Index::create()
                    .name("idx_video_owner_created_at")
                    .table(Video::Table)
                    .col(Video::OwnerId)
                    .col(Video::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_video_created_at")
                    .table(Video::Table)
                    .col(Video::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Video {
    Table,
    Id,
    OwnerId,
    VideoUrl,
    VideoPublicId,
    ThumbnailUrl,
    ThumbnailPublicId,
    Title,
    Description,
    Duration,
    Views,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
}

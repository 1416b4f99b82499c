use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WatchHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WatchHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WatchHistory::AccountId).uuid().not_null())
                    .col(ColumnDef::new(WatchHistory::VideoId).uuid().not_null())
                    .col(
                        ColumnDef::new(WatchHistory::WatchedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watch_history_account")
                            .from(WatchHistory::Table, WatchHistory::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Set semantics: one entry per (account, video)
        manager
            .create_index(
                Index::create()
                    .name("uq_watch_history_account_video")
                    .table(WatchHistory::Table)
                    .col(WatchHistory::AccountId)
                    .col(WatchHistory::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_history_account_watched_at")
                    .table(WatchHistory::Table)
                    .col(WatchHistory::AccountId)
                    .col(WatchHistory::WatchedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WatchHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WatchHistory {
    Table,
    Id,
    AccountId,
    VideoId,
    WatchedAt,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
}

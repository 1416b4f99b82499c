pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_account;
mod m20261001_000002_create_video;
mod m20261001_000003_create_comment;
mod m20261001_000004_create_post;
mod m20261001_000005_create_likes;
mod m20261001_000006_create_subscription;
mod m20261001_000007_create_watch_history;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_account::Migration),
            Box::new(m20261001_000002_create_video::Migration),
            Box::new(m20261001_000003_create_comment::Migration),
            Box::new(m20261001_000004_create_post::Migration),
            Box::new(m20261001_000005_create_likes::Migration),
            Box::new(m20261001_000006_create_subscription::Migration),
            Box::new(m20261001_000007_create_watch_history::Migration),
        ]
    }
}

//! Create `priority` table.
//!
//! Reference entity ranking tasks; optional on a task.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Priority::Table)
                    .if_not_exists()
                    .col(pk_auto(Priority::Id))
                    .col(string_len(Priority::Name, 100).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Priority::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Priority { Table, Id, Name }

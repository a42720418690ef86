//! Create `subtask` table; rows are removed together with their task.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subtask::Table)
                    .if_not_exists()
                    .col(pk_auto(Subtask::Id))
                    .col(integer(Subtask::TaskId).not_null())
                    .col(string_len(Subtask::Title, 200).not_null())
                    .col(string_len(Subtask::Status, 50).not_null())
                    .col(timestamp_with_time_zone(Subtask::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subtask_task")
                            .from(Subtask::Table, Subtask::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Subtask::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subtask { Table, Id, TaskId, Title, Status, CreatedAt }

#[derive(DeriveIden)]
enum Task { Table, Id }

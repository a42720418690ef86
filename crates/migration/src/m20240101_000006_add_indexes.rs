use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Task: foreign keys used by joins and detach-on-delete
        manager
            .create_index(
                Index::create()
                    .name("idx_task_priority")
                    .table(Task::Table)
                    .col(Task::PriorityId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_task_category")
                    .table(Task::Table)
                    .col(Task::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Task: created_at drives dashboard year counts
        manager
            .create_index(
                Index::create()
                    .name("idx_task_created_at")
                    .table(Task::Table)
                    .col(Task::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Subtask / Note: parent lookups for cascades
        manager
            .create_index(
                Index::create()
                    .name("idx_subtask_task")
                    .table(Subtask::Table)
                    .col(Subtask::TaskId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_note_task")
                    .table(Note::Table)
                    .col(Note::TaskId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_task_priority").table(Task::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_task_category").table(Task::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_task_created_at").table(Task::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_subtask_task").table(Subtask::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_note_task").table(Note::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Task { Table, PriorityId, CategoryId, CreatedAt }

#[derive(DeriveIden)]
enum Subtask { Table, TaskId }

#[derive(DeriveIden)]
enum Note { Table, TaskId }

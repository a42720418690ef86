//! Create `task` table.
//!
//! Aggregate root for subtasks and notes. Priority and category references are
//! optional and detached (set to NULL) when the referenced row goes away.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::Id))
                    .col(string_len(Task::Title, 200).not_null())
                    .col(text(Task::Description).not_null())
                    .col(string_len(Task::Status, 50).not_null())
                    .col(timestamp_with_time_zone(Task::Deadline).not_null())
                    .col(timestamp_with_time_zone(Task::CreatedAt).not_null())
                    .col(integer_null(Task::PriorityId))
                    .col(integer_null(Task::CategoryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_priority")
                            .from(Task::Table, Task::PriorityId)
                            .to(Priority::Table, Priority::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_category")
                            .from(Task::Table, Task::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Task::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
    Title,
    Description,
    Status,
    Deadline,
    CreatedAt,
    PriorityId,
    CategoryId,
}

#[derive(DeriveIden)]
enum Priority { Table, Id }

#[derive(DeriveIden)]
enum Category { Table, Id }

//! Create `note` table.
//! Free-text notes attached to a task, removed together with it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Note::Table)
                    .if_not_exists()
                    .col(pk_auto(Note::Id))
                    .col(integer(Note::TaskId).not_null())
                    .col(text(Note::Content).not_null())
                    .col(timestamp_with_time_zone(Note::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_note_task")
                            .from(Note::Table, Note::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Note::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Note { Table, Id, TaskId, Content, CreatedAt }

#[derive(DeriveIden)]
enum Task { Table, Id }

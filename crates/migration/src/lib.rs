//! Migrator registering entity-specific migrations in dependency order.
//! Reference tables come first, the task aggregate next, indexes last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_category;
mod m20240101_000002_create_priority;
mod m20240101_000003_create_task;
mod m20240101_000004_create_subtask;
mod m20240101_000005_create_note;
mod m20240101_000006_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_category::Migration),
            Box::new(m20240101_000002_create_priority::Migration),
            Box::new(m20240101_000003_create_task::Migration),
            Box::new(m20240101_000004_create_subtask::Migration),
            Box::new(m20240101_000005_create_note::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000006_add_indexes::Migration),
        ]
    }
}

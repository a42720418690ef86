#![cfg(test)]
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::status::StatusSet;
use sea_orm::DatabaseConnection;

use crate::task_service::{self, TaskInput};

/// Fresh in-memory database with every migration applied.
///
/// Each call gets its own database, so tests never see each other's rows.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().fixed_offset()
}

pub fn task_input(title: &str) -> TaskInput {
    TaskInput {
        title: title.into(),
        description: format!("{title} details"),
        status: "Pending".into(),
        deadline: at(2030, 1, 15),
        priority_id: None,
        category_id: None,
    }
}

pub async fn make_task(db: &DatabaseConnection, title: &str) -> Result<models::task::Model, anyhow::Error> {
    Ok(task_service::create_task(db, &StatusSet::default(), &task_input(title)).await?)
}

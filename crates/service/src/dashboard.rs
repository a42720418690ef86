//! Landing-page summary: row counts per entity and for the current year.

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};
use models::{category, note, priority, subtask, task};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::debug;

use crate::errors::ServiceError;
use crate::task_service::{self, TaskRow};

/// Number of tasks shown in the "recent" panel.
pub const RECENT_TASKS: u64 = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub categories: u64,
    pub priorities: u64,
    pub tasks: u64,
    pub subtasks: u64,
    pub notes: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct YearCounts {
    pub tasks: u64,
    pub subtasks: u64,
    pub notes: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DashboardSummary {
    pub year: i32,
    pub totals: EntityCounts,
    pub this_year: YearCounts,
    pub recent_tasks: Vec<TaskRow>,
}

/// Half-open `[Jan 1, next Jan 1)` range of `now`'s year in its own offset, as UTC instants.
pub fn year_bounds(now: DateTime<FixedOffset>) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), ServiceError> {
    let tz = *now.offset();
    let start_of = |year: i32| {
        tz.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .map(|dt| dt.with_timezone(&Utc).fixed_offset())
            .ok_or_else(|| ServiceError::Validation(format!("no start of year {year} in offset {tz}")))
    };
    Ok((start_of(now.year())?, start_of(now.year() + 1)?))
}

/// Summary for the current moment in the server time zone.
pub async fn compute_summary(db: &DatabaseConnection, tz: FixedOffset) -> Result<DashboardSummary, ServiceError> {
    compute_summary_at(db, Utc::now().with_timezone(&tz)).await
}

pub async fn compute_summary_at(db: &DatabaseConnection, now: DateTime<FixedOffset>) -> Result<DashboardSummary, ServiceError> {
    let (start, end) = year_bounds(now)?;

    let totals = EntityCounts {
        categories: category::Entity::find().count(db).await?,
        priorities: priority::Entity::find().count(db).await?,
        tasks: task::Entity::find().count(db).await?,
        subtasks: subtask::Entity::find().count(db).await?,
        notes: note::Entity::find().count(db).await?,
    };

    let this_year = YearCounts {
        tasks: task::Entity::find()
            .filter(task::Column::CreatedAt.gte(start))
            .filter(task::Column::CreatedAt.lt(end))
            .count(db)
            .await?,
        subtasks: subtask::Entity::find()
            .filter(subtask::Column::CreatedAt.gte(start))
            .filter(subtask::Column::CreatedAt.lt(end))
            .count(db)
            .await?,
        notes: note::Entity::find()
            .filter(note::Column::CreatedAt.gte(start))
            .filter(note::Column::CreatedAt.lt(end))
            .count(db)
            .await?,
    };

    let recent = task::Entity::find()
        .order_by_desc(task::Column::CreatedAt)
        .order_by_desc(task::Column::Id)
        .limit(RECENT_TASKS)
        .all(db)
        .await?;
    let recent_tasks = task_service::to_rows(db, recent).await?;

    debug!(year = now.year(), tasks = totals.tasks, tasks_this_year = this_year.tasks, "computed dashboard");
    Ok(DashboardSummary { year: now.year(), totals, this_year, recent_tasks })
}

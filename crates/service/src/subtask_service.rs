use chrono::Utc;
use models::status::StatusSet;
use models::{subtask, task};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, JoinType, NotSet, QuerySelect, RelationTrait, Select, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::query::{self, ListParams, Listing, QuerySpec, Queryable};
use crate::task_service::task_titles;

impl Queryable for subtask::Entity {
    const SPEC: QuerySpec = QuerySpec {
        sort_keys: &["task__title", "title", "status", "created_at", "-created_at"],
        default_sort: "-created_at",
        search_fields: &["title", "status", "task__title"],
    };

    fn field(path: &str) -> Option<SimpleExpr> {
        let expr = match path {
            "id" => Expr::col((subtask::Entity, subtask::Column::Id)),
            "title" => Expr::col((subtask::Entity, subtask::Column::Title)),
            "status" => Expr::col((subtask::Entity, subtask::Column::Status)),
            "created_at" => Expr::col((subtask::Entity, subtask::Column::CreatedAt)),
            "task__title" => Expr::col((task::Entity, task::Column::Title)),
            _ => return None,
        };
        Some(expr.into())
    }

    fn with_joins(select: Select<Self>) -> Select<Self> {
        select.join(JoinType::InnerJoin, subtask::Relation::Task.def())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SubtaskInput {
    pub task_id: i32,
    pub title: String,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubtaskRow {
    #[serde(flatten)]
    pub subtask: subtask::Model,
    pub task_title: Option<String>,
}

async fn validate(db: &DatabaseConnection, statuses: &StatusSet, input: &SubtaskInput) -> Result<(String, String), ServiceError> {
    let title = subtask::validate_title(&input.title)?;
    let status = statuses.validate(&input.status)?;
    if task::Entity::find_by_id(input.task_id).one(db).await?.is_none() {
        return Err(ServiceError::missing_reference("task", input.task_id));
    }
    Ok((title, status))
}

pub async fn list_subtasks(db: &DatabaseConnection, params: &ListParams) -> Result<Listing<SubtaskRow>, ServiceError> {
    let listing = query::fetch::<subtask::Entity>(db, params).await?;
    let titles = task_titles(db, listing.items.iter().map(|s| s.task_id).collect()).await?;
    Ok(listing.map(|subtask| SubtaskRow { task_title: titles.get(&subtask.task_id).cloned(), subtask }))
}

pub async fn get_subtask(db: &DatabaseConnection, id: i32) -> Result<subtask::Model, ServiceError> {
    subtask::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("subtask", id))
}

pub async fn create_subtask(db: &DatabaseConnection, statuses: &StatusSet, input: &SubtaskInput) -> Result<subtask::Model, ServiceError> {
    let (title, status) = validate(db, statuses, input).await?;
    let am = subtask::ActiveModel {
        id: NotSet,
        task_id: Set(input.task_id),
        title: Set(title),
        status: Set(status),
        created_at: Set(Utc::now().into()),
    };
    let created = am.insert(db).await?;
    info!(id = created.id, task_id = created.task_id, "created subtask");
    Ok(created)
}

pub async fn update_subtask(db: &DatabaseConnection, statuses: &StatusSet, id: i32, input: &SubtaskInput) -> Result<subtask::Model, ServiceError> {
    let existing = get_subtask(db, id).await?;
    let (title, status) = validate(db, statuses, input).await?;
    let mut am: subtask::ActiveModel = existing.into();
    am.task_id = Set(input.task_id);
    am.title = Set(title);
    am.status = Set(status);
    let updated = am.update(db).await?;
    info!(id, task_id = updated.task_id, "updated subtask");
    Ok(updated)
}

pub async fn delete_subtask(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = subtask::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        warn!(id, "delete of unknown subtask");
        return Err(ServiceError::not_found("subtask", id));
    }
    info!(id, "deleted subtask");
    Ok(())
}

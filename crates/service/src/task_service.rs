use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use models::status::StatusSet;
use models::{category, note, priority, subtask, task};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, ModelTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::query::{self, ListParams, Listing, QuerySpec, Queryable};

impl Queryable for task::Entity {
    const SPEC: QuerySpec = QuerySpec {
        sort_keys: &[
            "title",
            "status",
            "deadline",
            "priority__name",
            "category__name",
            "created_at",
            "-created_at",
        ],
        default_sort: "category__name",
        search_fields: &["title", "description", "status", "priority__name", "category__name"],
    };

    fn field(path: &str) -> Option<SimpleExpr> {
        let expr = match path {
            "id" => Expr::col((task::Entity, task::Column::Id)),
            "title" => Expr::col((task::Entity, task::Column::Title)),
            "description" => Expr::col((task::Entity, task::Column::Description)),
            "status" => Expr::col((task::Entity, task::Column::Status)),
            "deadline" => Expr::col((task::Entity, task::Column::Deadline)),
            "created_at" => Expr::col((task::Entity, task::Column::CreatedAt)),
            "priority__name" => Expr::col((priority::Entity, priority::Column::Name)),
            "category__name" => Expr::col((category::Entity, category::Column::Name)),
            _ => return None,
        };
        Some(expr.into())
    }

    // Left joins: tasks without a priority or category still list
    fn with_joins(select: Select<Self>) -> Select<Self> {
        select
            .join(JoinType::LeftJoin, task::Relation::Priority.def())
            .join(JoinType::LeftJoin, task::Relation::Category.def())
    }
}

/// Full attribute set for creating or replacing a task.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub status: String,
    pub deadline: DateTime<FixedOffset>,
    pub priority_id: Option<i32>,
    pub category_id: Option<i32>,
}

/// A task with the names of its priority and category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskRow {
    #[serde(flatten)]
    pub task: task::Model,
    pub priority_name: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: TaskRow,
    pub subtasks: Vec<subtask::Model>,
    pub notes: Vec<note::Model>,
}

struct ValidTask {
    title: String,
    description: String,
    status: String,
    deadline: DateTime<FixedOffset>,
    priority_id: Option<i32>,
    category_id: Option<i32>,
}

/// Check every field and reference before anything is written.
async fn validate(db: &DatabaseConnection, statuses: &StatusSet, input: &TaskInput) -> Result<ValidTask, ServiceError> {
    let title = task::validate_title(&input.title)?;
    let description = task::validate_description(&input.description)?;
    let status = statuses.validate(&input.status)?;

    if let Some(id) = input.priority_id {
        if priority::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(ServiceError::missing_reference("priority", id));
        }
    }
    if let Some(id) = input.category_id {
        if category::Entity::find_by_id(id).one(db).await?.is_none() {
            return Err(ServiceError::missing_reference("category", id));
        }
    }

    // stored in UTC so text-backed timestamps compare in instant order
    let deadline: DateTime<FixedOffset> = input.deadline.with_timezone(&Utc).into();
    Ok(ValidTask {
        title,
        description,
        status,
        deadline,
        priority_id: input.priority_id,
        category_id: input.category_id,
    })
}

async fn priority_names(db: &DatabaseConnection, ids: Vec<i32>) -> Result<HashMap<i32, String>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = priority::Entity::find().filter(priority::Column::Id.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|p| (p.id, p.name)).collect())
}

async fn category_names(db: &DatabaseConnection, ids: Vec<i32>) -> Result<HashMap<i32, String>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = category::Entity::find().filter(category::Column::Id.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|c| (c.id, c.name)).collect())
}

/// Titles of the given tasks, keyed by id.
pub(crate) async fn task_titles(db: &DatabaseConnection, ids: Vec<i32>) -> Result<HashMap<i32, String>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = task::Entity::find().filter(task::Column::Id.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|t| (t.id, t.title)).collect())
}

/// Attach priority and category names to a batch of tasks.
pub(crate) async fn to_rows(db: &DatabaseConnection, tasks: Vec<task::Model>) -> Result<Vec<TaskRow>, ServiceError> {
    let priorities = priority_names(db, tasks.iter().filter_map(|t| t.priority_id).collect()).await?;
    let categories = category_names(db, tasks.iter().filter_map(|t| t.category_id).collect()).await?;
    Ok(tasks
        .into_iter()
        .map(|task| TaskRow {
            priority_name: task.priority_id.and_then(|id| priorities.get(&id).cloned()),
            category_name: task.category_id.and_then(|id| categories.get(&id).cloned()),
            task,
        })
        .collect())
}

pub async fn list_tasks(db: &DatabaseConnection, params: &ListParams) -> Result<Listing<TaskRow>, ServiceError> {
    let listing = query::fetch::<task::Entity>(db, params).await?;
    let Listing { items, sort_by, q, page } = listing;
    let items = to_rows(db, items).await?;
    Ok(Listing { items, sort_by, q, page })
}

pub async fn get_task(db: &DatabaseConnection, id: i32) -> Result<task::Model, ServiceError> {
    task::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("task", id))
}

/// A task with its names, subtasks and notes, newest children first.
pub async fn get_task_detail(db: &DatabaseConnection, id: i32) -> Result<TaskDetail, ServiceError> {
    let found = get_task(db, id).await?;
    let subtasks = found
        .find_related(subtask::Entity)
        .order_by_desc(subtask::Column::CreatedAt)
        .order_by_desc(subtask::Column::Id)
        .all(db)
        .await?;
    let notes = found
        .find_related(note::Entity)
        .order_by_desc(note::Column::CreatedAt)
        .order_by_desc(note::Column::Id)
        .all(db)
        .await?;
    let row = to_rows(db, vec![found])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("task", id))?;
    Ok(TaskDetail { task: row, subtasks, notes })
}

pub async fn create_task(db: &DatabaseConnection, statuses: &StatusSet, input: &TaskInput) -> Result<task::Model, ServiceError> {
    let v = validate(db, statuses, input).await?;
    let am = task::ActiveModel {
        id: NotSet,
        title: Set(v.title),
        description: Set(v.description),
        status: Set(v.status),
        deadline: Set(v.deadline),
        created_at: Set(Utc::now().into()),
        priority_id: Set(v.priority_id),
        category_id: Set(v.category_id),
    };
    let created = am.insert(db).await?;
    info!(id = created.id, title = %created.title, "created task");
    Ok(created)
}

/// Replace every editable attribute of a task. `created_at` is kept.
pub async fn update_task(db: &DatabaseConnection, statuses: &StatusSet, id: i32, input: &TaskInput) -> Result<task::Model, ServiceError> {
    let existing = get_task(db, id).await?;
    replace_task(db, statuses, existing, input).await
}

/// Overwrite an already loaded task with `input`; `created_at` is kept.
pub async fn replace_task(db: &DatabaseConnection, statuses: &StatusSet, existing: task::Model, input: &TaskInput) -> Result<task::Model, ServiceError> {
    let id = existing.id;
    let v = validate(db, statuses, input).await?;
    let mut am: task::ActiveModel = existing.into();
    am.title = Set(v.title);
    am.description = Set(v.description);
    am.status = Set(v.status);
    am.deadline = Set(v.deadline);
    am.priority_id = Set(v.priority_id);
    am.category_id = Set(v.category_id);
    let updated = am.update(db).await?;
    info!(id, "updated task");
    Ok(updated)
}

/// Delete a task together with its subtasks and notes.
pub async fn delete_task(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    if task::Entity::find_by_id(id).one(db).await?.is_none() {
        warn!(id, "delete of unknown task");
        return Err(ServiceError::not_found("task", id));
    }
    let txn = db.begin().await?;
    let subtasks = subtask::Entity::delete_many()
        .filter(subtask::Column::TaskId.eq(id))
        .exec(&txn)
        .await?;
    let notes = note::Entity::delete_many()
        .filter(note::Column::TaskId.eq(id))
        .exec(&txn)
        .await?;
    task::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, subtasks = subtasks.rows_affected, notes = notes.rows_affected, "deleted task");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_service::{self, CategoryInput};
    use crate::priority_service::{self, PriorityInput};
    use crate::test_support::{at, get_db, make_task, task_input};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn created_task_is_found_by_title_search() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let created = make_task(&db, "Write report").await?;
        make_task(&db, "Buy milk").await?;

        let hits = list_tasks(&db, &ListParams::search("write")).await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.items[0].task.id, created.id);
        assert_eq!(hits.items[0].priority_name, None);
        Ok(())
    }

    #[tokio::test]
    async fn category_name_search_returns_every_task_in_it() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let statuses = StatusSet::default();
        let finance = category_service::create_category(&db, &CategoryInput { name: "Finance".into() }).await?;
        let work = category_service::create_category(&db, &CategoryInput { name: "Work".into() }).await?;

        for (title, cat) in [("Pay rent", finance.id), ("File taxes", finance.id), ("Standup", work.id)] {
            let input = TaskInput { category_id: Some(cat), ..task_input(title) };
            create_task(&db, &statuses, &input).await?;
        }
        make_task(&db, "Loose end").await?;

        let hits = list_tasks(&db, &ListParams::search("fin")).await?;
        let mut titles: Vec<_> = hits.items.iter().map(|r| r.task.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, ["File taxes", "Pay rent"]);
        assert!(hits.items.iter().all(|r| r.category_name.as_deref() == Some("Finance")));
        Ok(())
    }

    #[tokio::test]
    async fn default_sort_is_category_name_and_keeps_uncategorized_rows() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let statuses = StatusSet::default();
        let school = category_service::create_category(&db, &CategoryInput { name: "School".into() }).await?;
        let home = category_service::create_category(&db, &CategoryInput { name: "Home".into() }).await?;
        create_task(&db, &statuses, &TaskInput { category_id: Some(school.id), ..task_input("Essay") }).await?;
        create_task(&db, &statuses, &TaskInput { category_id: Some(home.id), ..task_input("Dishes") }).await?;
        make_task(&db, "Orphan").await?;

        let all = list_tasks(&db, &ListParams::default()).await?;
        assert_eq!(all.sort_by, "category__name");
        assert_eq!(all.len(), 3);
        let named: Vec<_> = all.items.iter().filter_map(|r| r.category_name.as_deref()).collect();
        assert_eq!(named, ["Home", "School"]);
        Ok(())
    }

    async fn three_distinct_tasks(db: &DatabaseConnection) -> Result<(), anyhow::Error> {
        let statuses = StatusSet::default();
        let mut refs = Vec::new();
        for (cat, prio) in [("Work", "Low"), ("Home", "High"), ("Admin", "Medium")] {
            let c = category_service::create_category(db, &CategoryInput { name: cat.into() }).await?;
            let p = priority_service::create_priority(db, &PriorityInput { name: prio.into() }).await?;
            refs.push((c.id, p.id));
        }
        let rows = [
            ("Alpha", "quarterly numbers", "Completed", at(2030, 3, 1)),
            ("Bravo", "groceries", "Pending", at(2030, 1, 1)),
            ("Charlie", "call plumber", "In Progress", at(2030, 2, 1)),
        ];
        for ((title, description, status, deadline), (category_id, priority_id)) in rows.into_iter().zip(refs) {
            let input = TaskInput {
                title: title.into(),
                description: description.into(),
                status: status.into(),
                deadline,
                priority_id: Some(priority_id),
                category_id: Some(category_id),
            };
            create_task(db, &statuses, &input).await?;
        }
        Ok(())
    }

    fn titles(listing: &Listing<TaskRow>) -> Vec<&str> {
        listing.items.iter().map(|r| r.task.title.as_str()).collect()
    }

    #[tokio::test]
    async fn every_allowed_sort_key_orders_rows() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        three_distinct_tasks(&db).await?;

        let cases = [
            ("title", ["Alpha", "Bravo", "Charlie"]),
            ("status", ["Alpha", "Charlie", "Bravo"]),
            ("deadline", ["Bravo", "Charlie", "Alpha"]),
            ("priority__name", ["Bravo", "Alpha", "Charlie"]),
            ("category__name", ["Charlie", "Bravo", "Alpha"]),
            ("created_at", ["Alpha", "Bravo", "Charlie"]),
            ("-created_at", ["Charlie", "Bravo", "Alpha"]),
        ];
        for (key, expected) in cases {
            let listing = list_tasks(&db, &ListParams::sorted(key)).await?;
            assert_eq!(listing.sort_by, key);
            assert_eq!(titles(&listing), expected, "sort_by={key}");
        }

        for bad in ["-title", "description", "category__id", "bogus"] {
            let listing = list_tasks(&db, &ListParams::sorted(bad)).await?;
            assert_eq!(listing.sort_by, "category__name", "sort_by={bad}");
            assert_eq!(titles(&listing), ["Charlie", "Bravo", "Alpha"]);
        }
        Ok(())
    }

    #[tokio::test]
    async fn each_search_field_matches_on_its_own() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        three_distinct_tasks(&db).await?;

        let cases = [
            ("bravo", "Bravo"),
            ("PLUMBER", "Charlie"),
            ("progress", "Charlie"),
            ("high", "Bravo"),
            ("work", "Alpha"),
        ];
        for (q, expected) in cases {
            let listing = list_tasks(&db, &ListParams::search(q)).await?;
            assert_eq!(titles(&listing), [expected], "q={q}");
        }
        assert!(list_tasks(&db, &ListParams::search("nowhere")).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn newest_first_sort() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let first = make_task(&db, "First").await?;
        let second = make_task(&db, "Second").await?;

        let newest = list_tasks(&db, &ListParams::sorted("-created_at")).await?;
        let ids: Vec<_> = newest.items.iter().map(|r| r.task.id).collect();
        assert_eq!(ids, [second.id, first.id]);
        assert_eq!(newest.sort_by, "-created_at");
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_unknown_status_and_missing_references() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let statuses = StatusSet::default();

        let bad_status = TaskInput { status: "Archived".into(), ..task_input("A") };
        assert!(matches!(create_task(&db, &statuses, &bad_status).await, Err(ServiceError::Validation(_))));

        let bad_ref = TaskInput { priority_id: Some(99), ..task_input("A") };
        assert!(matches!(create_task(&db, &statuses, &bad_ref).await, Err(ServiceError::Validation(_))));

        let blank = TaskInput { description: " ".into(), ..task_input("A") };
        assert!(matches!(create_task(&db, &statuses, &blank).await, Err(ServiceError::Validation(_))));

        assert_eq!(task::Entity::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn update_with_invalid_reference_leaves_row_unchanged() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let statuses = StatusSet::default();
        let before = make_task(&db, "Keep me").await?;

        let input = TaskInput { category_id: Some(4242), ..task_input("Changed") };
        let err = update_task(&db, &statuses, before.id, &input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(get_task(&db, before.id).await?, before);

        let ok = TaskInput { status: "Completed".into(), ..task_input("Changed") };
        let updated = update_task(&db, &statuses, before.id, &ok).await?;
        assert_eq!(updated.title, "Changed");
        assert_eq!(updated.status, "Completed");
        assert_eq!(updated.created_at, before.created_at);

        assert!(matches!(update_task(&db, &statuses, 777, &ok).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn replace_task_writes_over_loaded_row() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let statuses = StatusSet::default();
        let loaded = make_task(&db, "Draft").await?;

        let bad = TaskInput { status: "Someday".into(), ..task_input("Final") };
        let err = replace_task(&db, &statuses, loaded.clone(), &bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let replaced = replace_task(&db, &statuses, loaded.clone(), &task_input("Final")).await?;
        assert_eq!(replaced.id, loaded.id);
        assert_eq!(replaced.created_at, loaded.created_at);
        assert_eq!(get_task(&db, loaded.id).await?.title, "Final");
        Ok(())
    }

    #[tokio::test]
    async fn deadline_is_stored_as_the_same_instant() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let local = DateTime::parse_from_rfc3339("2030-06-01T09:00:00+02:00")?;
        let created = create_task(&db, &StatusSet::default(), &TaskInput { deadline: local, ..task_input("Zoned") }).await?;
        assert_eq!(created.deadline, local);
        assert_eq!(created.deadline.offset().local_minus_utc(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_to_children() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let doomed = make_task(&db, "Doomed").await?;
        let kept = make_task(&db, "Kept").await?;
        let now: DateTime<FixedOffset> = Utc::now().into();
        for (task_id, label) in [(doomed.id, "a"), (doomed.id, "b"), (kept.id, "c")] {
            subtask::ActiveModel {
                id: NotSet,
                task_id: Set(task_id),
                title: Set(label.into()),
                status: Set("Pending".into()),
                created_at: Set(now),
            }
            .insert(&db)
            .await?;
            note::ActiveModel { id: NotSet, task_id: Set(task_id), content: Set(label.into()), created_at: Set(now) }
                .insert(&db)
                .await?;
        }

        let detail = get_task_detail(&db, doomed.id).await?;
        assert_eq!((detail.subtasks.len(), detail.notes.len()), (2, 2));

        delete_task(&db, doomed.id).await?;
        assert!(matches!(get_task(&db, doomed.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(subtask::Entity::find().count(&db).await?, 1);
        assert_eq!(note::Entity::find().count(&db).await?, 1);
        assert!(matches!(delete_task(&db, doomed.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn deleting_category_keeps_task_without_it() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let cat = category_service::create_category(&db, &CategoryInput { name: "Projects".into() }).await?;
        let t = create_task(&db, &StatusSet::default(), &TaskInput { category_id: Some(cat.id), ..task_input("Ship it") }).await?;

        category_service::delete_category(&db, cat.id).await?;
        let after = get_task(&db, t.id).await?;
        assert_eq!(after.category_id, None);
        let rows = list_tasks(&db, &ListParams::default()).await?;
        assert_eq!(rows.items[0].category_name, None);
        Ok(())
    }
}

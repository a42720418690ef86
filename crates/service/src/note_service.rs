use chrono::Utc;
use models::{note, task};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, JoinType, NotSet, QuerySelect, RelationTrait, Select, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::query::{self, ListParams, Listing, QuerySpec, Queryable};
use crate::task_service::task_titles;

impl Queryable for note::Entity {
    const SPEC: QuerySpec = QuerySpec {
        sort_keys: &["task__title", "content", "created_at", "-created_at"],
        default_sort: "-created_at",
        search_fields: &["content", "task__title"],
    };

    fn field(path: &str) -> Option<SimpleExpr> {
        let expr = match path {
            "id" => Expr::col((note::Entity, note::Column::Id)),
            "content" => Expr::col((note::Entity, note::Column::Content)),
            "created_at" => Expr::col((note::Entity, note::Column::CreatedAt)),
            "task__title" => Expr::col((task::Entity, task::Column::Title)),
            _ => return None,
        };
        Some(expr.into())
    }

    fn with_joins(select: Select<Self>) -> Select<Self> {
        select.join(JoinType::InnerJoin, note::Relation::Task.def())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NoteInput {
    pub task_id: i32,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NoteRow {
    #[serde(flatten)]
    pub note: note::Model,
    pub task_title: Option<String>,
}

async fn validate(db: &DatabaseConnection, input: &NoteInput) -> Result<String, ServiceError> {
    let content = note::validate_content(&input.content)?;
    if task::Entity::find_by_id(input.task_id).one(db).await?.is_none() {
        return Err(ServiceError::missing_reference("task", input.task_id));
    }
    Ok(content)
}

pub async fn list_notes(db: &DatabaseConnection, params: &ListParams) -> Result<Listing<NoteRow>, ServiceError> {
    let listing = query::fetch::<note::Entity>(db, params).await?;
    let titles = task_titles(db, listing.items.iter().map(|n| n.task_id).collect()).await?;
    Ok(listing.map(|note| NoteRow { task_title: titles.get(&note.task_id).cloned(), note }))
}

pub async fn get_note(db: &DatabaseConnection, id: i32) -> Result<note::Model, ServiceError> {
    note::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("note", id))
}

pub async fn create_note(db: &DatabaseConnection, input: &NoteInput) -> Result<note::Model, ServiceError> {
    let content = validate(db, input).await?;
    let am = note::ActiveModel {
        id: NotSet,
        task_id: Set(input.task_id),
        content: Set(content),
        created_at: Set(Utc::now().into()),
    };
    let created = am.insert(db).await?;
    info!(id = created.id, task_id = created.task_id, "created note");
    Ok(created)
}

pub async fn update_note(db: &DatabaseConnection, id: i32, input: &NoteInput) -> Result<note::Model, ServiceError> {
    let existing = get_note(db, id).await?;
    let content = validate(db, input).await?;
    let mut am: note::ActiveModel = existing.into();
    am.task_id = Set(input.task_id);
    am.content = Set(content);
    let updated = am.update(db).await?;
    info!(id, "updated note");
    Ok(updated)
}

pub async fn delete_note(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = note::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        warn!(id, "delete of unknown note");
        return Err(ServiceError::not_found("note", id));
    }
    info!(id, "deleted note");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, make_task};

    fn input(task_id: i32, content: &str) -> NoteInput {
        NoteInput { task_id, content: content.into() }
    }

    #[tokio::test]
    async fn note_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let parent = make_task(&db, "Dentist").await?;

        let n = create_note(&db, &input(parent.id, "Call before 10am")).await?;
        assert_eq!(get_note(&db, n.id).await?.content, "Call before 10am");

        let edited = update_note(&db, n.id, &input(parent.id, "Call after lunch")).await?;
        assert_eq!(edited.content, "Call after lunch");
        assert_eq!(edited.created_at, n.created_at);

        delete_note(&db, n.id).await?;
        assert!(matches!(delete_note(&db, n.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_content_or_parent_title() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let dentist = make_task(&db, "Dentist").await?;
        let garden = make_task(&db, "Garden").await?;
        create_note(&db, &input(dentist.id, "Bring insurance card")).await?;
        create_note(&db, &input(garden.id, "Buy seeds")).await?;

        let by_content = list_notes(&db, &ListParams::search("Insurance")).await?;
        assert_eq!(by_content.len(), 1);
        assert_eq!(by_content.items[0].task_title.as_deref(), Some("Dentist"));

        let by_parent = list_notes(&db, &ListParams::search("garden")).await?;
        assert_eq!(by_parent.len(), 1);
        assert_eq!(by_parent.items[0].note.content, "Buy seeds");

        let everything = list_notes(&db, &ListParams { q: Some(String::new()), sort_by: Some("content".into()), ..Default::default() }).await?;
        let contents: Vec<_> = everything.items.iter().map(|r| r.note.content.as_str()).collect();
        assert_eq!(contents, ["Bring insurance card", "Buy seeds"]);
        Ok(())
    }

    #[tokio::test]
    async fn every_allowed_sort_key_and_fallback() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let vet = make_task(&db, "Vet").await?;
        let archive = make_task(&db, "Archive photos").await?;
        create_note(&db, &input(vet.id, "Bring records")).await?;
        create_note(&db, &input(archive.id, "Use the blue drive")).await?;
        create_note(&db, &input(vet.id, "Ask about diet")).await?;

        let contents = |l: &Listing<NoteRow>| l.items.iter().map(|r| r.note.content.clone()).collect::<Vec<_>>();
        let cases = [
            ("task__title", ["Use the blue drive", "Bring records", "Ask about diet"]),
            ("content", ["Ask about diet", "Bring records", "Use the blue drive"]),
            ("created_at", ["Bring records", "Use the blue drive", "Ask about diet"]),
            ("-created_at", ["Ask about diet", "Use the blue drive", "Bring records"]),
        ];
        for (key, expected) in cases {
            let listing = list_notes(&db, &ListParams::sorted(key)).await?;
            assert_eq!(listing.sort_by, key);
            assert_eq!(contents(&listing), expected, "sort_by={key}");
        }
        for bad in ["-content", "task_id", "updated_at"] {
            let listing = list_notes(&db, &ListParams::sorted(bad)).await?;
            assert_eq!(listing.sort_by, "-created_at", "sort_by={bad}");
            assert_eq!(contents(&listing), ["Ask about diet", "Use the blue drive", "Bring records"]);
        }
        Ok(())
    }

    #[tokio::test]
    async fn rejects_blank_content_and_unknown_task() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let parent = make_task(&db, "Parent").await?;
        assert!(matches!(create_note(&db, &input(parent.id, "  ")).await, Err(ServiceError::Validation(_))));
        assert!(matches!(create_note(&db, &input(parent.id + 1, "hi")).await, Err(ServiceError::Validation(_))));
        assert!(list_notes(&db, &ListParams::default()).await?.is_empty());
        Ok(())
    }
}

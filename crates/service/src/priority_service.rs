use models::{priority, task};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::query::{self, ListParams, Listing, QuerySpec, Queryable};

impl Queryable for priority::Entity {
    const SPEC: QuerySpec = QuerySpec {
        sort_keys: &["name"],
        default_sort: "name",
        search_fields: &["name"],
    };

    fn field(path: &str) -> Option<SimpleExpr> {
        let expr = match path {
            "id" => Expr::col((priority::Entity, priority::Column::Id)),
            "name" => Expr::col((priority::Entity, priority::Column::Name)),
            _ => return None,
        };
        Some(expr.into())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PriorityInput {
    pub name: String,
}

pub async fn list_priorities(db: &DatabaseConnection, params: &ListParams) -> Result<Listing<priority::Model>, ServiceError> {
    query::fetch::<priority::Entity>(db, params).await
}

pub async fn get_priority(db: &DatabaseConnection, id: i32) -> Result<priority::Model, ServiceError> {
    priority::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("priority", id))
}

pub async fn create_priority(db: &DatabaseConnection, input: &PriorityInput) -> Result<priority::Model, ServiceError> {
    let created = priority::create(db, &input.name).await?;
    info!(id = created.id, name = %created.name, "created priority");
    Ok(created)
}

pub async fn update_priority(db: &DatabaseConnection, id: i32, input: &PriorityInput) -> Result<priority::Model, ServiceError> {
    let mut am: priority::ActiveModel = get_priority(db, id).await?.into();
    am.name = Set(priority::validate_name(&input.name)?);
    let updated = am.update(db).await?;
    info!(id, name = %updated.name, "updated priority");
    Ok(updated)
}

/// Delete a priority and clear it from the tasks that used it.
pub async fn delete_priority(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    if priority::Entity::find_by_id(id).one(db).await?.is_none() {
        warn!(id, "delete of unknown priority");
        return Err(ServiceError::not_found("priority", id));
    }
    let txn = db.begin().await?;
    let detached = task::Entity::update_many()
        .col_expr(task::Column::PriorityId, Expr::value(Option::<i32>::None))
        .filter(task::Column::PriorityId.eq(id))
        .exec(&txn)
        .await?;
    priority::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, detached_tasks = detached.rows_affected, "deleted priority");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn priority_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;

        let p = create_priority(&db, &PriorityInput { name: "High".into() }).await?;
        let renamed = update_priority(&db, p.id, &PriorityInput { name: "Urgent".into() }).await?;
        assert_eq!(renamed.name, "Urgent");
        assert_eq!(get_priority(&db, p.id).await?.name, "Urgent");

        delete_priority(&db, p.id).await?;
        assert!(matches!(delete_priority(&db, p.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_substring_in_any_case() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        for name in ["High", "Medium", "Low", "Critical", "Optional"] {
            create_priority(&db, &PriorityInput { name: name.into() }).await?;
        }

        let hits = list_priorities(&db, &ListParams::search("iTi")).await?;
        let names: Vec<_> = hits.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Critical"]);

        let hits = list_priorities(&db, &ListParams::search("O")).await?;
        let names: Vec<_> = hits.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Low", "Optional"]);

        let fallback = list_priorities(&db, &ListParams { q: Some("O".into()), sort_by: Some("-id".into()), ..Default::default() }).await?;
        assert_eq!(fallback.sort_by, "name");
        assert_eq!(fallback.items, hits.items);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_overlong_name() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let err = create_priority(&db, &PriorityInput { name: "x".repeat(priority::NAME_MAX_CHARS + 1) }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(list_priorities(&db, &ListParams::default()).await?.is_empty());
        Ok(())
    }
}

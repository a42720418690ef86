use models::{category, task};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::query::{self, ListParams, Listing, QuerySpec, Queryable};

impl Queryable for category::Entity {
    const SPEC: QuerySpec = QuerySpec {
        sort_keys: &["name"],
        default_sort: "name",
        search_fields: &["name"],
    };

    fn field(path: &str) -> Option<SimpleExpr> {
        let expr = match path {
            "id" => Expr::col((category::Entity, category::Column::Id)),
            "name" => Expr::col((category::Entity, category::Column::Name)),
            _ => return None,
        };
        Some(expr.into())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CategoryInput {
    pub name: String,
}

/// List categories matching `q`, ordered by `sort_by`.
pub async fn list_categories(db: &DatabaseConnection, params: &ListParams) -> Result<Listing<category::Model>, ServiceError> {
    query::fetch::<category::Entity>(db, params).await
}

/// Get a category by id.
pub async fn get_category(db: &DatabaseConnection, id: i32) -> Result<category::Model, ServiceError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("category", id))
}

/// Create a category.
pub async fn create_category(db: &DatabaseConnection, input: &CategoryInput) -> Result<category::Model, ServiceError> {
    let created = category::create(db, &input.name).await?;
    info!(id = created.id, name = %created.name, "created category");
    Ok(created)
}

/// Rename a category.
pub async fn update_category(db: &DatabaseConnection, id: i32, input: &CategoryInput) -> Result<category::Model, ServiceError> {
    let mut am: category::ActiveModel = get_category(db, id).await?.into();
    am.name = Set(category::validate_name(&input.name)?);
    let updated = am.update(db).await?;
    info!(id, name = %updated.name, "updated category");
    Ok(updated)
}

/// Delete a category; tasks that referenced it keep existing without one.
pub async fn delete_category(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    if category::Entity::find_by_id(id).one(db).await?.is_none() {
        warn!(id, "delete of unknown category");
        return Err(ServiceError::not_found("category", id));
    }
    let txn = db.begin().await?;
    let detached = task::Entity::update_many()
        .col_expr(task::Column::CategoryId, Expr::value(Option::<i32>::None))
        .filter(task::Column::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(id, detached_tasks = detached.rows_affected, "deleted category");
    Ok(())
}

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use models::category;
use service::category_service::{self, CategoryInput};
use service::query::Listing;

use crate::errors::JsonApiError;
use crate::routes::ListQuery;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/api/categories", tag = "categories",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK; sort keys: name"),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Listing<category::Model>>, JsonApiError> {
    Ok(Json(category_service::list_categories(&state.db, &q.into()).await?))
}

#[utoipa::path(
    post, path = "/api/categories", tag = "categories",
    request_body = crate::openapi::NameInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<CategoryInput>) -> Result<(StatusCode, Json<category::Model>), JsonApiError> {
    let created = category_service::create_category(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<category::Model>, JsonApiError> {
    Ok(Json(category_service::get_category(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = crate::openapi::NameInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<category::Model>, JsonApiError> {
    Ok(Json(category_service::update_category(&state.db, id, &input).await?))
}

/// Tasks in the category stay, with no category.
#[utoipa::path(
    delete, path = "/api/categories/{id}", tag = "categories",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    category_service::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

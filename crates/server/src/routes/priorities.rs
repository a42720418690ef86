use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use models::priority;
use service::priority_service::{self, PriorityInput};
use service::query::Listing;

use crate::errors::JsonApiError;
use crate::routes::ListQuery;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/api/priorities", tag = "priorities",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK; sort keys: name"),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Listing<priority::Model>>, JsonApiError> {
    Ok(Json(priority_service::list_priorities(&state.db, &q.into()).await?))
}

#[utoipa::path(
    post, path = "/api/priorities", tag = "priorities",
    request_body = crate::openapi::NameInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<PriorityInput>) -> Result<(StatusCode, Json<priority::Model>), JsonApiError> {
    let created = priority_service::create_priority(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/priorities/{id}", tag = "priorities",
    params(("id" = i32, Path, description = "Priority ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<priority::Model>, JsonApiError> {
    Ok(Json(priority_service::get_priority(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/priorities/{id}", tag = "priorities",
    params(("id" = i32, Path, description = "Priority ID")),
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
    Json(input): Json<PriorityInput>,
) -> Result<Json<priority::Model>, JsonApiError> {
    Ok(Json(priority_service::update_priority(&state.db, id, &input).await?))
}

/// Tasks with this priority keep existing without one.
#[utoipa::path(
    delete, path = "/api/priorities/{id}", tag = "priorities",
    params(("id" = i32, Path, description = "Priority ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    priority_service::delete_priority(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

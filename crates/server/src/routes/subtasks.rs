use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use models::subtask;
use serde::Deserialize;
use service::query::Listing;
use service::subtask_service::{self, SubtaskInput, SubtaskRow};

use crate::errors::JsonApiError;
use crate::routes::ListQuery;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct SubtaskForm {
    pub task_id: i32,
    #[serde(default)]
    pub title: String,
    pub status: Option<String>,
}

impl SubtaskForm {
    fn into_input(self, state: &ServerState) -> SubtaskInput {
        SubtaskInput {
            task_id: self.task_id,
            title: self.title,
            status: self.status.unwrap_or_else(|| state.statuses.initial().to_string()),
        }
    }
}

#[utoipa::path(
    get, path = "/api/subtasks", tag = "subtasks",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK; sort keys: task__title, title, status, created_at, -created_at"),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Listing<SubtaskRow>>, JsonApiError> {
    Ok(Json(subtask_service::list_subtasks(&state.db, &q.into()).await?))
}

#[utoipa::path(
    post, path = "/api/subtasks", tag = "subtasks",
    request_body = crate::openapi::SubtaskFormDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(form): Json<SubtaskForm>) -> Result<(StatusCode, Json<subtask::Model>), JsonApiError> {
    let input = form.into_input(&state);
    let created = subtask_service::create_subtask(&state.db, &state.statuses, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/subtasks/{id}", tag = "subtasks",
    params(("id" = i32, Path, description = "Subtask ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<subtask::Model>, JsonApiError> {
    Ok(Json(subtask_service::get_subtask(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/subtasks/{id}", tag = "subtasks",
    params(("id" = i32, Path, description = "Subtask ID")),
    request_body = crate::openapi::SubtaskFormDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(form): Json<SubtaskForm>,
) -> Result<Json<subtask::Model>, JsonApiError> {
    let input = form.into_input(&state);
    Ok(Json(subtask_service::update_subtask(&state.db, &state.statuses, id, &input).await?))
}

#[utoipa::path(
    delete, path = "/api/subtasks/{id}", tag = "subtasks",
    params(("id" = i32, Path, description = "Subtask ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    subtask_service::delete_subtask(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

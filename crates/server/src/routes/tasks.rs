use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use models::task;
use serde::Deserialize;
use service::errors::ServiceError;
use service::query::Listing;
use service::task_service::{self, TaskDetail, TaskInput, TaskRow};

use crate::errors::JsonApiError;
use crate::routes::ListQuery;
use crate::state::ServerState;

/// Task as submitted by the frontend form.
///
/// `deadline` is RFC 3339 or a naive `datetime-local` value read in the
/// server time zone. A missing `status` takes the first configured label.
#[derive(Debug, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    #[serde(default)]
    pub deadline: String,
    pub priority_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl TaskForm {
    fn into_input(self, state: &ServerState) -> Result<TaskInput, ServiceError> {
        let deadline = task::parse_deadline(&self.deadline, state.tz)?;
        let status = self.status.unwrap_or_else(|| state.statuses.initial().to_string());
        Ok(TaskInput {
            title: self.title,
            description: self.description,
            status,
            deadline,
            priority_id: self.priority_id,
            category_id: self.category_id,
        })
    }
}

#[utoipa::path(
    get, path = "/api/tasks", tag = "tasks",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK; sort keys: title, status, deadline, priority__name, category__name, created_at, -created_at"),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Listing<TaskRow>>, JsonApiError> {
    Ok(Json(task_service::list_tasks(&state.db, &q.into()).await?))
}

#[utoipa::path(
    post, path = "/api/tasks", tag = "tasks",
    request_body = crate::openapi::TaskFormDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(form): Json<TaskForm>) -> Result<(StatusCode, Json<task::Model>), JsonApiError> {
    let input = form.into_input(&state)?;
    let created = task_service::create_task(&state.db, &state.statuses, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// The task with its names, subtasks and notes.
#[utoipa::path(
    get, path = "/api/tasks/{id}", tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<TaskDetail>, JsonApiError> {
    Ok(Json(task_service::get_task_detail(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/tasks/{id}", tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = crate::openapi::TaskFormDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(form): Json<TaskForm>,
) -> Result<Json<task::Model>, JsonApiError> {
    // unknown id wins over a bad form
    let existing = task_service::get_task(&state.db, id).await?;
    let input = form.into_input(&state)?;
    Ok(Json(task_service::replace_task(&state.db, &state.statuses, existing, &input).await?))
}

/// Removes the task's subtasks and notes too.
#[utoipa::path(
    delete, path = "/api/tasks/{id}", tag = "tasks",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    task_service::delete_task(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

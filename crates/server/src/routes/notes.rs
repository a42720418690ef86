use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use models::note;
use service::note_service::{self, NoteInput, NoteRow};
use service::query::Listing;

use crate::errors::JsonApiError;
use crate::routes::ListQuery;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/api/notes", tag = "notes",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK; sort keys: task__title, content, created_at, -created_at"),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Listing<NoteRow>>, JsonApiError> {
    Ok(Json(note_service::list_notes(&state.db, &q.into()).await?))
}

#[utoipa::path(
    post, path = "/api/notes", tag = "notes",
    request_body = crate::openapi::NoteFormDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create(State(state): State<ServerState>, Json(input): Json<NoteInput>) -> Result<(StatusCode, Json<note::Model>), JsonApiError> {
    let created = note_service::create_note(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/notes/{id}", tag = "notes",
    params(("id" = i32, Path, description = "Note ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<note::Model>, JsonApiError> {
    Ok(Json(note_service::get_note(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/notes/{id}", tag = "notes",
    params(("id" = i32, Path, description = "Note ID")),
    request_body = crate::openapi::NoteFormDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(input): Json<NoteInput>,
) -> Result<Json<note::Model>, JsonApiError> {
    Ok(Json(note_service::update_note(&state.db, id, &input).await?))
}

#[utoipa::path(
    delete, path = "/api/notes/{id}", tag = "notes",
    params(("id" = i32, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    note_service::delete_note(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

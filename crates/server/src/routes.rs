use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use service::query::ListParams;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod categories;
pub mod dashboard;
pub mod notes;
pub mod priorities;
pub mod subtasks;
pub mod tasks;

/// Query string accepted by every list endpoint.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring filter; empty means no filter.
    pub q: Option<String>,
    /// One of the listing's sort keys; anything else uses the default.
    pub sort_by: Option<String>,
    /// 1-based page; omit for the whole list.
    pub page: Option<u32>,
    /// Page size, clamped to 1..=100.
    pub per_page: Option<u32>,
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        ListParams { q: q.q, sort_by: q.sort_by, page: q.page, per_page: q.per_page }
    }
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(
    get, path = "/api/statuses", tag = "tasks",
    responses((status = 200, description = "Configured status labels, in order"))
)]
pub async fn statuses(State(state): State<ServerState>) -> Json<Vec<String>> {
    Json(state.statuses.labels().to_vec())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/statuses", get(statuses))
        .route("/api/categories", get(categories::list).post(categories::create))
        .route(
            "/api/categories/:id",
            get(categories::get).put(categories::update).delete(categories::delete),
        )
        .route("/api/priorities", get(priorities::list).post(priorities::create))
        .route(
            "/api/priorities/:id",
            get(priorities::get).put(priorities::update).delete(priorities::delete),
        )
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/:id", get(tasks::get).put(tasks::update).delete(tasks::delete))
        .route("/api/subtasks", get(subtasks::list).post(subtasks::create))
        .route(
            "/api/subtasks/:id",
            get(subtasks::get).put(subtasks::update).delete(subtasks::delete),
        )
        .route("/api/notes", get(notes::list).post(notes::create))
        .route("/api/notes/:id", get(notes::get).put(notes::update).delete(notes::delete))
}

/// Build the application router: JSON API, health, OpenAPI document and static frontend.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    build_router_with_assets(state, cors, "frontend")
}

pub fn build_router_with_assets(state: ServerState, cors: CorsLayer, assets_dir: &str) -> Router {
    let index = format!("{}/index.html", assets_dir.trim_end_matches('/'));
    let static_dir = ServeDir::new(assets_dir).fallback(ServeFile::new(index));

    let trace = TraceLayer::new_for_http()
        // one span per request carrying method and path
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        // status code and latency
        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(api_routes().with_state(state))
        .fallback_service(static_dir)
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
}

use axum::{extract::State, Json};
use service::dashboard::{self, DashboardSummary};

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/api/dashboard", tag = "dashboard",
    responses(
        (status = 200, description = "Totals, this year's counts and the latest tasks"),
        (status = 500, description = "Summary Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn summary(State(state): State<ServerState>) -> Result<Json<DashboardSummary>, JsonApiError> {
    Ok(Json(dashboard::compute_summary(&state.db, state.tz).await?))
}

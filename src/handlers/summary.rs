// src/handlers/summary.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    services::summary::SummaryReport,
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};

/// Compute the user's financial summary from current data
#[utoipa::path(
    get,
    path = "/api/v1/summary",
    responses(
        (status = 200, description = "Complete, degraded or failed summary", body = SummaryReport),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Summary"
)]
pub async fn get_summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SummaryReport>> {
    Ok(Json(state.summaries.compute_summary(auth.id).await))
}

/// Latest summary kept current by change events; mounts the binding on first use
#[utoipa::path(
    get,
    path = "/api/v1/summary/live",
    responses(
        (status = 200, description = "Most recently applied summary", body = SummaryReport),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Summary"
)]
pub async fn get_live_summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SummaryReport>> {
    let binding = state.live.mount(auth.id).await;
    let latest = binding
        .latest()
        .ok_or_else(|| AppError::Unavailable("summary not computed yet".to_string()))?;
    Ok(Json(latest.as_ref().clone()))
}

/// Stop keeping the summary current
#[utoipa::path(
    delete,
    path = "/api/v1/summary/live",
    responses(
        (status = 204, description = "Binding released (or was not mounted)"),
    ),
    security(("bearer_auth" = [])),
    tag = "Summary"
)]
pub async fn unmount_live_summary(auth: AuthUser, State(state): State<AppState>) -> StatusCode {
    state.live.unmount(auth.id);
    StatusCode::NO_CONTENT
}

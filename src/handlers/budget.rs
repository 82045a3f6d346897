// src/handlers/budget.rs

use crate::{
    auth::AuthUser,
    errors::{AppJson, AppResult},
    models::{BudgetItem, CreateBudgetItemRequest, UpdateBudgetItemRequest},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// List the user's budget items, newest month first
#[utoipa::path(
    get,
    path = "/api/v1/budget",
    responses(
        (status = 200, description = "Budget items", body = Vec<BudgetItem>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn list_budget_items(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BudgetItem>>> {
    Ok(Json(state.budgets.list(auth.id).await?))
}

/// Add a budget item
#[utoipa::path(
    post,
    path = "/api/v1/budget",
    request_body = CreateBudgetItemRequest,
    responses(
        (status = 201, description = "Budget item created", body = BudgetItem),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn create_budget_item(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateBudgetItemRequest>,
) -> AppResult<(StatusCode, Json<BudgetItem>)> {
    let item = state.budgets.create(auth.id, body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update a budget item
#[utoipa::path(
    put,
    path = "/api/v1/budget/{id}",
    params(("id" = Uuid, Path, description = "Budget item ID")),
    request_body = UpdateBudgetItemRequest,
    responses(
        (status = 200, description = "Budget item updated", body = BudgetItem),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Budget item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn update_budget_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<UpdateBudgetItemRequest>,
) -> AppResult<Json<BudgetItem>> {
    Ok(Json(state.budgets.update(auth.id, id, body).await?))
}

/// Delete a budget item
#[utoipa::path(
    delete,
    path = "/api/v1/budget/{id}",
    params(("id" = Uuid, Path, description = "Budget item ID")),
    responses(
        (status = 204, description = "Budget item deleted"),
        (status = 404, description = "Budget item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Budget"
)]
pub async fn delete_budget_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.budgets.delete(auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/salary.rs

use crate::{
    auth::AuthUser,
    errors::{AppJson, AppResult},
    models::{SalaryOverrideBody, SetSalaryRequest},
    state::AppState,
};
use axum::{Json, extract::State};

/// Get the salary override used when no salary budget item exists
#[utoipa::path(
    get,
    path = "/api/v1/salary",
    responses(
        (status = 200, description = "Salary override; null when never set", body = SalaryOverrideBody),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_salary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SalaryOverrideBody>> {
    let monthly_salary = state.salary.get(auth.id).await?;
    Ok(Json(SalaryOverrideBody { monthly_salary }))
}

/// Set the salary override
#[utoipa::path(
    put,
    path = "/api/v1/salary",
    request_body = SetSalaryRequest,
    responses(
        (status = 200, description = "Salary override saved", body = SalaryOverrideBody),
        (status = 400, description = "Negative or malformed amount"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn set_salary(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<SetSalaryRequest>,
) -> AppResult<Json<SalaryOverrideBody>> {
    let saved = state.salary.set(auth.id, body.monthly_salary).await?;
    Ok(Json(SalaryOverrideBody {
        monthly_salary: Some(saved),
    }))
}

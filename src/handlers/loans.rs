// src/handlers/loans.rs

use crate::{
    auth::AuthUser,
    errors::{AppJson, AppResult},
    models::{
        CreateEmiRequest, CreateLoanRequest, Emi, Loan, UpdateEmiRequest, UpdateLoanRequest,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// ─── Loans ────────────────────────────────────────────────────────────────────

/// List the user's loans, most recently added first
#[utoipa::path(
    get,
    path = "/api/v1/loans",
    responses(
        (status = 200, description = "Loans", body = Vec<Loan>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Loans"
)]
pub async fn list_loans(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Loan>>> {
    Ok(Json(state.loans.list(auth.id).await?))
}

/// Add a loan
#[utoipa::path(
    post,
    path = "/api/v1/loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Validation error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Loans"
)]
pub async fn create_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.loans.create(auth.id, body).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Update a loan
#[utoipa::path(
    put,
    path = "/api/v1/loans/{id}",
    params(("id" = Uuid, Path, description = "Loan ID")),
    request_body = UpdateLoanRequest,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Loan not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Loans"
)]
pub async fn update_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<UpdateLoanRequest>,
) -> AppResult<Json<Loan>> {
    Ok(Json(state.loans.update(auth.id, id, body).await?))
}

/// Delete a loan; linked EMIs are kept and detached
#[utoipa::path(
    delete,
    path = "/api/v1/loans/{id}",
    params(("id" = Uuid, Path, description = "Loan ID")),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 404, description = "Loan not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Loans"
)]
pub async fn delete_loan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.loans.delete(auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── EMIs ─────────────────────────────────────────────────────────────────────

/// List the user's EMIs by start date
#[utoipa::path(
    get,
    path = "/api/v1/emis",
    responses(
        (status = 200, description = "EMIs", body = Vec<Emi>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "EMIs"
)]
pub async fn list_emis(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Emi>>> {
    Ok(Json(state.emis.list(auth.id).await?))
}

/// Add an EMI, optionally linked to one of the user's loans
#[utoipa::path(
    post,
    path = "/api/v1/emis",
    request_body = CreateEmiRequest,
    responses(
        (status = 201, description = "EMI created", body = Emi),
        (status = 400, description = "Validation error or unknown loan"),
    ),
    security(("bearer_auth" = [])),
    tag = "EMIs"
)]
pub async fn create_emi(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateEmiRequest>,
) -> AppResult<(StatusCode, Json<Emi>)> {
    let emi = state.emis.create(auth.id, body).await?;
    Ok((StatusCode::CREATED, Json(emi)))
}

/// Update an EMI; `"loanId": null` detaches it
#[utoipa::path(
    put,
    path = "/api/v1/emis/{id}",
    params(("id" = Uuid, Path, description = "EMI ID")),
    request_body = UpdateEmiRequest,
    responses(
        (status = 200, description = "EMI updated", body = Emi),
        (status = 400, description = "Validation error or unknown loan"),
        (status = 404, description = "EMI not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "EMIs"
)]
pub async fn update_emi(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(body): AppJson<UpdateEmiRequest>,
) -> AppResult<Json<Emi>> {
    Ok(Json(state.emis.update(auth.id, id, body).await?))
}

/// Delete an EMI
#[utoipa::path(
    delete,
    path = "/api/v1/emis/{id}",
    params(("id" = Uuid, Path, description = "EMI ID")),
    responses(
        (status = 204, description = "EMI deleted"),
        (status = 404, description = "EMI not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "EMIs"
)]
pub async fn delete_emi(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.emis.delete(auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/routes/mod.rs

use crate::{
    handlers::{
        account::{get_profile, login, signup, update_profile},
        budget::{create_budget_item, delete_budget_item, list_budget_items, update_budget_item},
        general::{health_handler, root_handler},
        loans::{
            create_emi, create_loan, delete_emi, delete_loan, list_emis, list_loans, update_emi,
            update_loan,
        },
        salary::{get_salary, set_salary},
        summary::{get_live_summary, get_summary, unmount_live_summary},
    },
    openapi::ApiDoc,
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Accounts ─────────────────────────────────────────
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/users/me", get(get_profile).put(update_profile))
        // ─── Budget ───────────────────────────────────────────
        .route("/budget", get(list_budget_items).post(create_budget_item))
        .route(
            "/budget/{id}",
            put(update_budget_item).delete(delete_budget_item),
        )
        // ─── Loans & EMIs ─────────────────────────────────────
        .route("/loans", get(list_loans).post(create_loan))
        .route("/loans/{id}", put(update_loan).delete(delete_loan))
        .route("/emis", get(list_emis).post(create_emi))
        .route("/emis/{id}", put(update_emi).delete(delete_emi))
        // ─── Salary ───────────────────────────────────────────
        .route("/salary", get(get_salary).put(set_salary))
        // ─── Summary ──────────────────────────────────────────
        .route("/summary", get(get_summary))
        .route(
            "/summary/live",
            get(get_live_summary).delete(unmount_live_summary),
        )
}

/// The full application: landing page, health, versioned API and Swagger UI.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

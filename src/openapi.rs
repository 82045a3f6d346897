// src/openapi.rs

use crate::{
    models::{
        AuthResponse, BudgetItem, BudgetItemType, CreateBudgetItemRequest, CreateEmiRequest,
        CreateLoanRequest, Emi, Loan, LoginRequest, SalaryOverrideBody, SetSalaryRequest,
        SignupRequest, UpdateBudgetItemRequest, UpdateEmiRequest, UpdateLoanRequest,
        UpdateProfileRequest, UserPublic,
    },
    services::summary::{
        DerivedSummary, InputFailure, SalarySource, SummaryInput, SummaryOutcome, SummaryReport,
    },
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Finance Tracker API",
        version = "1.0.0",
        description = "Personal finance tracking: monthly budget items, loans and EMIs, \
            a salary override, and a summary that is recomputed whenever any of them change.",
        license(name = "MIT")
    ),
    paths(
        // Accounts
        crate::handlers::account::signup,
        crate::handlers::account::login,
        crate::handlers::account::get_profile,
        crate::handlers::account::update_profile,
        // Budget
        crate::handlers::budget::list_budget_items,
        crate::handlers::budget::create_budget_item,
        crate::handlers::budget::update_budget_item,
        crate::handlers::budget::delete_budget_item,
        // Loans
        crate::handlers::loans::list_loans,
        crate::handlers::loans::create_loan,
        crate::handlers::loans::update_loan,
        crate::handlers::loans::delete_loan,
        // EMIs
        crate::handlers::loans::list_emis,
        crate::handlers::loans::create_emi,
        crate::handlers::loans::update_emi,
        crate::handlers::loans::delete_emi,
        // Salary
        crate::handlers::salary::get_salary,
        crate::handlers::salary::set_salary,
        // Summary
        crate::handlers::summary::get_summary,
        crate::handlers::summary::get_live_summary,
        crate::handlers::summary::unmount_live_summary,
    ),
    components(
        schemas(
            SignupRequest, LoginRequest, AuthResponse, UserPublic, UpdateProfileRequest,
            BudgetItem, BudgetItemType, CreateBudgetItemRequest, UpdateBudgetItemRequest,
            Loan, CreateLoanRequest, UpdateLoanRequest,
            Emi, CreateEmiRequest, UpdateEmiRequest,
            SalaryOverrideBody, SetSalaryRequest,
            SummaryReport, SummaryOutcome, DerivedSummary, InputFailure, SummaryInput, SalarySource,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Accounts", description = "Sign up, log in, and manage your profile"),
        (name = "Budget", description = "Monthly income and expense lines"),
        (name = "Loans", description = "Loans and their scheduled monthly payments"),
        (name = "EMIs", description = "Instalment plans, standalone or tied to a loan"),
        (name = "Salary", description = "Fallback monthly salary"),
        (name = "Summary", description = "Derived totals, on demand or kept live"),
    )
)]
pub struct ApiDoc;

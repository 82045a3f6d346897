mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{TestApp, amount, budget_item, loan};
use finance_tracker::{
    errors::{AppError, AppResult},
    models::{CreateLoanRequest, Loan, UpdateLoanRequest},
    services::bus::Topic,
    store::{LoanStore, MemoryStore, Stores},
};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

fn totals(report: &Value) -> &Value {
    &report["outcome"]["summary"]
}

#[tokio::test]
async fn override_salary_with_other_income_and_loan() {
    let app = TestApp::new();
    let token = app.signup("summary").await;

    app.put("/api/v1/salary", &token, json!({ "monthlySalary": 50000 }))
        .await;
    app.post("/api/v1/budget", &token, budget_item("Other Income", "income", 10000))
        .await;
    app.post("/api/v1/budget", &token, budget_item("Housing", "expense", 15000))
        .await;
    app.post("/api/v1/loans", &token, loan("Home", 8000)).await;

    let (status, report) = app.get("/api/v1/summary", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"]["status"], "complete");

    let summary = totals(&report);
    assert_eq!(amount(&summary["totalIncome"]), Some(dec!(60000)));
    assert_eq!(amount(&summary["totalExpenses"]), Some(dec!(15000)));
    assert_eq!(amount(&summary["netSavings"]), Some(dec!(45000)));
    assert_eq!(amount(&summary["totalLoanPayments"]), Some(dec!(8000)));
    assert_eq!(amount(&summary["investmentOutflow"]), Some(dec!(0)));
    assert_eq!(summary["salarySource"], "override");
}

#[tokio::test]
async fn salary_budget_item_wins_over_override() {
    let app = TestApp::new();
    let token = app.signup("precedence").await;

    app.put("/api/v1/salary", &token, json!({ "monthlySalary": 1 }))
        .await;
    app.post("/api/v1/budget", &token, budget_item("Salary", "income", 70000))
        .await;

    let (_, report) = app.get("/api/v1/summary", &token).await;
    assert_eq!(amount(&totals(&report)["totalIncome"]), Some(dec!(70000)));
    assert_eq!(totals(&report)["salarySource"], "budget_item");
}

#[tokio::test]
async fn summary_sequence_increases() {
    let app = TestApp::new();
    let token = app.signup("sequence").await;

    let (_, first) = app.get("/api/v1/summary", &token).await;
    let (_, second) = app.get("/api/v1/summary", &token).await;
    assert!(second["sequence"].as_u64() > first["sequence"].as_u64());
}

#[tokio::test]
async fn negative_salary_override_is_rejected() {
    let app = TestApp::new();
    let token = app.signup("negsalary").await;

    let (status, _) = app
        .put("/api/v1/salary", &token, json!({ "monthlySalary": -10 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, salary) = app.get("/api/v1/salary", &token).await;
    assert!(salary["monthlySalary"].is_null());
}

#[tokio::test]
async fn live_summary_follows_writes() {
    let app = TestApp::new();
    let token = app.signup("live").await;

    let initial = app.wait_for_live(&token, |_| true).await;
    assert_eq!(amount(&totals(&initial)["totalIncome"]), Some(dec!(0)));

    app.put("/api/v1/salary", &token, json!({ "monthlySalary": 40000 }))
        .await;
    app.wait_for_live(&token, |r| {
        amount(&totals(r)["totalIncome"]) == Some(dec!(40000))
    })
    .await;

    app.post("/api/v1/budget", &token, budget_item("Groceries", "expense", 6000))
        .await;
    let after_budget = app
        .wait_for_live(&token, |r| {
            amount(&totals(r)["netSavings"]) == Some(dec!(34000))
        })
        .await;
    assert!(after_budget["sequence"].as_u64() > initial["sequence"].as_u64());

    app.post("/api/v1/emis", &token, json!({
        "emiDescription": "Phone",
        "monthlyEmiPayment": 2500,
        "numberOfInstallments": 12
    }))
    .await;
    app.wait_for_live(&token, |r| {
        amount(&totals(r)["totalMonthlyObligations"]) == Some(dec!(2500))
    })
    .await;
}

#[tokio::test]
async fn live_summary_ignores_other_users() {
    let app = TestApp::new();
    let watcher = app.signup("watcher").await;
    let other = app.signup("other").await;

    let before = app.wait_for_live(&watcher, |_| true).await;
    app.put("/api/v1/salary", &other, json!({ "monthlySalary": 99999 }))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let (_, after) = app.get("/api/v1/summary/live", &watcher).await;
    assert_eq!(after["sequence"], before["sequence"]);
}

#[tokio::test]
async fn unmounting_live_summary_is_idempotent() {
    let app = TestApp::new();
    let token = app.signup("unmount").await;

    app.wait_for_live(&token, |_| true).await;
    assert_eq!(app.state.bus.subscriber_count(Topic::SalaryChanged), 1);

    assert_eq!(
        app.delete("/api/v1/summary/live", &token).await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        app.delete("/api/v1/summary/live", &token).await,
        StatusCode::NO_CONTENT
    );
    for topic in Topic::ALL {
        assert_eq!(app.state.bus.subscriber_count(topic), 0);
    }

    // Writes after unmount go unobserved without error.
    let (status, _) = app
        .put("/api/v1/salary", &token, json!({ "monthlySalary": 1000 }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

struct UnreachableLoans;

#[async_trait]
impl LoanStore for UnreachableLoans {
    async fn list(&self, _user_id: Uuid) -> AppResult<Vec<Loan>> {
        Err(AppError::Unavailable("loan store offline".to_string()))
    }

    async fn create(&self, _user_id: Uuid, _fields: CreateLoanRequest) -> AppResult<Loan> {
        Err(AppError::Unavailable("loan store offline".to_string()))
    }

    async fn update(&self, _: Uuid, _: Uuid, _: UpdateLoanRequest) -> AppResult<Loan> {
        Err(AppError::Unavailable("loan store offline".to_string()))
    }

    async fn delete(&self, _user_id: Uuid, _id: Uuid) -> AppResult<()> {
        Err(AppError::Unavailable("loan store offline".to_string()))
    }
}

#[tokio::test]
async fn failed_loan_fetch_degrades_instead_of_zeroing() {
    let mut stores = Stores::from_backend(Arc::new(MemoryStore::new()));
    stores.loans = Arc::new(UnreachableLoans);
    let app = TestApp::with_stores(stores);
    let token = app.signup("degraded").await;

    app.put("/api/v1/salary", &token, json!({ "monthlySalary": 50000 }))
        .await;
    app.post("/api/v1/budget", &token, budget_item("Housing", "expense", 15000))
        .await;

    let (status, report) = app.get("/api/v1/summary", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcome"]["status"], "degraded");

    let summary = totals(&report);
    assert_eq!(amount(&summary["netSavings"]), Some(dec!(35000)));
    assert!(summary["totalLoanPayments"].is_null());
    assert!(summary["totalMonthlyObligations"].is_null());

    let failures = report["outcome"]["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["input"], "loans");
    assert_eq!(failures[0]["retryable"], true);

    let (status, _) = app.post("/api/v1/loans", &token, loan("Car", 5000)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn padded_salary_category_stays_the_salary_line_after_update() {
    let app = TestApp::new();
    let token = app.signup("padded").await;

    app.put("/api/v1/salary", &token, json!({ "monthlySalary": 50000 }))
        .await;
    let (status, item) = app
        .post("/api/v1/budget", &token, budget_item(" Salary ", "income", 70000))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["category"], "Salary");

    let uri = format!("/api/v1/budget/{}", item["id"].as_str().unwrap());
    let (status, updated) = app
        .put(&uri, &token, json!({ "category": " Salary " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["category"], "Salary");

    let (_, report) = app.get("/api/v1/summary", &token).await;
    assert_eq!(amount(&totals(&report)["totalIncome"]), Some(dec!(70000)));
    assert_eq!(totals(&report)["salarySource"], "budget_item");
}

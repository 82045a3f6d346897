// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Distinguishes "field omitted" (`None`) from "field explicitly null"
/// (`Some(None)`) in partial-update payloads.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Text as stored: surrounding whitespace removed.
pub(crate) fn clean_text(value: String) -> String {
    value.trim().to_string()
}

/// Optional text as stored: trimmed, with blank treated as absent.
pub(crate) fn clean_optional_text(value: Option<String>) -> Option<String> {
    value.map(clean_text).filter(|v| !v.is_empty())
}

// ─── User ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub full_name: String,
    pub username: String,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            age: user.age,
            occupation: user.occupation,
            phone_number: user.phone_number,
            created_at: user.created_at,
        }
    }
}

/// Fields accepted by the store when registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub occupation: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
}

// ─── Budget Item ──────────────────────────────────────────────────────────────

// sqlx 0.8: custom Postgres enums need #[sqlx(type_name = "...")] on the enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "budget_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BudgetItemType {
    Income,
    Expense,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Format: "YYYY-MM"
    pub month_year: String,
    pub category: String,
    #[serde(rename = "type")]
    pub item_type: BudgetItemType,
    pub item_name: String,
    pub planned_amount: Decimal,
    pub actual_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetItemRequest {
    /// Format: "YYYY-MM"
    pub month_year: String,
    pub category: String,
    #[serde(rename = "type")]
    pub item_type: BudgetItemType,
    pub item_name: String,
    pub planned_amount: Decimal,
    pub actual_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetItemRequest {
    pub month_year: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<BudgetItemType>,
    pub item_name: Option<String>,
    pub planned_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub actual_amount: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl UpdateBudgetItemRequest {
    /// Overlays the provided fields onto `item`; omitted fields keep their value.
    pub fn apply_to(self, item: &mut BudgetItem) {
        if let Some(month_year) = self.month_year {
            item.month_year = clean_text(month_year);
        }
        if let Some(category) = self.category {
            item.category = clean_text(category);
        }
        if let Some(item_type) = self.item_type {
            item.item_type = item_type;
        }
        if let Some(item_name) = self.item_name {
            item.item_name = clean_text(item_name);
        }
        if let Some(planned_amount) = self.planned_amount {
            item.planned_amount = planned_amount;
        }
        if let Some(actual_amount) = self.actual_amount {
            item.actual_amount = actual_amount;
        }
        if let Some(notes) = self.notes {
            item.notes = clean_optional_text(notes);
        }
    }
}

// ─── Loan ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub loan_name: String,
    pub total_loan_amount: Decimal,
    /// Annual rate as a percentage, e.g. 8.5 means 8.5%
    pub interest_rate: Option<Decimal>,
    pub loan_term_months: i32,
    pub monthly_payment_calculated: Decimal,
    pub paid_months: i32,
    pub start_date: Option<NaiveDate>,
    pub lender_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub loan_name: String,
    pub total_loan_amount: Decimal,
    pub interest_rate: Option<Decimal>,
    pub loan_term_months: i32,
    pub monthly_payment_calculated: Decimal,
    #[serde(default)]
    pub paid_months: i32,
    pub start_date: Option<NaiveDate>,
    pub lender_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLoanRequest {
    pub loan_name: Option<String>,
    pub total_loan_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub interest_rate: Option<Option<Decimal>>,
    pub loan_term_months: Option<i32>,
    pub monthly_payment_calculated: Option<Decimal>,
    pub paid_months: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub lender_name: Option<Option<String>>,
}

impl UpdateLoanRequest {
    pub fn apply_to(self, loan: &mut Loan) {
        if let Some(loan_name) = self.loan_name {
            loan.loan_name = clean_text(loan_name);
        }
        if let Some(total) = self.total_loan_amount {
            loan.total_loan_amount = total;
        }
        if let Some(rate) = self.interest_rate {
            loan.interest_rate = rate;
        }
        if let Some(term) = self.loan_term_months {
            loan.loan_term_months = term;
        }
        if let Some(payment) = self.monthly_payment_calculated {
            loan.monthly_payment_calculated = payment;
        }
        if let Some(paid) = self.paid_months {
            loan.paid_months = paid;
        }
        if let Some(start) = self.start_date {
            loan.start_date = start;
        }
        if let Some(lender) = self.lender_name {
            loan.lender_name = clean_optional_text(lender);
        }
    }
}

// ─── EMI ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Emi {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Weak link: cleared when the referenced loan is deleted.
    pub loan_id: Option<Uuid>,
    pub emi_description: String,
    pub total_emi_amount: Option<Decimal>,
    pub monthly_emi_payment: Decimal,
    pub number_of_installments: i32,
    pub paid_installments: i32,
    pub emi_start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmiRequest {
    pub loan_id: Option<Uuid>,
    pub emi_description: String,
    pub total_emi_amount: Option<Decimal>,
    pub monthly_emi_payment: Decimal,
    pub number_of_installments: i32,
    #[serde(default)]
    pub paid_installments: i32,
    pub emi_start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmiRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub loan_id: Option<Option<Uuid>>,
    pub emi_description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub total_emi_amount: Option<Option<Decimal>>,
    pub monthly_emi_payment: Option<Decimal>,
    pub number_of_installments: Option<i32>,
    pub paid_installments: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub emi_start_date: Option<Option<NaiveDate>>,
}

impl UpdateEmiRequest {
    pub fn apply_to(self, emi: &mut Emi) {
        if let Some(loan_id) = self.loan_id {
            emi.loan_id = loan_id;
        }
        if let Some(description) = self.emi_description {
            emi.emi_description = clean_text(description);
        }
        if let Some(total) = self.total_emi_amount {
            emi.total_emi_amount = total;
        }
        if let Some(payment) = self.monthly_emi_payment {
            emi.monthly_emi_payment = payment;
        }
        if let Some(count) = self.number_of_installments {
            emi.number_of_installments = count;
        }
        if let Some(paid) = self.paid_installments {
            emi.paid_installments = paid;
        }
        if let Some(start) = self.emi_start_date {
            emi.emi_start_date = start;
        }
    }
}

// ─── Salary Override ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryOverrideBody {
    /// `null` when no override has been saved
    pub monthly_salary: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSalaryRequest {
    pub monthly_salary: Decimal,
}

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

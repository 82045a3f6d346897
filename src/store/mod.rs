// src/store/mod.rs
//
// Persistence seams. Every collection is partitioned by owning user id: a
// record owned by someone else behaves exactly like a missing one.

pub mod memory;
pub mod postgres;

use crate::{
    errors::AppResult,
    models::{
        BudgetItem, CreateBudgetItemRequest, CreateEmiRequest, CreateLoanRequest, Emi, Loan,
        NewUser, UpdateBudgetItemRequest, UpdateEmiRequest, UpdateLoanRequest,
        UpdateProfileRequest, User, clean_optional_text, clean_text,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, user: NewUser) -> AppResult<User>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn get(&self, user_id: Uuid) -> AppResult<User>;
    async fn update_profile(&self, user_id: Uuid, patch: UpdateProfileRequest) -> AppResult<User>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<BudgetItem>>;
    async fn create(&self, user_id: Uuid, fields: CreateBudgetItemRequest) -> AppResult<BudgetItem>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: UpdateBudgetItemRequest,
    ) -> AppResult<BudgetItem>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Loan>>;
    async fn create(&self, user_id: Uuid, fields: CreateLoanRequest) -> AppResult<Loan>;
    async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateLoanRequest) -> AppResult<Loan>;
    /// Removes the loan and detaches (never deletes) the EMIs that referenced it.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait EmiStore: Send + Sync {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Emi>>;
    /// A `loan_id` that is missing or owned by another user fails with `Validation`.
    async fn create(&self, user_id: Uuid, fields: CreateEmiRequest) -> AppResult<Emi>;
    async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateEmiRequest) -> AppResult<Emi>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait SalaryStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<Decimal>>;
    async fn set(&self, user_id: Uuid, monthly_salary: Decimal) -> AppResult<()>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn backend_name(&self) -> &'static str;
    async fn ping(&self) -> AppResult<()>;
}

/// The backend as seen by services: one handle per collection.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub loans: Arc<dyn LoanStore>,
    pub emis: Arc<dyn EmiStore>,
    pub salaries: Arc<dyn SalaryStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Stores {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + BudgetStore + LoanStore + EmiStore + SalaryStore + StoreHealth + 'static,
    {
        Self {
            users: backend.clone(),
            budgets: backend.clone(),
            loans: backend.clone(),
            emis: backend.clone(),
            salaries: backend.clone(),
            health: backend,
        }
    }
}

// ─── Record construction ──────────────────────────────────────────────────────

pub(crate) fn new_budget_item(user_id: Uuid, fields: CreateBudgetItemRequest) -> BudgetItem {
    let now = Utc::now();
    BudgetItem {
        id: Uuid::new_v4(),
        user_id,
        month_year: clean_text(fields.month_year),
        category: clean_text(fields.category),
        item_type: fields.item_type,
        item_name: clean_text(fields.item_name),
        planned_amount: fields.planned_amount,
        actual_amount: fields.actual_amount,
        notes: clean_optional_text(fields.notes),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn new_loan(user_id: Uuid, fields: CreateLoanRequest) -> Loan {
    let now = Utc::now();
    Loan {
        id: Uuid::new_v4(),
        user_id,
        loan_name: clean_text(fields.loan_name),
        total_loan_amount: fields.total_loan_amount,
        interest_rate: fields.interest_rate,
        loan_term_months: fields.loan_term_months,
        monthly_payment_calculated: fields.monthly_payment_calculated,
        paid_months: fields.paid_months,
        start_date: fields.start_date,
        lender_name: clean_optional_text(fields.lender_name),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn new_emi(user_id: Uuid, fields: CreateEmiRequest) -> Emi {
    let now = Utc::now();
    Emi {
        id: Uuid::new_v4(),
        user_id,
        loan_id: fields.loan_id,
        emi_description: clean_text(fields.emi_description),
        total_emi_amount: fields.total_emi_amount,
        monthly_emi_payment: fields.monthly_emi_payment,
        number_of_installments: fields.number_of_installments,
        paid_installments: fields.paid_installments,
        emi_start_date: fields.emi_start_date,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn new_user(fields: NewUser) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        full_name: fields.full_name,
        username: fields.username,
        password_hash: fields.password_hash,
        age: fields.age,
        occupation: fields.occupation,
        phone_number: fields.phone_number,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn apply_profile(user: &mut User, patch: UpdateProfileRequest) {
    if let Some(full_name) = patch.full_name {
        user.full_name = clean_text(full_name);
    }
    if let Some(age) = patch.age {
        user.age = age;
    }
    if let Some(occupation) = patch.occupation {
        user.occupation = clean_optional_text(occupation);
    }
    if let Some(phone) = patch.phone_number {
        user.phone_number = clean_optional_text(phone);
    }
}

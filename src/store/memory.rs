// src/store/memory.rs

use super::{
    BudgetStore, EmiStore, LoanStore, SalaryStore, StoreHealth, UserStore, apply_profile,
    new_budget_item, new_emi, new_loan, new_user,
};
use crate::{
    errors::{AppError, AppResult},
    models::{
        BudgetItem, CreateBudgetItemRequest, CreateEmiRequest, CreateLoanRequest, Emi, Loan,
        NewUser, UpdateBudgetItemRequest, UpdateEmiRequest, UpdateLoanRequest,
        UpdateProfileRequest, User,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    budget_items: HashMap<Uuid, BudgetItem>,
    loans: HashMap<Uuid, Loan>,
    emis: HashMap<Uuid, Emi>,
    salaries: HashMap<Uuid, Decimal>,
}

impl Collections {
    fn owns_loan(&self, user_id: Uuid, loan_id: Uuid) -> bool {
        self.loans
            .get(&loan_id)
            .is_some_and(|loan| loan.user_id == user_id)
    }
}

/// In-process backend with the same semantics as [`super::PgStore`].
/// A single lock guards all collections so cross-collection rules
/// (EMI loan ownership, detach on loan delete) are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        let user = new_user(user);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    async fn get(&self, user_id: Uuid) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn update_profile(&self, user_id: Uuid, patch: UpdateProfileRequest) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if let Some(Some(phone)) = &patch.phone_number {
            let phone = phone.trim();
            let taken = inner.users.values().any(|u| {
                u.id != user_id && !phone.is_empty() && u.phone_number.as_deref() == Some(phone)
            });
            if taken {
                return Err(AppError::Conflict(
                    "Phone number is already in use by another account".to_string(),
                ));
            }
        }
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::not_found("User not found"))?;
        apply_profile(user, patch);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<BudgetItem>> {
        let inner = self.inner.read().await;
        let mut items: Vec<BudgetItem> = inner
            .budget_items
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect();
        // monthYear DESC, type ASC (income before expense), created ASC
        items.sort_by(|a, b| {
            b.month_year
                .cmp(&a.month_year)
                .then_with(|| (a.item_type as u8).cmp(&(b.item_type as u8)))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    async fn create(&self, user_id: Uuid, fields: CreateBudgetItemRequest) -> AppResult<BudgetItem> {
        let item = new_budget_item(user_id, fields);
        item.validate()?;
        let mut inner = self.inner.write().await;
        inner.budget_items.insert(item.id, item.clone());
        debug!("budget item {} stored for user {}", item.id, user_id);
        Ok(item)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: UpdateBudgetItemRequest,
    ) -> AppResult<BudgetItem> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .budget_items
            .get(&id)
            .filter(|item| item.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("Budget item {} not found", id)))?;

        let mut merged = existing.clone();
        patch.apply_to(&mut merged);
        merged.validate()?;
        merged.updated_at = Utc::now();
        inner.budget_items.insert(id, merged.clone());
        Ok(merged)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.budget_items.get(&id) {
            Some(item) if item.user_id == user_id => {
                inner.budget_items.remove(&id);
                Ok(())
            }
            _ => Err(AppError::not_found(format!("Budget item {} not found", id))),
        }
    }
}

#[async_trait]
impl LoanStore for MemoryStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        let inner = self.inner.read().await;
        let mut loans: Vec<Loan> = inner
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(loans)
    }

    async fn create(&self, user_id: Uuid, fields: CreateLoanRequest) -> AppResult<Loan> {
        let loan = new_loan(user_id, fields);
        loan.validate()?;
        let mut inner = self.inner.write().await;
        inner.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateLoanRequest) -> AppResult<Loan> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .loans
            .get(&id)
            .filter(|loan| loan.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("Loan {} not found", id)))?;

        let mut merged = existing.clone();
        patch.apply_to(&mut merged);
        merged.validate()?;
        merged.updated_at = Utc::now();
        inner.loans.insert(id, merged.clone());
        Ok(merged)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.owns_loan(user_id, id) {
            return Err(AppError::not_found(format!("Loan {} not found", id)));
        }
        inner.loans.remove(&id);

        let now = Utc::now();
        let mut detached = 0;
        for emi in inner.emis.values_mut().filter(|e| e.loan_id == Some(id)) {
            emi.loan_id = None;
            emi.updated_at = now;
            detached += 1;
        }
        debug!("loan {} deleted, {} EMI(s) detached", id, detached);
        Ok(())
    }
}

#[async_trait]
impl EmiStore for MemoryStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Emi>> {
        let inner = self.inner.read().await;
        let mut emis: Vec<Emi> = inner
            .emis
            .values()
            .filter(|emi| emi.user_id == user_id)
            .cloned()
            .collect();
        // start date ASC with undated EMIs last, then created ASC
        emis.sort_by(|a, b| {
            match (a.emi_start_date, b.emi_start_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(emis)
    }

    async fn create(&self, user_id: Uuid, fields: CreateEmiRequest) -> AppResult<Emi> {
        let emi = new_emi(user_id, fields);
        emi.validate()?;
        let mut inner = self.inner.write().await;
        if let Some(loan_id) = emi.loan_id {
            if !inner.owns_loan(user_id, loan_id) {
                return Err(AppError::validation(
                    "Associated loan not found or you do not have permission for it",
                ));
            }
        }
        inner.emis.insert(emi.id, emi.clone());
        Ok(emi)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateEmiRequest) -> AppResult<Emi> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .emis
            .get(&id)
            .filter(|emi| emi.user_id == user_id)
            .ok_or_else(|| AppError::not_found(format!("EMI {} not found", id)))?;

        let mut merged = existing.clone();
        let relinked = patch.loan_id.flatten();
        patch.apply_to(&mut merged);
        merged.validate()?;
        if let Some(loan_id) = relinked {
            if !inner.owns_loan(user_id, loan_id) {
                return Err(AppError::validation(
                    "Associated loan for update not found or not owned by user",
                ));
            }
        }
        merged.updated_at = Utc::now();
        inner.emis.insert(id, merged.clone());
        Ok(merged)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        match inner.emis.get(&id) {
            Some(emi) if emi.user_id == user_id => {
                inner.emis.remove(&id);
                Ok(())
            }
            _ => Err(AppError::not_found(format!("EMI {} not found", id))),
        }
    }
}

#[async_trait]
impl SalaryStore for MemoryStore {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<Decimal>> {
        Ok(self.inner.read().await.salaries.get(&user_id).copied())
    }

    async fn set(&self, user_id: Uuid, monthly_salary: Decimal) -> AppResult<()> {
        self.inner
            .write()
            .await
            .salaries
            .insert(user_id, monthly_salary);
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

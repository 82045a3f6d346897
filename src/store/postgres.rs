// src/store/postgres.rs

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
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(code))
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

async fn assert_loan_owned(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    loan_id: Uuid,
    message: &str,
) -> AppResult<()> {
    // FOR SHARE keeps the loan from being deleted until the EMI write commits
    let found = sqlx::query("SELECT id FROM loans WHERE id = $1 AND user_id = $2 FOR SHARE")
        .bind(loan_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    if found.is_none() {
        return Err(AppError::validation(message));
    }
    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let user = new_user(user);
        let username = user.username.clone();
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (
                id, full_name, username, password_hash, age, occupation, phone_number,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            RETURNING *"#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.occupation)
        .bind(&user.phone_number)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if has_code(&e, UNIQUE_VIOLATION) {
                AppError::Conflict(format!(
                    "An account with that username or phone number already exists ({})",
                    username
                ))
            } else {
                e.into()
            }
        })
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn get(&self, user_id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn update_profile(&self, user_id: Uuid, patch: UpdateProfileRequest) -> AppResult<User> {
        let mut tx = self.db.begin().await?;
        let mut user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        apply_profile(&mut user, patch);

        let updated = sqlx::query_as::<_, User>(
            r#"UPDATE users
               SET full_name = $1, age = $2, occupation = $3, phone_number = $4, updated_at = NOW()
               WHERE id = $5
               RETURNING *"#,
        )
        .bind(&user.full_name)
        .bind(user.age)
        .bind(&user.occupation)
        .bind(&user.phone_number)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if has_code(&e, UNIQUE_VIOLATION) {
                AppError::Conflict("Phone number is already in use by another account".to_string())
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(updated)
    }
}

#[async_trait]
impl BudgetStore for PgStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<BudgetItem>> {
        let items = sqlx::query_as::<_, BudgetItem>(
            r#"SELECT * FROM budget_items
               WHERE user_id = $1
               ORDER BY month_year DESC, item_type ASC, created_at ASC"#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }

    async fn create(&self, user_id: Uuid, fields: CreateBudgetItemRequest) -> AppResult<BudgetItem> {
        let item = new_budget_item(user_id, fields);
        item.validate()?;

        let created = sqlx::query_as::<_, BudgetItem>(
            r#"INSERT INTO budget_items (
                id, user_id, month_year, category, item_type, item_name,
                planned_amount, actual_amount, notes, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *"#,
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.month_year)
        .bind(&item.category)
        .bind(item.item_type)
        .bind(&item.item_name)
        .bind(item.planned_amount)
        .bind(item.actual_amount)
        .bind(&item.notes)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.db)
        .await?;

        debug!("budget item {} stored for user {}", created.id, user_id);
        Ok(created)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: UpdateBudgetItemRequest,
    ) -> AppResult<BudgetItem> {
        let mut tx = self.db.begin().await?;
        let mut item = sqlx::query_as::<_, BudgetItem>(
            "SELECT * FROM budget_items WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Budget item {} not found", id)))?;

        patch.apply_to(&mut item);
        item.validate()?;

        let updated = sqlx::query_as::<_, BudgetItem>(
            r#"UPDATE budget_items
               SET month_year = $1, category = $2, item_type = $3, item_name = $4,
                   planned_amount = $5, actual_amount = $6, notes = $7, updated_at = NOW()
               WHERE id = $8 AND user_id = $9
               RETURNING *"#,
        )
        .bind(&item.month_year)
        .bind(&item.category)
        .bind(item.item_type)
        .bind(&item.item_name)
        .bind(item.planned_amount)
        .bind(item.actual_amount)
        .bind(&item.notes)
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM budget_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Budget item {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl LoanStore for PgStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(loans)
    }

    async fn create(&self, user_id: Uuid, fields: CreateLoanRequest) -> AppResult<Loan> {
        let loan = new_loan(user_id, fields);
        loan.validate()?;

        let created = sqlx::query_as::<_, Loan>(
            r#"INSERT INTO loans (
                id, user_id, loan_name, total_loan_amount, interest_rate, loan_term_months,
                monthly_payment_calculated, paid_months, start_date, lender_name,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            RETURNING *"#,
        )
        .bind(loan.id)
        .bind(loan.user_id)
        .bind(&loan.loan_name)
        .bind(loan.total_loan_amount)
        .bind(loan.interest_rate)
        .bind(loan.loan_term_months)
        .bind(loan.monthly_payment_calculated)
        .bind(loan.paid_months)
        .bind(loan.start_date)
        .bind(&loan.lender_name)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateLoanRequest) -> AppResult<Loan> {
        let mut tx = self.db.begin().await?;
        let mut loan = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Loan {} not found", id)))?;

        patch.apply_to(&mut loan);
        loan.validate()?;

        let updated = sqlx::query_as::<_, Loan>(
            r#"UPDATE loans
               SET loan_name = $1, total_loan_amount = $2, interest_rate = $3,
                   loan_term_months = $4, monthly_payment_calculated = $5, paid_months = $6,
                   start_date = $7, lender_name = $8, updated_at = NOW()
               WHERE id = $9 AND user_id = $10
               RETURNING *"#,
        )
        .bind(&loan.loan_name)
        .bind(loan.total_loan_amount)
        .bind(loan.interest_rate)
        .bind(loan.loan_term_months)
        .bind(loan.monthly_payment_calculated)
        .bind(loan.paid_months)
        .bind(loan.start_date)
        .bind(&loan.lender_name)
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        // emis.loan_id is ON DELETE SET NULL, so linked EMIs survive detached
        let result = sqlx::query("DELETE FROM loans WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Loan {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl EmiStore for PgStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<Emi>> {
        let emis = sqlx::query_as::<_, Emi>(
            r#"SELECT * FROM emis
               WHERE user_id = $1
               ORDER BY emi_start_date ASC NULLS LAST, created_at ASC"#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(emis)
    }

    async fn create(&self, user_id: Uuid, fields: CreateEmiRequest) -> AppResult<Emi> {
        let emi = new_emi(user_id, fields);
        emi.validate()?;

        let mut tx = self.db.begin().await?;
        if let Some(loan_id) = emi.loan_id {
            assert_loan_owned(
                &mut tx,
                user_id,
                loan_id,
                "Associated loan not found or you do not have permission for it",
            )
            .await?;
        }

        let created = sqlx::query_as::<_, Emi>(
            r#"INSERT INTO emis (
                id, user_id, loan_id, emi_description, total_emi_amount, monthly_emi_payment,
                number_of_installments, paid_installments, emi_start_date, created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            RETURNING *"#,
        )
        .bind(emi.id)
        .bind(emi.user_id)
        .bind(emi.loan_id)
        .bind(&emi.emi_description)
        .bind(emi.total_emi_amount)
        .bind(emi.monthly_emi_payment)
        .bind(emi.number_of_installments)
        .bind(emi.paid_installments)
        .bind(emi.emi_start_date)
        .bind(emi.created_at)
        .bind(emi.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if has_code(&e, FOREIGN_KEY_VIOLATION) {
                AppError::validation("Associated loan no longer exists")
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: UpdateEmiRequest) -> AppResult<Emi> {
        let mut tx = self.db.begin().await?;
        let mut emi = sqlx::query_as::<_, Emi>(
            "SELECT * FROM emis WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(format!("EMI {} not found", id)))?;

        let relinked = patch.loan_id.flatten();
        patch.apply_to(&mut emi);
        emi.validate()?;
        if let Some(loan_id) = relinked {
            assert_loan_owned(
                &mut tx,
                user_id,
                loan_id,
                "Associated loan for update not found or not owned by user",
            )
            .await?;
        }

        let updated = sqlx::query_as::<_, Emi>(
            r#"UPDATE emis
               SET loan_id = $1, emi_description = $2, total_emi_amount = $3,
                   monthly_emi_payment = $4, number_of_installments = $5,
                   paid_installments = $6, emi_start_date = $7, updated_at = NOW()
               WHERE id = $8 AND user_id = $9
               RETURNING *"#,
        )
        .bind(emi.loan_id)
        .bind(&emi.emi_description)
        .bind(emi.total_emi_amount)
        .bind(emi.monthly_emi_payment)
        .bind(emi.number_of_installments)
        .bind(emi.paid_installments)
        .bind(emi.emi_start_date)
        .bind(id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM emis WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("EMI {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SalaryStore for PgStore {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<Decimal>> {
        let salary: Option<Decimal> = sqlx::query_scalar(
            "SELECT monthly_salary FROM salary_overrides WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(salary)
    }

    async fn set(&self, user_id: Uuid, monthly_salary: Decimal) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO salary_overrides (user_id, monthly_salary, updated_at)
               VALUES ($1, $2, NOW())
               ON CONFLICT (user_id) DO UPDATE
               SET monthly_salary = EXCLUDED.monthly_salary,
                   updated_at = NOW()"#,
        )
        .bind(user_id)
        .bind(monthly_salary)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.db).await?;
        Ok(())
    }
}

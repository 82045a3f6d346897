// src/validation.rs
//
// Record-level constraints shared by both storage backends. Stores call these
// on the fully merged record right before writing, so a partial update is
// checked against the values it will actually persist.

use crate::{
    errors::{AppError, AppResult},
    models::{BudgetItem, Emi, Loan},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

// Integer digits allowed by the NUMERIC(p, 2) columns each value is stored in
const AMOUNT_DIGITS: u32 = 10;
const LOAN_TOTAL_DIGITS: u32 = 12;
const RATE_DIGITS: u32 = 3;
const MAX_DECIMAL_PLACES: u32 = 2;

fn require_fits(value: Decimal, field: &str, integer_digits: u32) -> AppResult<()> {
    if value.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(AppError::validation(format!(
            "{} can have at most {} decimal places",
            field, MAX_DECIMAL_PLACES
        )));
    }
    let limit = Decimal::from(10u64.pow(integer_digits));
    if value.abs() >= limit {
        return Err(AppError::validation(format!(
            "{} must be less than {}",
            field, limit
        )));
    }
    Ok(())
}

fn require_text(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_non_negative(value: Decimal, field: &str) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::validation(format!("{} cannot be negative", field)));
    }
    Ok(())
}

fn require_positive(value: Decimal, field: &str) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!("{} must be a positive number", field)));
    }
    Ok(())
}

/// Accepts labels of the form `YYYY-MM`.
pub fn validate_month_year(value: &str) -> AppResult<()> {
    let well_formed = value.len() == 7
        && value.as_bytes()[4] == b'-'
        && NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok();
    if !well_formed {
        return Err(AppError::validation(format!(
            "monthYear must be formatted as YYYY-MM, got '{}'",
            value
        )));
    }
    Ok(())
}

impl BudgetItem {
    pub fn validate(&self) -> AppResult<()> {
        validate_month_year(&self.month_year)?;
        require_text(&self.category, "category")?;
        require_text(&self.item_name, "itemName")?;
        require_non_negative(self.planned_amount, "plannedAmount")?;
        require_fits(self.planned_amount, "plannedAmount", AMOUNT_DIGITS)?;
        if let Some(actual) = self.actual_amount {
            require_non_negative(actual, "actualAmount")?;
            require_fits(actual, "actualAmount", AMOUNT_DIGITS)?;
        }
        Ok(())
    }
}

impl Loan {
    pub fn validate(&self) -> AppResult<()> {
        require_text(&self.loan_name, "loanName")?;
        require_positive(self.total_loan_amount, "totalLoanAmount")?;
        require_fits(self.total_loan_amount, "totalLoanAmount", LOAN_TOTAL_DIGITS)?;
        if self.loan_term_months <= 0 {
            return Err(AppError::validation("loanTermMonths must be a positive integer"));
        }
        require_non_negative(self.monthly_payment_calculated, "monthlyPaymentCalculated")?;
        require_fits(
            self.monthly_payment_calculated,
            "monthlyPaymentCalculated",
            AMOUNT_DIGITS,
        )?;
        if self.paid_months < 0 {
            return Err(AppError::validation("paidMonths cannot be negative"));
        }
        if let Some(rate) = self.interest_rate {
            require_non_negative(rate, "interestRate")?;
            require_fits(rate, "interestRate", RATE_DIGITS)?;
        }
        Ok(())
    }
}

impl Emi {
    /// Field constraints only; loan ownership needs the store and is checked there.
    pub fn validate(&self) -> AppResult<()> {
        require_text(&self.emi_description, "emiDescription")?;
        require_positive(self.monthly_emi_payment, "monthlyEmiPayment")?;
        require_fits(self.monthly_emi_payment, "monthlyEmiPayment", AMOUNT_DIGITS)?;
        if self.number_of_installments <= 0 {
            return Err(AppError::validation(
                "numberOfInstallments must be a positive integer",
            ));
        }
        if self.paid_installments < 0 {
            return Err(AppError::validation("paidInstallments cannot be negative"));
        }
        if let Some(total) = self.total_emi_amount {
            require_non_negative(total, "totalEmiAmount")?;
            require_fits(total, "totalEmiAmount", AMOUNT_DIGITS)?;
        }
        Ok(())
    }
}

pub fn validate_salary(amount: Decimal) -> AppResult<()> {
    require_non_negative(amount, "monthlySalary")?;
    require_fits(amount, "monthlySalary", AMOUNT_DIGITS)
}

// src/services/summary.rs

use crate::{
    errors::AppError,
    models::{BudgetItem, Emi, Loan},
    services::classification::{is_expense, is_investment, is_other_income, is_salary},
    store::Stores,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Result types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SummaryInput {
    BudgetItems,
    Loans,
    Emis,
    SalaryOverride,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputFailure {
    pub input: SummaryInput,
    pub message: String,
    pub retryable: bool,
}

impl InputFailure {
    fn from_error(input: SummaryInput, err: &AppError) -> Self {
        Self {
            input,
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SalarySource {
    /// An income budget item categorised "salary"
    BudgetItem,
    /// The user's saved salary override
    Override,
    /// Neither exists; salary counts as zero
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSalary {
    pub amount: Decimal,
    pub source: SalarySource,
}

/// Derived totals. A `None` field could not be computed because an input it
/// depends on failed to load; it is never reported as zero.
#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSummary {
    pub total_income: Option<Decimal>,
    pub total_expenses: Option<Decimal>,
    pub net_savings: Option<Decimal>,
    pub total_loan_payments: Option<Decimal>,
    pub investment_outflow: Option<Decimal>,
    /// Monthly payments of EMIs not linked to any loan
    pub standalone_emi_payments: Option<Decimal>,
    pub total_monthly_obligations: Option<Decimal>,
    pub salary_source: Option<SalarySource>,
}

impl DerivedSummary {
    fn has_any_total(&self) -> bool {
        self.total_income.is_some()
            || self.total_expenses.is_some()
            || self.total_loan_payments.is_some()
            || self.standalone_emi_payments.is_some()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryOutcome {
    Complete {
        summary: DerivedSummary,
    },
    /// Some inputs failed; the summary holds what could still be computed.
    Degraded {
        summary: DerivedSummary,
        failures: Vec<InputFailure>,
    },
    Failed {
        failures: Vec<InputFailure>,
    },
}

impl SummaryOutcome {
    pub fn summary(&self) -> Option<&DerivedSummary> {
        match self {
            SummaryOutcome::Complete { summary } | SummaryOutcome::Degraded { summary, .. } => {
                Some(summary)
            }
            SummaryOutcome::Failed { .. } => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            SummaryOutcome::Complete { .. } => "complete",
            SummaryOutcome::Degraded { .. } => "degraded",
            SummaryOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    /// Monotonic per process; a higher number was started later
    pub sequence: u64,
    pub user_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub outcome: SummaryOutcome,
}

/// Raw aggregation inputs as loaded, each independently successful or not.
pub struct SummaryInputs {
    pub budget_items: Result<Vec<BudgetItem>, InputFailure>,
    pub loans: Result<Vec<Loan>, InputFailure>,
    pub emis: Result<Vec<Emi>, InputFailure>,
    pub salary_override: Result<Option<Decimal>, InputFailure>,
}

// ─── Pure aggregation ─────────────────────────────────────────────────────────

/// Salary precedence: a salary budget item wins over the override, which
/// wins over nothing. Both are never added together.
pub fn resolve_salary(items: &[BudgetItem], local_override: Option<Decimal>) -> ResolvedSalary {
    match items.iter().find(|item| is_salary(item)) {
        Some(item) => ResolvedSalary {
            amount: item.planned_amount,
            source: SalarySource::BudgetItem,
        },
        None => match local_override {
            Some(amount) => ResolvedSalary {
                amount,
                source: SalarySource::Override,
            },
            None => ResolvedSalary {
                amount: Decimal::ZERO,
                source: SalarySource::Unset,
            },
        },
    }
}

fn sum_planned(items: &[BudgetItem], include: fn(&BudgetItem) -> bool) -> Decimal {
    items
        .iter()
        .filter(|item| include(item))
        .map(|item| item.planned_amount)
        .sum()
}

pub fn aggregate(inputs: SummaryInputs) -> SummaryOutcome {
    let mut summary = DerivedSummary::default();
    let mut failures = Vec::new();

    match &inputs.budget_items {
        Ok(items) => {
            let has_salary_item = items.iter().any(is_salary);
            let salary = match (&inputs.salary_override, has_salary_item) {
                (_, true) => Some(resolve_salary(items, None)),
                (Ok(local), false) => Some(resolve_salary(items, *local)),
                (Err(failure), false) => {
                    failures.push(failure.clone());
                    None
                }
            };

            let expenses = sum_planned(items, is_expense);
            summary.total_expenses = Some(expenses);
            summary.investment_outflow = Some(sum_planned(items, is_investment));

            if let Some(salary) = salary {
                let income = salary.amount + sum_planned(items, is_other_income);
                summary.total_income = Some(income);
                summary.net_savings = Some(income - expenses);
                summary.salary_source = Some(salary.source);
            }
        }
        Err(failure) => {
            failures.push(failure.clone());
            if let Err(salary_failure) = &inputs.salary_override {
                failures.push(salary_failure.clone());
            }
        }
    }

    match &inputs.loans {
        Ok(loans) => {
            summary.total_loan_payments =
                Some(loans.iter().map(|l| l.monthly_payment_calculated).sum());
        }
        Err(failure) => failures.push(failure.clone()),
    }

    match &inputs.emis {
        Ok(emis) => {
            // Linked EMIs are already covered by their loan's scheduled payment
            summary.standalone_emi_payments = Some(
                emis.iter()
                    .filter(|e| e.loan_id.is_none())
                    .map(|e| e.monthly_emi_payment)
                    .sum(),
            );
        }
        Err(failure) => failures.push(failure.clone()),
    }

    if let (Some(loans), Some(emis)) = (summary.total_loan_payments, summary.standalone_emi_payments)
    {
        summary.total_monthly_obligations = Some(loans + emis);
    }

    if failures.is_empty() {
        SummaryOutcome::Complete { summary }
    } else if summary.has_any_total() {
        SummaryOutcome::Degraded { summary, failures }
    } else {
        SummaryOutcome::Failed { failures }
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Recomputes a user's summary from scratch on every call; nothing from a
/// previous computation is reused.
#[derive(Clone)]
pub struct SummaryEngine {
    stores: Stores,
    sequence: Arc<AtomicU64>,
}

impl SummaryEngine {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn compute_summary(&self, user_id: Uuid) -> SummaryReport {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let (budget_items, loans, emis, salary_override) = tokio::join!(
            self.stores.budgets.list(user_id),
            self.stores.loans.list(user_id),
            self.stores.emis.list(user_id),
            self.stores.salaries.get(user_id),
        );

        let inputs = SummaryInputs {
            budget_items: budget_items
                .map_err(|e| InputFailure::from_error(SummaryInput::BudgetItems, &e)),
            loans: loans.map_err(|e| InputFailure::from_error(SummaryInput::Loans, &e)),
            emis: emis.map_err(|e| InputFailure::from_error(SummaryInput::Emis, &e)),
            salary_override: salary_override
                .map_err(|e| InputFailure::from_error(SummaryInput::SalaryOverride, &e)),
        };

        let outcome = aggregate(inputs);
        match &outcome {
            SummaryOutcome::Complete { .. } => {
                info!("Summary #{} for user {} complete", sequence, user_id)
            }
            SummaryOutcome::Degraded { failures, .. } | SummaryOutcome::Failed { failures } => {
                for failure in failures {
                    warn!(
                        "Summary #{} for user {}: {:?} unavailable: {}",
                        sequence, user_id, failure.input, failure.message
                    );
                }
            }
        }

        SummaryReport {
            sequence,
            user_id,
            computed_at: Utc::now(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetItemType;
    use rust_decimal_macros::dec;

    fn budget(item_type: BudgetItemType, category: &str, planned: Decimal) -> BudgetItem {
        BudgetItem {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            month_year: "2025-06".into(),
            category: category.into(),
            item_type,
            item_name: category.into(),
            planned_amount: planned,
            actual_amount: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn loan(payment: Decimal) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            loan_name: "Home".into(),
            total_loan_amount: dec!(1000000),
            interest_rate: None,
            loan_term_months: 120,
            monthly_payment_calculated: payment,
            paid_months: 0,
            start_date: None,
            lender_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn emi(payment: Decimal, loan_id: Option<Uuid>) -> Emi {
        Emi {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            loan_id,
            emi_description: "Laptop".into(),
            total_emi_amount: None,
            monthly_emi_payment: payment,
            number_of_installments: 12,
            paid_installments: 0,
            emi_start_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn failure(input: SummaryInput) -> InputFailure {
        InputFailure {
            input,
            message: "connection reset".into(),
            retryable: true,
        }
    }

    fn inputs(items: Vec<BudgetItem>, loans: Vec<Loan>, salary: Option<Decimal>) -> SummaryInputs {
        SummaryInputs {
            budget_items: Ok(items),
            loans: Ok(loans),
            emis: Ok(Vec::new()),
            salary_override: Ok(salary),
        }
    }

    #[test]
    fn override_used_when_no_salary_item() {
        let outcome = aggregate(inputs(
            vec![
                budget(BudgetItemType::Income, "Other Income", dec!(10000)),
                budget(BudgetItemType::Expense, "Housing", dec!(15000)),
            ],
            vec![loan(dec!(8000))],
            Some(dec!(50000)),
        ));

        let SummaryOutcome::Complete { summary } = outcome else {
            panic!("expected complete outcome");
        };
        assert_eq!(summary.total_income, Some(dec!(60000)));
        assert_eq!(summary.total_expenses, Some(dec!(15000)));
        assert_eq!(summary.net_savings, Some(dec!(45000)));
        assert_eq!(summary.total_loan_payments, Some(dec!(8000)));
        assert_eq!(summary.investment_outflow, Some(dec!(0)));
        assert_eq!(summary.salary_source, Some(SalarySource::Override));
    }

    #[test]
    fn salary_item_beats_stale_override() {
        let outcome = aggregate(inputs(
            vec![budget(BudgetItemType::Income, "Salary", dec!(70000))],
            vec![],
            Some(dec!(1)),
        ));

        let summary = outcome.summary().unwrap();
        assert_eq!(summary.total_income, Some(dec!(70000)));
        assert_eq!(summary.salary_source, Some(SalarySource::BudgetItem));
    }

    #[test]
    fn unset_override_counts_as_zero() {
        let resolved = resolve_salary(&[], None);
        assert_eq!(resolved.amount, Decimal::ZERO);
        assert_eq!(resolved.source, SalarySource::Unset);
    }

    #[test]
    fn all_zero_inputs_give_zero_net_savings() {
        let outcome = aggregate(inputs(vec![], vec![], None));
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.total_income, Some(dec!(0)));
        assert_eq!(summary.net_savings, Some(dec!(0)));
    }

    #[test]
    fn investments_are_counted_in_expenses_too() {
        let outcome = aggregate(inputs(
            vec![
                budget(BudgetItemType::Expense, "Investment/Savings Contribution", dec!(5000)),
                budget(BudgetItemType::Expense, "Groceries", dec!(7000)),
            ],
            vec![],
            Some(dec!(30000)),
        ));
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.total_expenses, Some(dec!(12000)));
        assert_eq!(summary.investment_outflow, Some(dec!(5000)));
        assert_eq!(summary.net_savings, Some(dec!(18000)));
    }

    #[test]
    fn linked_emis_are_not_double_counted() {
        let home = loan(dec!(8000));
        let mut all = inputs(vec![], vec![home.clone()], None);
        all.emis = Ok(vec![emi(dec!(8000), Some(home.id)), emi(dec!(2500), None)]);

        let summary = aggregate(all).summary().cloned().unwrap();
        assert_eq!(summary.total_loan_payments, Some(dec!(8000)));
        assert_eq!(summary.standalone_emi_payments, Some(dec!(2500)));
        assert_eq!(summary.total_monthly_obligations, Some(dec!(10500)));
    }

    #[test]
    fn failed_loans_are_flagged_not_zeroed() {
        let mut all = inputs(
            vec![budget(BudgetItemType::Expense, "Housing", dec!(15000))],
            vec![],
            Some(dec!(50000)),
        );
        all.loans = Err(failure(SummaryInput::Loans));

        let SummaryOutcome::Degraded { summary, failures } = aggregate(all) else {
            panic!("expected degraded outcome");
        };
        assert_eq!(summary.total_income, Some(dec!(50000)));
        assert_eq!(summary.net_savings, Some(dec!(35000)));
        assert_eq!(summary.total_loan_payments, None);
        assert_eq!(summary.total_monthly_obligations, None);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].input, SummaryInput::Loans);
    }

    #[test]
    fn override_failure_is_ignored_when_salary_item_exists() {
        let mut all = inputs(
            vec![budget(BudgetItemType::Income, "salary", dec!(40000))],
            vec![],
            None,
        );
        all.salary_override = Err(failure(SummaryInput::SalaryOverride));

        let outcome = aggregate(all);
        assert_eq!(outcome.status(), "complete");
    }

    #[test]
    fn override_failure_withholds_income_when_needed() {
        let mut all = inputs(
            vec![budget(BudgetItemType::Expense, "Housing", dec!(15000))],
            vec![],
            None,
        );
        all.salary_override = Err(failure(SummaryInput::SalaryOverride));

        let SummaryOutcome::Degraded { summary, .. } = aggregate(all) else {
            panic!("expected degraded outcome");
        };
        assert_eq!(summary.total_income, None);
        assert_eq!(summary.net_savings, None);
        assert_eq!(summary.total_expenses, Some(dec!(15000)));
    }

    #[test]
    fn nothing_loaded_is_a_failure() {
        let outcome = aggregate(SummaryInputs {
            budget_items: Err(failure(SummaryInput::BudgetItems)),
            loans: Err(failure(SummaryInput::Loans)),
            emis: Err(failure(SummaryInput::Emis)),
            salary_override: Ok(None),
        });
        let SummaryOutcome::Failed { failures } = outcome else {
            panic!("expected failed outcome");
        };
        assert_eq!(failures.len(), 3);
    }
}

// src/services/classification.rs
//
// How a budget line counts towards the summary, decided from its declared
// `type` and free-text `category` alone.

use crate::models::{BudgetItem, BudgetItemType};

fn category_lower(item: &BudgetItem) -> String {
    item.category.to_lowercase()
}

/// The authoritative monthly salary line: an income item whose category is
/// "salary" in any letter case.
pub fn is_salary(item: &BudgetItem) -> bool {
    item.item_type == BudgetItemType::Income && category_lower(item) == "salary"
}

pub fn is_other_income(item: &BudgetItem) -> bool {
    item.item_type == BudgetItemType::Income && !is_salary(item)
}

pub fn is_expense(item: &BudgetItem) -> bool {
    item.item_type == BudgetItemType::Expense
}

/// Expenses that move money into investments or savings rather than spending it.
pub fn is_investment(item: &BudgetItem) -> bool {
    if !is_expense(item) {
        return false;
    }
    let category = category_lower(item);
    category.contains("investment") || category.contains("savings")
}

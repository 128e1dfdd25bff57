//! Plan vs. actual spending

use crate::entities::{BudgetItem, Category, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One budget item next to what was actually spent in its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub item_id: String,
    pub category_id: String,
    pub label: String,
    pub planned: Decimal,
    pub actual: Decimal,

    /// `planned - actual`; negative when overspent
    pub variance: Decimal,
    pub over_budget: bool,
}

/// Spending per category for one month
///
/// A category without its own budget item is counted under its parent when
/// the parent is budgeted.
pub fn actual_by_category(
    items: &[BudgetItem],
    categories: &[Category],
    transactions: &[Transaction],
    year: i32,
    month: u32,
) -> HashMap<String, Decimal> {
    let budgeted: HashSet<&str> = items.iter().map(|i| i.category_id.as_str()).collect();
    let parents: HashMap<&str, &str> = categories
        .iter()
        .filter_map(|c| c.parent_id.as_deref().map(|p| (c.id.as_str(), p)))
        .collect();

    let resolve = |category_id: &str| -> String {
        if budgeted.contains(category_id) {
            return category_id.to_string();
        }
        match parents.get(category_id) {
            Some(parent) if budgeted.contains(parent) => parent.to_string(),
            _ => category_id.to_string(),
        }
    };

    let mut actual: HashMap<String, Decimal> = HashMap::new();
    for tx in transactions {
        if !tx.is_spending() || tx.year_month() != Some((year, month)) {
            continue;
        }
        let category = resolve(tx.category_id.as_deref().unwrap_or(""));
        let spent = actual.entry(category).or_default();
        *spent = spent.saturating_add(tx.amount.abs());
    }
    actual
}

/// Compare each budget item with the month's spending, in item order
pub fn compare_plan(
    items: &[BudgetItem],
    categories: &[Category],
    transactions: &[Transaction],
    year: i32,
    month: u32,
) -> Vec<ComparisonRow> {
    let actual = actual_by_category(items, categories, transactions, year, month);

    items
        .iter()
        .map(|item| {
            let spent = actual
                .get(&item.category_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let label = item_label(item, categories);
            ComparisonRow {
                item_id: item.id.clone(),
                category_id: item.category_id.clone(),
                label,
                planned: item.planned_amount,
                actual: spent,
                variance: item.planned_amount.saturating_sub(spent),
                over_budget: spent > item.planned_amount,
            }
        })
        .collect()
}

/// Display name of an item: its notes, else its category's name, else the category id
pub fn item_label(item: &BudgetItem, categories: &[Category]) -> String {
    if !item.notes.is_empty() {
        return item.notes.clone();
    }
    categories
        .iter()
        .find(|c| c.id == item.category_id && !c.name.is_empty())
        .map(|c| c.name.clone())
        .unwrap_or_else(|| item.category_id.clone())
}

/// Months that have any spending, newest first
pub fn spending_months(transactions: &[Transaction]) -> Vec<(i32, u32)> {
    let months: BTreeSet<(i32, u32)> = transactions
        .iter()
        .filter(|tx| tx.is_spending())
        .filter_map(|tx| tx.year_month())
        .collect();
    months.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(id: &str, category: &str, amount: &str, notes: &str) -> BudgetItem {
        BudgetItem {
            id: id.to_string(),
            budget_plan_id: "bp_1".to_string(),
            category_id: category.to_string(),
            planned_amount: d(amount),
            notes: notes.to_string(),
        }
    }

    fn category(id: &str, name: &str, parent: Option<&str>) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(str::to_string),
            is_essential: false,
        }
    }

    fn tx(id: &str, amount: &str, category: &str, date: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount: d(amount),
            category_id: Some(category.to_string()),
            transaction_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        }
    }

    fn fixture() -> (Vec<BudgetItem>, Vec<Category>, Vec<Transaction>) {
        let items = vec![
            item("bi_1", "cat_food", "400", ""),
            item("bi_2", "cat_rent", "1500", "Apartment"),
        ];
        let categories = vec![
            category("cat_food", "Food", None),
            category("cat_dining", "Dining", Some("cat_food")),
            category("cat_rent", "Rent", None),
            category("cat_fun", "Fun", None),
        ];
        let transactions = vec![
            tx("t1", "-250.50", "cat_food", "2025-03-02"),
            tx("t2", "-200", "cat_dining", "2025-03-10"),
            tx("t3", "-1500", "cat_rent", "2025-03-01"),
            tx("t4", "-80", "cat_fun", "2025-03-05"),
            tx("t5", "3000", "cat_rent", "2025-03-15"),
            tx("t6", "-99", "cat_food", "2025-02-27"),
        ];
        (items, categories, transactions)
    }

    #[test]
    fn test_child_spending_rolls_up_to_budgeted_parent() {
        let (items, categories, transactions) = fixture();
        let actual = actual_by_category(&items, &categories, &transactions, 2025, 3);
        assert_eq!(actual.get("cat_food"), Some(&d("450.50")));
        assert_eq!(actual.get("cat_rent"), Some(&d("1500")));
        // unbudgeted and parentless stays under itself
        assert_eq!(actual.get("cat_fun"), Some(&d("80")));
        assert!(actual.get("cat_dining").is_none());
    }

    #[test]
    fn test_compare_plan_rows() {
        let (items, categories, transactions) = fixture();
        let rows = compare_plan(&items, &categories, &transactions, 2025, 3);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].label, "Food");
        assert_eq!(rows[0].variance, d("-50.50"));
        assert!(rows[0].over_budget);

        assert_eq!(rows[1].label, "Apartment");
        assert_eq!(rows[1].variance, Decimal::ZERO);
        assert!(!rows[1].over_budget);
    }

    #[test]
    fn test_spending_months_newest_first() {
        let (_, _, transactions) = fixture();
        assert_eq!(spending_months(&transactions), vec![(2025, 3), (2025, 2)]);
    }
}

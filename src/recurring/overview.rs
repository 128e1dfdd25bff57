//! Filtered view of recurring expenses

use crate::entities::{Category, RecurringRule};
use crate::normalize::{sum_amounts, TimeUnit};
use crate::recurring::types::{CategoryTotal, EssentialFilter, OverviewRow, RecurringFilter};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Group name for rules whose category is unknown
pub const UNCATEGORIZED: &str = "Other";

/// Expense rules matching a filter, costed per `unit`, most expensive first
#[derive(Debug, Clone)]
pub struct RecurringOverview {
    unit: TimeUnit,
    rows: Vec<OverviewRow>,
}

impl RecurringOverview {
    pub fn build(
        rules: &[RecurringRule],
        categories: &[Category],
        unit: TimeUnit,
        filter: &RecurringFilter,
    ) -> Self {
        let by_id: HashMap<&str, &Category> =
            categories.iter().map(|c| (c.id.as_str(), c)).collect();
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut rows: Vec<OverviewRow> = rules
            .iter()
            .filter(|rule| rule.is_expense())
            .filter(|rule| !filter.active_only || rule.is_active)
            .filter(|rule| match &filter.category_id {
                Some(id) => rule.category_id.as_deref() == Some(id.as_str()),
                None => true,
            })
            .filter(|rule| match filter.frequency {
                Some(freq) => rule.frequency == freq,
                None => true,
            })
            .filter_map(|rule| {
                let category = rule
                    .category_id
                    .as_deref()
                    .and_then(|id| by_id.get(id).copied());
                let is_essential = category.map_or(false, |c| c.is_essential);

                let keep = match filter.essential {
                    EssentialFilter::All => true,
                    EssentialFilter::Essential => is_essential,
                    EssentialFilter::NonEssential => !is_essential,
                };
                if !keep {
                    return None;
                }

                if let Some(q) = &needle {
                    let in_name = rule.name.to_lowercase().contains(q.as_str());
                    let in_category =
                        category.map_or(false, |c| c.name.to_lowercase().contains(q.as_str()));
                    if !in_name && !in_category {
                        return None;
                    }
                }

                Some(OverviewRow {
                    rule_id: rule.id.clone(),
                    name: rule.name.clone(),
                    category: category.map(|c| c.name.clone()).filter(|n| !n.is_empty()),
                    frequency: rule.frequency,
                    amount: rule.amount,
                    normalized: rule.normalized(unit),
                    is_essential,
                    is_active: rule.is_active,
                })
            })
            .collect();

        rows.sort_by(|a, b| b.normalized.cmp(&a.normalized));
        Self { unit, rows }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn rows(&self) -> &[OverviewRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the normalized costs shown
    pub fn total(&self) -> Decimal {
        sum_amounts(self.rows.iter().map(|row| row.normalized))
    }

    /// Totals per category name, largest first
    pub fn by_category(&self) -> Vec<CategoryTotal> {
        let mut groups: Vec<CategoryTotal> = Vec::new();
        for row in &self.rows {
            let name = row.category.as_deref().unwrap_or(UNCATEGORIZED);
            match groups.iter_mut().find(|g| g.name == name) {
                Some(group) => {
                    group.total = group.total.saturating_add(row.normalized);
                    group.count += 1;
                }
                None => groups.push(CategoryTotal {
                    name: name.to_string(),
                    total: row.normalized,
                    count: 1,
                }),
            }
        }
        groups.sort_by(|a, b| b.total.cmp(&a.total));
        groups
    }
}

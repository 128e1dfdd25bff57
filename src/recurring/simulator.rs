//! What-if savings from cancelling recurring expenses

use crate::entities::RecurringRule;
use crate::normalize::{sum_amounts, TimeUnit};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// An active expense and what it costs per month
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRule {
    pub rule_id: String,
    pub name: String,
    pub monthly: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct CancelSimulator {
    rules: Vec<SimulatedRule>,
    cancelled: HashSet<String>,
}

impl CancelSimulator {
    /// Active expense rules, most expensive first
    pub fn new(rules: &[RecurringRule]) -> Self {
        let mut rules: Vec<SimulatedRule> = rules
            .iter()
            .filter(|r| r.is_expense() && r.is_active)
            .map(|r| SimulatedRule {
                rule_id: r.id.clone(),
                name: r.name.clone(),
                monthly: r.normalized(TimeUnit::Month),
            })
            .collect();
        rules.sort_by(|a, b| b.monthly.cmp(&a.monthly));
        Self {
            rules,
            cancelled: HashSet::new(),
        }
    }

    pub fn rules(&self) -> &[SimulatedRule] {
        &self.rules
    }

    /// Flip one rule in or out of the cancelled set
    ///
    /// Returns whether the rule is now cancelled; `false` for unknown ids.
    pub fn toggle(&mut self, rule_id: &str) -> bool {
        if !self.rules.iter().any(|r| r.rule_id == rule_id) {
            return false;
        }
        if self.cancelled.remove(rule_id) {
            false
        } else {
            self.cancelled.insert(rule_id.to_string());
            true
        }
    }

    pub fn is_cancelled(&self, rule_id: &str) -> bool {
        self.cancelled.contains(rule_id)
    }

    pub fn reset(&mut self) {
        self.cancelled.clear();
    }

    /// Monthly cost of everything marked cancelled
    pub fn savings(&self) -> Decimal {
        sum_amounts(
            self.rules
                .iter()
                .filter(|r| self.cancelled.contains(&r.rule_id))
                .map(|r| r.monthly),
        )
    }
}

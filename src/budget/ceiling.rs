//! Income ceiling for budget plans
//!
//! A plan may allocate at most the fixed income that recurs every month.

use crate::entities::{Direction, RecurringRule};
use crate::normalize::{sum_amounts, TimeUnit};
use rust_decimal::Decimal;

/// Sum of active rules flowing in `direction`, expressed per `unit`
pub fn recurring_total(rules: &[RecurringRule], direction: Direction, unit: TimeUnit) -> Decimal {
    sum_amounts(
        rules
            .iter()
            .filter(|r| r.is_active && r.direction == Some(direction))
            .map(|r| r.normalized(unit)),
    )
}

/// Fixed monthly income: active income rules normalized to one month
pub fn fixed_monthly_income(rules: &[RecurringRule]) -> Decimal {
    recurring_total(rules, Direction::Income, TimeUnit::Month)
}

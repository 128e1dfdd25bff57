//! Capped budget allocator
//!
//! Holds the proposed value of every item in a plan during an edit and keeps
//! their sum within a fixed ceiling. Raising one item past the ceiling takes
//! the overflow evenly from every other funded item ("water-filling"); what
//! the other items cannot give up is taken back from the raised item itself.
//!
//! Guarantees, for a working set that starts within the ceiling:
//! - Ceiling: `total() <= ceiling()` after every `set_item`
//! - Non-negativity: no value ever drops below zero
//! - Cent precision: every stored value has at most two decimal places
//!
//! Lowering an item never touches the others.

use crate::normalize::sum_amounts;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// Working set of proposed item values under an income ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAllocator {
    /// Upper bound for the sum of all values (never negative)
    ceiling: Decimal,

    /// (item id, proposed value) in plan order
    entries: Vec<(String, Decimal)>,
}

/// Round to cents, halves away from zero
fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate to cents, so a non-negative result never rounds up
fn floor_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

impl BudgetAllocator {
    /// Start a working set from persisted values
    ///
    /// Negative inputs (ceiling or values) are clamped to zero. A repeated id
    /// keeps its first position and its last value.
    pub fn new<I, S>(ceiling: Decimal, items: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        let mut allocator = Self {
            ceiling: ceiling.max(Decimal::ZERO),
            entries: Vec::new(),
        };
        for (id, value) in items {
            let id = id.into();
            let value = value.max(Decimal::ZERO);
            match allocator.position(&id) {
                Some(idx) => allocator.entries[idx].1 = value,
                None => allocator.entries.push((id, value)),
            }
        }
        allocator
    }

    pub fn ceiling(&self) -> Decimal {
        self.ceiling
    }

    /// Proposed value of one item
    pub fn value(&self, id: &str) -> Option<Decimal> {
        self.position(id).map(|idx| self.entries[idx].1)
    }

    /// All (id, value) pairs in plan order
    pub fn values(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.entries.iter().map(|(id, v)| (id.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all proposed values
    pub fn total(&self) -> Decimal {
        sum_amounts(self.entries.iter().map(|(_, v)| *v))
    }

    /// Unallocated part of the ceiling (negative if over)
    pub fn remaining(&self) -> Decimal {
        self.ceiling.saturating_sub(self.total())
    }

    /// Share of the ceiling allocated, in percent (0 when the ceiling is 0)
    pub fn utilization(&self) -> Decimal {
        if self.ceiling.is_zero() {
            return Decimal::ZERO;
        }
        self.total()
            .checked_div(self.ceiling)
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether the working set respects the ceiling
    pub fn is_within_ceiling(&self) -> bool {
        self.total() <= self.ceiling
    }

    /// A requested value as the allocator would store it with room to spare:
    /// clamped to zero and rounded to cents
    pub fn clamp_request(requested: Decimal) -> Decimal {
        round_cents(requested.max(Decimal::ZERO))
    }

    /// Request a new value for one item
    ///
    /// The request is clamped to zero and rounded to cents, never rejected.
    /// Returns the value actually stored, which can be lower than requested
    /// when the ceiling forces a clawback, or `None` for an unknown id.
    pub fn set_item(&mut self, id: &str, requested: Decimal) -> Option<Decimal> {
        let idx = self.position(id)?;
        let requested = Self::clamp_request(requested);
        let current = self.entries[idx].1;
        let delta = requested - current;

        // Decreases and no-ops apply directly
        if delta <= Decimal::ZERO {
            self.entries[idx].1 = requested;
            return Some(requested);
        }

        let new_total = self.total().saturating_add(delta);
        if new_total <= self.ceiling {
            self.entries[idx].1 = requested;
            return Some(requested);
        }

        let overflow = new_total - self.ceiling;
        let pool: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, (_, v))| *i != idx && *v > Decimal::ZERO)
            .map(|(i, _)| i)
            .collect();

        let target = if pool.is_empty() {
            // Alone, the item still cannot exceed the ceiling
            requested.min(self.ceiling)
        } else {
            let share = overflow / Decimal::from(pool.len());
            let mut distributed = Decimal::ZERO;
            for &i in &pool {
                let before = self.entries[i].1;
                let after = round_cents(before - before.min(share)).min(before);
                self.entries[i].1 = after;
                distributed += before - after;
            }

            // Whatever the pool could not absorb comes back out of the target
            let shortfall = overflow - distributed;
            requested.min(current + delta - shortfall)
        };

        self.entries[idx].1 = round_cents(target).max(Decimal::ZERO);
        self.enforce_ceiling(idx);

        debug!(
            item = id,
            requested = %requested,
            stored = %self.entries[idx].1,
            overflow = %overflow,
            pool = pool.len(),
            "budget increase redistributed"
        );

        Some(self.entries[idx].1)
    }

    /// Set every proposed value to zero
    pub fn reset_all(&mut self) {
        for (_, value) in &mut self.entries {
            *value = Decimal::ZERO;
        }
    }

    /// Ids whose proposed value differs numerically from `persisted`, in plan order
    ///
    /// Ids missing from `persisted` count as changed.
    pub fn changes<'a, I>(&self, persisted: I) -> Vec<(String, Decimal)>
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        let persisted: Vec<(&str, Decimal)> = persisted.into_iter().collect();
        self.entries
            .iter()
            .filter(|(id, value)| {
                persisted
                    .iter()
                    .find(|(pid, _)| *pid == id.as_str())
                    .map_or(true, |(_, old)| old != value)
            })
            .map(|(id, value)| (id.clone(), *value))
            .collect()
    }

    /// Take any excess over the ceiling out of one item
    fn enforce_ceiling(&mut self, idx: usize) {
        let total = self.total();
        if total > self.ceiling {
            let excess = total - self.ceiling;
            let value = self.entries[idx].1;
            self.entries[idx].1 = floor_cents(value - excess).max(Decimal::ZERO);
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| entry_id == id)
    }
}

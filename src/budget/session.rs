//! Budget edit session
//!
//! Wraps a plan's persisted items, the allocator working set and the session
//! state machine. Only `commit` reaches the record store, and it does so one
//! item at a time in plan order so a failure leaves a predictable prefix
//! written.

use crate::budget::allocator::BudgetAllocator;
use crate::budget::ceiling::fixed_monthly_income;
use crate::budget::types::{CommitReport, SessionEvent, SessionState};
use crate::entities::{load_all, BudgetItem, BudgetPlan, RecurringRule, StoreEntity};
use crate::errors::{FinanceError, Result};
use crate::normalize::sum_amounts;
use crate::store::{Entity, RecordStore};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Edit session over one budget plan
#[derive(Debug, Clone)]
pub struct BudgetSession {
    plan: BudgetPlan,

    /// Items as last known to be persisted, in store order
    items: Vec<BudgetItem>,

    /// Fixed monthly income bounding the plan
    ceiling: Decimal,

    state: SessionState,

    /// Present only while editing or committing
    working: Option<BudgetAllocator>,
}

impl BudgetSession {
    /// Create an idle session from already-loaded data
    pub fn new(plan: BudgetPlan, items: Vec<BudgetItem>, ceiling: Decimal) -> Self {
        Self {
            plan,
            items,
            ceiling,
            state: SessionState::Idle,
            working: None,
        }
    }

    /// Load a plan, its items and the income ceiling from the store
    ///
    /// Without `plan_id` the first plan in the store is used.
    pub async fn load(store: &dyn RecordStore, plan_id: Option<&str>) -> Result<Self> {
        let plans: Vec<BudgetPlan> = load_all(store).await?;
        let plan = match plan_id {
            Some(id) => plans.into_iter().find(|p| p.id == id),
            None => plans.into_iter().next(),
        }
        .ok_or_else(|| FinanceError::PlanNotFound(plan_id.unwrap_or("(no plans)").to_string()))?;

        let items: Vec<BudgetItem> = load_all::<BudgetItem>(store)
            .await?
            .into_iter()
            .filter(|item| item.budget_plan_id == plan.id)
            .collect();

        let rules: Vec<RecurringRule> = load_all(store).await?;
        let ceiling = fixed_monthly_income(&rules);

        info!(
            plan = %plan.id,
            items = items.len(),
            ceiling = %ceiling,
            "budget plan loaded"
        );

        Ok(Self::new(plan, items, ceiling))
    }

    pub fn plan(&self) -> &BudgetPlan {
        &self.plan
    }

    /// Persisted items, in store order
    pub fn items(&self) -> &[BudgetItem] {
        &self.items
    }

    pub fn ceiling(&self) -> Decimal {
        self.ceiling
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Working set, while one exists
    pub fn allocator(&self) -> Option<&BudgetAllocator> {
        self.working.as_ref()
    }

    /// Start editing from persisted values
    pub fn begin(&mut self) -> Result<()> {
        self.advance(SessionEvent::Begin)?;
        self.working = Some(BudgetAllocator::new(
            self.ceiling,
            self.items
                .iter()
                .map(|item| (item.id.clone(), item.planned_amount)),
        ));
        Ok(())
    }

    /// Propose a new value for one item; returns the value actually stored
    pub fn set_item(&mut self, id: &str, value: Decimal) -> Result<Decimal> {
        let plan_id = self.plan.id.clone();
        let working = self.working_mut()?;
        working
            .set_item(id, value)
            .ok_or_else(|| FinanceError::UnknownItem(format!("{} (plan {})", id, plan_id)))
    }

    /// Zero every proposed value
    pub fn reset_all(&mut self) -> Result<()> {
        self.working_mut()?.reset_all();
        Ok(())
    }

    /// Discard the working set; persisted values are untouched
    pub fn cancel(&mut self) -> Result<()> {
        self.advance(SessionEvent::Cancel)?;
        self.working = None;
        self.advance(SessionEvent::Settle)
    }

    /// Items whose proposed value differs from the persisted one, with that value
    pub fn pending_changes(&self) -> Vec<(String, Decimal)> {
        match self.working.as_ref() {
            Some(working) => working.changes(
                self.items
                    .iter()
                    .map(|item| (item.id.as_str(), item.planned_amount)),
            ),
            None => Vec::new(),
        }
    }

    /// Write every changed item back, sequentially and fail-fast
    ///
    /// On the first failed write the session returns to `Idle` and the error
    /// lists what was already written. Earlier writes are not rolled back;
    /// reload from the store to reconcile.
    pub async fn commit(&mut self, store: &dyn RecordStore) -> Result<CommitReport> {
        self.advance(SessionEvent::Save)?;
        let working = match self.working.take() {
            Some(working) => working,
            None => {
                self.advance(SessionEvent::Finish)?;
                return Err(FinanceError::NotEditing(self.plan.id.clone()));
            }
        };

        let mut report = CommitReport::default();
        for idx in 0..self.items.len() {
            let item = &self.items[idx];
            let proposed = match working.value(&item.id) {
                Some(v) => v,
                None => continue,
            };
            // Numeric comparison: 150 and 150.00 are the same amount
            if proposed == item.planned_amount {
                report.unchanged += 1;
                continue;
            }

            let updated = item.with_planned_amount(proposed);
            match store
                .write_record(Entity::BudgetItem, &updated.id, updated.to_record())
                .await
            {
                Ok(()) => {
                    debug!(item = %updated.id, amount = %proposed, "budget item written");
                    report.written.push(updated.id.clone());
                    self.items[idx] = updated;
                }
                Err(e) => {
                    warn!(
                        item = %updated.id,
                        written = report.written.len(),
                        error = %e,
                        "budget commit aborted"
                    );
                    self.advance(SessionEvent::Finish)?;
                    return Err(FinanceError::CommitFailed {
                        failed_id: updated.id,
                        written: report.written,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.advance(SessionEvent::Finish)?;
        info!(
            plan = %self.plan.id,
            written = report.written.len(),
            unchanged = report.unchanged,
            "budget committed"
        );
        Ok(report)
    }

    /// Amount shown for an item: proposed while editing, persisted otherwise
    pub fn amount(&self, id: &str) -> Option<Decimal> {
        match self.working.as_ref() {
            Some(working) => working.value(id),
            None => self
                .items
                .iter()
                .find(|item| item.id == id)
                .map(|item| item.planned_amount),
        }
    }

    pub fn total_allocated(&self) -> Decimal {
        match self.working.as_ref() {
            Some(working) => working.total(),
            None => sum_amounts(self.items.iter().map(|item| item.planned_amount)),
        }
    }

    /// Unallocated income (negative when persisted values exceed the ceiling)
    pub fn remaining(&self) -> Decimal {
        self.ceiling.saturating_sub(self.total_allocated())
    }

    fn working_mut(&mut self) -> Result<&mut BudgetAllocator> {
        if !self.state.is_editing() {
            return Err(FinanceError::NotEditing(self.plan.id.clone()));
        }
        self.working
            .as_mut()
            .ok_or_else(|| FinanceError::NotEditing(self.plan.id.clone()))
    }

    fn advance(&mut self, event: SessionEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        debug!(from = ?self.state, to = ?next, "budget session transition");
        self.state = next;
        Ok(())
    }
}

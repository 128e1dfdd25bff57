//! Budget plans and their items

use crate::entities::{field, optional_field, record_of, required_id, StoreEntity};
use crate::errors::Result;
use crate::normalize::coerce_amount;
use crate::store::{Entity, Record};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monthly budget plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPlan {
    pub id: String,
    pub year: i32,
    /// 1..=12; 0 when the store holds nothing usable
    pub month: u32,
    pub currency: String,
}

impl StoreEntity for BudgetPlan {
    const ENTITY: Entity = Entity::BudgetPlan;

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: required_id(record, Self::ENTITY)?,
            year: field(record, "year").parse().unwrap_or(0),
            month: field(record, "month")
                .parse()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .unwrap_or(0),
            currency: field(record, "currency").to_string(),
        })
    }

    fn to_record(&self) -> Record {
        record_of([
            ("id", self.id.clone()),
            ("year", self.year.to_string()),
            ("month", self.month.to_string()),
            ("currency", self.currency.clone()),
        ])
    }
}

/// One allocation line of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: String,
    pub budget_plan_id: String,
    pub category_id: String,
    pub planned_amount: Decimal,
    pub notes: String,
}

impl BudgetItem {
    /// Copy of this item carrying a different planned amount
    pub fn with_planned_amount(&self, planned_amount: Decimal) -> Self {
        Self {
            planned_amount,
            ..self.clone()
        }
    }
}

impl StoreEntity for BudgetItem {
    const ENTITY: Entity = Entity::BudgetItem;

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: required_id(record, Self::ENTITY)?,
            budget_plan_id: field(record, "budget_plan_id").to_string(),
            category_id: field(record, "category_id").to_string(),
            planned_amount: coerce_amount(field(record, "planned_amount")).max(Decimal::ZERO),
            notes: optional_field(record, "notes").unwrap_or_default(),
        })
    }

    fn to_record(&self) -> Record {
        record_of([
            ("id", self.id.clone()),
            ("budget_plan_id", self.budget_plan_id.clone()),
            ("category_id", self.category_id.clone()),
            ("planned_amount", self.planned_amount.normalize().to_string()),
            ("notes", self.notes.clone()),
        ])
    }
}

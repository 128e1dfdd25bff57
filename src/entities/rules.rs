//! Recurring rules

use crate::entities::{field, optional_field, record_of, required_id, StoreEntity};
use crate::errors::Result;
use crate::normalize::{coerce_amount, normalize, Frequency, TimeUnit};
use crate::store::{Entity, Record};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money flow direction of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Expense,
    Income,
}

impl Direction {
    /// `None` for anything other than `expense` or `income`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Some(Direction::Expense),
            "income" => Some(Direction::Income),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Expense => "expense",
            Direction::Income => "income",
        }
    }
}

/// A recurring charge or income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: String,
    pub direction: Option<Direction>,
    pub frequency: Frequency,
    pub category_id: Option<String>,
    pub is_active: bool,
}

impl RecurringRule {
    /// Amount expressed per `unit`
    pub fn normalized(&self, unit: TimeUnit) -> Decimal {
        normalize(self.amount, self.frequency, unit)
    }

    pub fn is_expense(&self) -> bool {
        self.direction == Some(Direction::Expense)
    }

    pub fn is_income(&self) -> bool {
        self.direction == Some(Direction::Income)
    }
}

impl StoreEntity for RecurringRule {
    const ENTITY: Entity = Entity::RecurringRule;

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: required_id(record, Self::ENTITY)?,
            name: field(record, "name").to_string(),
            amount: coerce_amount(field(record, "amount")),
            currency: field(record, "currency").to_string(),
            direction: Direction::parse(field(record, "direction")),
            frequency: Frequency::parse_lenient(field(record, "frequency")),
            category_id: optional_field(record, "category_id"),
            // Only an explicit "false" deactivates a rule
            is_active: field(record, "is_active") != "false",
        })
    }

    fn to_record(&self) -> Record {
        record_of([
            ("id", self.id.clone()),
            ("name", self.name.clone()),
            ("amount", self.amount.to_string()),
            ("currency", self.currency.clone()),
            (
                "direction",
                self.direction.map(|d| d.as_str()).unwrap_or("").to_string(),
            ),
            ("frequency", self.frequency.as_str().to_string()),
            ("category_id", self.category_id.clone().unwrap_or_default()),
            ("is_active", self.is_active.to_string()),
        ])
    }
}

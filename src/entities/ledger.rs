//! Categories and transactions

use crate::entities::{field, optional_field, record_of, required_id, StoreEntity};
use crate::errors::Result;
use crate::normalize::coerce_amount;
use crate::store::{Entity, Record};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub is_essential: bool,
}

impl StoreEntity for Category {
    const ENTITY: Entity = Entity::Category;

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: required_id(record, Self::ENTITY)?,
            name: field(record, "name").to_string(),
            parent_id: optional_field(record, "parent_id"),
            is_essential: field(record, "is_essential") == "true",
        })
    }

    fn to_record(&self) -> Record {
        record_of([
            ("id", self.id.clone()),
            ("name", self.name.clone()),
            ("parent_id", self.parent_id.clone().unwrap_or_default()),
            ("is_essential", self.is_essential.to_string()),
        ])
    }
}

/// A posted transaction; negative amounts are spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub category_id: Option<String>,
    pub transaction_date: Option<NaiveDate>,
}

impl Transaction {
    pub fn is_spending(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// (year, month) the transaction was posted in
    pub fn year_month(&self) -> Option<(i32, u32)> {
        self.transaction_date.map(|d| (d.year(), d.month()))
    }
}

/// Accepts `YYYY-MM-DD` with or without a trailing time part
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl StoreEntity for Transaction {
    const ENTITY: Entity = Entity::Transaction;

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: required_id(record, Self::ENTITY)?,
            amount: coerce_amount(field(record, "amount")),
            category_id: optional_field(record, "category_id"),
            transaction_date: parse_date(field(record, "transaction_date")),
        })
    }

    fn to_record(&self) -> Record {
        record_of([
            ("id", self.id.clone()),
            ("amount", self.amount.to_string()),
            ("category_id", self.category_id.clone().unwrap_or_default()),
            (
                "transaction_date",
                self.transaction_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ])
    }
}

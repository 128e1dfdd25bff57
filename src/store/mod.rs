//! Record store seam
//!
//! All durable state lives in an external tabular store, usually a
//! spreadsheet. The contract is thin:
//!
//! - `read_all` returns the rows of one table in store order
//! - `write_record` upserts one row by id; last write wins
//!
//! There is no locking and no transaction spanning several writes. A caller
//! issuing writes A then B may observe A persisted and B failed, and must
//! reconcile by reading again. Adapters may also be eventually consistent:
//! a read issued right after a write is not guaranteed to see it.

pub mod json_dir;
pub mod memory;
pub mod sheets;

pub use json_dir::JsonDirStore;
pub use memory::MemoryStore;
pub use sheets::SheetsStore;

use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One flat row: column name to string value
pub type Record = BTreeMap<String, String>;

/// Tables the library reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entity {
    RecurringRule,
    BudgetPlan,
    BudgetItem,
    Category,
    Transaction,
}

impl Entity {
    /// Table (sheet) name in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::RecurringRule => "RecurringRule",
            Entity::BudgetPlan => "BudgetPlan",
            Entity::BudgetItem => "BudgetItem",
            Entity::Category => "Category",
            Entity::Transaction => "Transaction",
        }
    }

    /// Column order used when a row has to be sent positionally
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Entity::RecurringRule => &[
                "id",
                "name",
                "amount",
                "currency",
                "direction",
                "frequency",
                "category_id",
                "is_active",
            ],
            Entity::BudgetPlan => &["id", "year", "month", "currency"],
            Entity::BudgetItem => &["id", "budget_plan_id", "category_id", "planned_amount", "notes"],
            Entity::Category => &["id", "name", "parent_id", "is_essential"],
            Entity::Transaction => &["id", "amount", "category_id", "transaction_date"],
        }
    }

    /// Lay a record out in column order, missing columns as empty strings
    pub fn to_row(&self, record: &Record) -> Vec<String> {
        self.columns()
            .iter()
            .map(|c| record.get(*c).cloned().unwrap_or_default())
            .collect()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External tabular record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every row of `entity`, in store order
    async fn read_all(&self, entity: Entity) -> Result<Vec<Record>>;

    /// Insert or replace the row whose `id` column equals `id`
    async fn write_record(&self, entity: Entity, id: &str, fields: Record) -> Result<()>;
}

/// Insert or replace `fields` in `rows`, keyed by `id`
///
/// Shared by the adapters that keep whole tables locally.
/// Flatten a JSON object into a record: strings as-is, null as empty,
/// other scalars by their JSON text; keys are trimmed
pub(crate) fn flatten_row(row: Map<String, Value>) -> Record {
    row.into_iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.trim().to_string(), text)
        })
        .collect()
}

pub(crate) fn upsert(rows: &mut Vec<Record>, id: &str, mut fields: Record) {
    fields.insert("id".to_string(), id.to_string());
    match rows
        .iter_mut()
        .find(|r| r.get("id").map(String::as_str) == Some(id))
    {
        Some(existing) => *existing = fields,
        None => rows.push(fields),
    }
}

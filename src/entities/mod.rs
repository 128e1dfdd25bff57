//! Typed views over flat store records
//!
//! Decoding is lenient the way the dashboard always was: amounts go through
//! `coerce_amount`, unknown enum values fall back, and only a missing `id`
//! makes a record unusable.

pub mod budget;
pub mod ledger;
pub mod rules;

pub use budget::{BudgetItem, BudgetPlan};
pub use ledger::{Category, Transaction};
pub use rules::{Direction, RecurringRule};

use crate::errors::{FinanceError, Result};
use crate::store::{Entity, Record, RecordStore};

/// An entity that can be decoded from, and encoded to, a flat record
pub trait StoreEntity: Sized {
    /// Table this entity lives in
    const ENTITY: Entity;

    /// Decode one record
    fn from_record(record: &Record) -> Result<Self>;

    /// Encode into a record using the table's column names
    fn to_record(&self) -> Record;
}

/// Read and decode a whole table
pub async fn load_all<T: StoreEntity>(store: &dyn RecordStore) -> Result<Vec<T>> {
    store
        .read_all(T::ENTITY)
        .await?
        .iter()
        .map(T::from_record)
        .collect()
}

/// Value of a column, empty when absent
pub(crate) fn field<'r>(record: &'r Record, key: &str) -> &'r str {
    record.get(key).map(|s| s.trim()).unwrap_or("")
}

/// Optional column: absent or blank reads as `None`
pub(crate) fn optional_field(record: &Record, key: &str) -> Option<String> {
    let value = field(record, key);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// The `id` column, which every entity requires
pub(crate) fn required_id(record: &Record, entity: Entity) -> Result<String> {
    optional_field(record, "id").ok_or_else(|| FinanceError::MalformedRecord {
        entity: entity.to_string(),
        reason: "missing id".to_string(),
    })
}

/// Build a record from column/value pairs
pub(crate) fn record_of<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

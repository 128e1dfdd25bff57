//! Recurring overview type definitions

use crate::normalize::Frequency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Essential-category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EssentialFilter {
    #[default]
    All,
    Essential,
    NonEssential,
}

impl FromStr for EssentialFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(EssentialFilter::All),
            "essential" => Ok(EssentialFilter::Essential),
            "non-essential" | "nonessential" => Ok(EssentialFilter::NonEssential),
            other => Err(format!(
                "unknown essential filter '{}' (expected all, essential or non-essential)",
                other
            )),
        }
    }
}

/// Filters applied to expense rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringFilter {
    /// Hide rules marked inactive
    pub active_only: bool,

    pub category_id: Option<String>,

    pub frequency: Option<Frequency>,

    pub essential: EssentialFilter,

    /// Case-insensitive match on rule or category name
    pub search: Option<String>,
}

impl Default for RecurringFilter {
    fn default() -> Self {
        Self {
            active_only: true,
            category_id: None,
            frequency: None,
            essential: EssentialFilter::All,
            search: None,
        }
    }
}

/// An expense rule with its cost in the overview's unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
    pub rule_id: String,
    pub name: String,
    pub category: Option<String>,
    pub frequency: Frequency,
    pub amount: Decimal,
    pub normalized: Decimal,
    pub is_essential: bool,
    pub is_active: bool,
}

/// Normalized cost grouped under one category name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

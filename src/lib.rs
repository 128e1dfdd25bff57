//! allotment - Recurring cost normalization and capped budget allocation
//!
//! # Architecture
//!
//! - **normalize**: convert (amount, frequency) pairs to any time unit
//! - **budget**: allocator that keeps a plan within fixed monthly income,
//!   edit sessions, plan vs. actual
//! - **recurring**: filtered expense overview and cancel simulator
//! - **store**: flat record store trait with memory, JSON and spreadsheet backends
//! - **entities**: typed records decoded from the store

pub mod errors;
pub mod normalize;
pub mod entities;
pub mod store;
pub mod budget;
pub mod recurring;

// Re-export commonly used types
pub use errors::{FinanceError, Result};

// Application layer
pub mod cli;
pub mod config;

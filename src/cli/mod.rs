//! CLI module for allotment
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::{Args, BudgetCommand, Commands, Verbosity};

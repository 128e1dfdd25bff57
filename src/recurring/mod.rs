//! Recurring expense views
//!
//! Read-only analysis over recurring rules: a filtered overview normalized to
//! any time unit, and a simulator for the savings of cancelling subscriptions.

pub mod overview;
pub mod simulator;
pub mod types;

pub use overview::{RecurringOverview, UNCATEGORIZED};
pub use simulator::{CancelSimulator, SimulatedRule};
pub use types::{CategoryTotal, EssentialFilter, OverviewRow, RecurringFilter};

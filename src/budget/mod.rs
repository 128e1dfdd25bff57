//! Budget plans under an income ceiling
//!
//! The allocator keeps a plan's proposed values within the fixed monthly
//! income; the session wraps it with load, cancel and commit against a
//! record store.

pub mod allocator;
pub mod ceiling;
pub mod comparison;
pub mod session;
pub mod types;

pub use allocator::BudgetAllocator;
pub use ceiling::{fixed_monthly_income, recurring_total};
pub use comparison::{
    actual_by_category, compare_plan, item_label, spending_months, ComparisonRow,
};
pub use session::BudgetSession;
pub use types::{CommitReport, SessionEvent, SessionState};

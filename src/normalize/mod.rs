//! Recurring-amount normalization
//! Converts amounts between billing frequencies and time units via the annualized amount

pub mod convert;
pub mod types;

pub use convert::{amount_from_f64, coerce_amount, normalize, sum_amounts, to_annual};
pub use types::{Frequency, TimeUnit};

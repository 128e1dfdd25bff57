//! Command-line argument parsing for allotment
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use crate::normalize::TimeUnit;
use crate::recurring::EssentialFilter;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

/// allotment - Recurring costs and capped monthly budgets
#[derive(Parser, Debug)]
#[command(name = "allotment")]
#[command(version)]
#[command(about = "Normalize recurring costs and keep monthly budgets under your income", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert an amount billed at one frequency into other time units
    Normalize {
        /// Amount; `$` and `,` are ignored
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Billing frequency (weekly, biweekly, semimonthly, monthly, annual, daily)
        #[arg(short, long, default_value = "monthly")]
        frequency: String,

        /// Target unit; every unit is shown when omitted
        #[arg(short, long)]
        unit: Option<TimeUnit>,
    },

    /// List recurring expenses normalized to one time unit
    Recurring {
        /// Time unit (defaults to the configured one)
        #[arg(short, long)]
        unit: Option<TimeUnit>,

        /// Include inactive rules
        #[arg(long)]
        all: bool,

        /// Only this category id
        #[arg(long)]
        category: Option<String>,

        /// Only this billing frequency
        #[arg(long)]
        frequency: Option<String>,

        /// all, essential or non-essential
        #[arg(long, default_value = "all")]
        essential: EssentialFilter,

        /// Case-insensitive match on rule or category name
        #[arg(short, long)]
        search: Option<String>,

        /// Group totals by category instead of listing rules
        #[arg(long)]
        by_category: bool,
    },

    /// Show fixed monthly income, the budget ceiling
    Ceiling,

    /// Inspect or edit a budget plan
    Budget {
        #[command(subcommand)]
        action: BudgetCommand,
    },

    /// Monthly savings from cancelling recurring expenses
    Simulate {
        /// Rule ids to cancel
        #[arg(long = "cancel", num_args = 1..)]
        cancel: Vec<String>,
    },

    /// Show or update configuration
    Config {
        /// Store records as JSON files in this directory
        #[arg(long, conflicts_with = "sheets_url")]
        json_dir: Option<PathBuf>,

        /// Store records in the spreadsheet web app at this URL
        #[arg(long)]
        sheets_url: Option<String>,

        /// Default time unit for recurring views
        #[arg(long)]
        time_unit: Option<TimeUnit>,

        /// Display currency
        #[arg(long)]
        currency: Option<String>,
    },
}

/// Budget subcommands
#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Show a plan's items against the income ceiling
    Show {
        /// Plan id (first plan when omitted)
        #[arg(short, long)]
        plan: Option<String>,

        /// Compare with actual spending for a month (YYYY-MM)
        #[arg(long, value_parser = parse_year_month)]
        compare: Option<(i32, u32)>,
    },

    /// Change item amounts; other items shrink to stay under the ceiling
    Edit {
        /// Plan id (first plan when omitted)
        #[arg(short, long)]
        plan: Option<String>,

        /// ITEM_ID=AMOUNT, applied in order
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, Decimal)>,

        /// Zero every item before applying --set
        #[arg(long)]
        reset: bool,

        /// Print the result without saving
        #[arg(long)]
        dry_run: bool,
    },
}

/// Parse `ITEM_ID=AMOUNT`
pub fn parse_assignment(raw: &str) -> Result<(String, Decimal), String> {
    let (id, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM_ID=AMOUNT, got '{}'", raw))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing item id in '{}'", raw));
    }
    let amount = Decimal::from_str(amount.trim().trim_start_matches('$'))
        .map_err(|e| format!("invalid amount in '{}': {}", raw, e))?;
    Ok((id.to_string(), amount))
}

/// Parse `YYYY-MM`
pub fn parse_year_month(raw: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("expected YYYY-MM, got '{}'", raw);
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default log filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "allotment=info",
            Verbosity::VeryVerbose => "allotment=debug",
        }
    }
}

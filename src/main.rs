//! allotment - Main CLI Entry Point

use allotment::budget::{
    compare_plan, fixed_monthly_income, item_label, recurring_total, spending_months,
    BudgetAllocator, BudgetSession,
};
use allotment::config::{Config, StoreConfig};
use allotment::entities::{load_all, Category, Direction, RecurringRule, Transaction};
use allotment::normalize::{coerce_amount, normalize, Frequency, TimeUnit};
use allotment::recurring::{CancelSimulator, RecurringFilter, RecurringOverview};
use allotment::store::{JsonDirStore, RecordStore, SheetsStore};
use allotment::{
    cli::{Args, BudgetCommand, Commands, Verbosity},
    FinanceError,
};
use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rust_decimal::Decimal;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbosity());

    // Pure conversion needs no configuration on disk
    if let Commands::Normalize {
        amount,
        frequency,
        unit,
    } = &args.command
    {
        show_normalized(amount, frequency, *unit);
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    match &args.command {
        Commands::Normalize { .. } => {}
        Commands::Config {
            json_dir,
            sheets_url,
            time_unit,
            currency,
        } => {
            let mut changed = false;
            if let Some(dir) = json_dir {
                config.use_json_store(dir.clone());
                changed = true;
            }
            if let Some(url) = sheets_url {
                config.use_sheets_store(url.clone());
                changed = true;
            }
            if let Some(unit) = time_unit {
                config.display.time_unit = *unit;
                changed = true;
            }
            if let Some(currency) = currency {
                config.display.currency = currency.clone();
                changed = true;
            }
            if changed {
                config.save_to(&config_path)?;
                println!("{}", "✓ Configuration saved".green());
            }
            show_config(&config, &config_path, args.verbosity());
        }
        Commands::Recurring {
            unit,
            all,
            category,
            frequency,
            essential,
            search,
            by_category,
        } => {
            let store = open_store(&config).await?;
            let filter = RecurringFilter {
                active_only: !*all,
                category_id: category.clone(),
                frequency: frequency.as_deref().map(Frequency::parse_lenient),
                essential: *essential,
                search: search.clone(),
            };
            let unit = unit.unwrap_or(config.display.time_unit);
            show_recurring(store.as_ref(), &config, unit, &filter, *by_category).await?;
        }
        Commands::Ceiling => {
            let store = open_store(&config).await?;
            show_ceiling(store.as_ref(), &config).await?;
        }
        Commands::Budget { action } => {
            let store = open_store(&config).await?;
            match action {
                BudgetCommand::Show { plan, compare } => {
                    show_budget(store.as_ref(), &config, plan.as_deref(), *compare).await?;
                }
                BudgetCommand::Edit {
                    plan,
                    set,
                    reset,
                    dry_run,
                } => {
                    edit_budget(store.as_ref(), &config, plan.as_deref(), set, *reset, *dry_run)
                        .await?;
                }
            }
        }
        Commands::Simulate { cancel } => {
            let store = open_store(&config).await?;
            simulate_cancellations(store.as_ref(), &config, cancel).await?;
        }
    }

    Ok(())
}

/// Log to stderr; RUST_LOG overrides the verbosity flags
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open_store(config: &Config) -> Result<Box<dyn RecordStore>> {
    match &config.store {
        StoreConfig::Json { dir } => {
            let store = JsonDirStore::open(dir)
                .await
                .with_context(|| format!("Failed to open record directory {}", dir.display()))?;
            Ok(Box::new(store))
        }
        StoreConfig::Sheets { url } => {
            let store = SheetsStore::new(url).context("Failed to create spreadsheet client")?;
            Ok(Box::new(store))
        }
    }
}

fn money(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}

/// Small units need more than cents to be readable
fn unit_amount(amount: Decimal, unit: TimeUnit) -> String {
    match unit {
        TimeUnit::Year | TimeUnit::Month | TimeUnit::Day => format!("{:.2}", amount),
        TimeUnit::Hour => format!("{:.4}", amount),
        TimeUnit::Minute | TimeUnit::Second => format!("{:.6}", amount),
    }
}

fn show_normalized(raw: &str, frequency: &str, unit: Option<TimeUnit>) {
    let amount = coerce_amount(raw);
    let frequency = Frequency::parse_lenient(frequency);

    println!(
        "\n{} {}{}\n",
        "Amount:".bold(),
        amount,
        frequency.label().dimmed()
    );

    let units: Vec<TimeUnit> = match unit {
        Some(unit) => vec![unit],
        None => TimeUnit::ALL.to_vec(),
    };
    for unit in units {
        println!(
            "  {:>16}{}",
            unit_amount(normalize(amount, frequency, unit), unit),
            unit.label()
        );
    }
    println!();
}

async fn show_recurring(
    store: &dyn RecordStore,
    config: &Config,
    unit: TimeUnit,
    filter: &RecurringFilter,
    by_category: bool,
) -> Result<()> {
    let rules: Vec<RecurringRule> = load_all(store).await?;
    let categories: Vec<Category> = load_all(store).await?;
    let overview = RecurringOverview::build(&rules, &categories, unit, filter);
    let currency = &config.display.currency;

    println!(
        "\n{} ({} items)\n",
        "Recurring expenses".bold(),
        overview.len()
    );

    if by_category {
        for group in overview.by_category() {
            println!(
                "  {:<28} {:>14}{}  {}",
                group.name,
                unit_amount(group.total, unit),
                unit.label(),
                format!("{} rule(s)", group.count).as_str().dimmed()
            );
        }
    } else {
        for row in overview.rows() {
            let mut name = row.name.clone();
            if !row.is_active {
                name.push_str(" (paused)");
            }
            let tag = if row.is_essential { "essential" } else { "" };
            println!(
                "  {:<28} {:>10}{:<6} {:>14}{}  {}",
                name,
                format!("{:.2}", row.amount),
                row.frequency.label(),
                unit_amount(row.normalized, unit),
                unit.label(),
                tag.cyan()
            );
        }
    }

    if overview.is_empty() {
        println!("  {}", "No recurring expenses match.".dimmed());
    }

    println!(
        "\n  {} {} {}{}\n",
        "Total:".bold(),
        unit_amount(overview.total(), unit),
        currency,
        unit.label()
    );
    Ok(())
}

async fn show_ceiling(store: &dyn RecordStore, config: &Config) -> Result<()> {
    let rules: Vec<RecurringRule> = load_all(store).await?;
    let currency = &config.display.currency;

    let income = fixed_monthly_income(&rules);
    let expenses = recurring_total(&rules, Direction::Expense, TimeUnit::Month);
    let net = income.saturating_sub(expenses);

    println!("\n{}\n", "Fixed monthly income".bold());
    println!("  Income:    {}", money(income, currency).as_str().green());
    println!("  Expenses:  {}", money(expenses, currency).as_str().red());
    let net_text = money(net, currency);
    if net < Decimal::ZERO {
        println!("  Net:       {}", net_text.as_str().red().bold());
    } else {
        println!("  Net:       {}", net_text.as_str().bold());
    }
    println!();
    Ok(())
}

async fn show_budget(
    store: &dyn RecordStore,
    config: &Config,
    plan_id: Option<&str>,
    compare: Option<(i32, u32)>,
) -> Result<()> {
    let session = BudgetSession::load(store, plan_id).await?;
    let categories: Vec<Category> = load_all(store).await?;
    let currency = &config.display.currency;
    let plan = session.plan();

    println!(
        "\n{} {} ({}-{:02})\n",
        "Budget plan".bold(),
        plan.id,
        plan.year,
        plan.month
    );

    match compare {
        Some((year, month)) => {
            let transactions: Vec<Transaction> = load_all(store).await?;
            let rows = compare_plan(session.items(), &categories, &transactions, year, month);
            println!(
                "  {:<28} {:>12} {:>12} {:>12}",
                "", "planned", "actual", "left"
            );
            for row in rows {
                let variance = format!("{:.2}", row.variance);
                let variance = if row.over_budget {
                    variance.as_str().red()
                } else {
                    variance.as_str().green()
                };
                println!(
                    "  {:<28} {:>12} {:>12} {:>12}",
                    row.label,
                    format!("{:.2}", row.planned),
                    format!("{:.2}", row.actual),
                    variance
                );
            }

            let months = spending_months(&transactions);
            if !months.contains(&(year, month)) {
                let listed: Vec<String> = months
                    .iter()
                    .map(|(y, m)| format!("{}-{:02}", y, m))
                    .collect();
                println!(
                    "\n  {} {}",
                    "No spending recorded that month. Months with spending:".yellow(),
                    listed.join(", ")
                );
            }
        }
        None => {
            for item in session.items() {
                println!(
                    "  {:<28} {:>12}  {}",
                    item_label(item, &categories),
                    format!("{:.2}", item.planned_amount),
                    item.id.as_str().dimmed()
                );
            }
        }
    }

    print_totals(&session, currency);
    Ok(())
}

fn print_totals(session: &BudgetSession, currency: &str) {
    let remaining = session.remaining();
    println!();
    println!("  Ceiling:    {}", money(session.ceiling(), currency));
    println!("  Allocated:  {}", money(session.total_allocated(), currency));
    if remaining < Decimal::ZERO {
        println!("  Remaining:  {}", money(remaining, currency).as_str().red().bold());
    } else {
        println!("  Remaining:  {}", money(remaining, currency).as_str().green());
    }
    println!();
}

async fn edit_budget(
    store: &dyn RecordStore,
    config: &Config,
    plan_id: Option<&str>,
    assignments: &[(String, Decimal)],
    reset: bool,
    dry_run: bool,
) -> Result<()> {
    let currency = &config.display.currency;
    let mut session = BudgetSession::load(store, plan_id).await?;
    session.begin()?;

    if reset {
        session.reset_all()?;
    }
    for &(ref id, requested) in assignments {
        let stored = session.set_item(id, requested)?;
        if stored < BudgetAllocator::clamp_request(requested) {
            println!(
                "  {} {} capped at {} (requested {:.2})",
                "!".yellow().bold(),
                id,
                money(stored, currency),
                requested
            );
        }
    }

    let changes = session.pending_changes();
    if changes.is_empty() {
        println!("{}", "No changes.".dimmed());
    } else {
        println!("\n{}\n", "Changes".bold());
        for (id, value) in &changes {
            let before = session
                .items()
                .iter()
                .find(|item| &item.id == id)
                .map(|item| item.planned_amount)
                .unwrap_or(Decimal::ZERO);
            println!(
                "  {:<20} {:>12} → {:>12}",
                id,
                format!("{:.2}", before),
                format!("{:.2}", value)
            );
        }
    }

    if dry_run {
        print_totals(&session, currency);
        session.cancel()?;
        println!("{}", "Dry run: nothing saved.".dimmed());
        return Ok(());
    }

    match session.commit(store).await {
        Ok(report) => {
            println!(
                "\n{} {} item(s) saved, {} unchanged",
                "✓".green().bold(),
                report.written.len(),
                report.unchanged
            );
            print_totals(&session, currency);
            Ok(())
        }
        Err(FinanceError::CommitFailed {
            failed_id,
            written,
            reason,
        }) => {
            eprintln!("{} saving {} failed: {}", "✗".red().bold(), failed_id, reason);
            if !written.is_empty() {
                eprintln!("  Already saved: {}", written.join(", "));
            }
            eprintln!("  Items after {} were not saved. Reload and retry.", failed_id);
            Err(anyhow::anyhow!("budget commit incomplete"))
        }
        Err(e) => Err(e.into()),
    }
}

async fn simulate_cancellations(
    store: &dyn RecordStore,
    config: &Config,
    cancel: &[String],
) -> Result<()> {
    let rules: Vec<RecurringRule> = load_all(store).await?;
    let mut simulator = CancelSimulator::new(&rules);
    let currency = &config.display.currency;

    for id in cancel {
        if !simulator.toggle(id) {
            tracing::warn!(rule = %id, "not an active recurring expense, ignored");
        }
    }

    println!("\n{}\n", "Cancel simulator".bold());
    for rule in simulator.rules() {
        let mark = if simulator.is_cancelled(&rule.rule_id) {
            "[x]".green().bold()
        } else {
            "[ ]".normal()
        };
        println!(
            "  {} {:<28} {:>12}/mo  {}",
            mark,
            rule.name,
            format!("{:.2}", rule.monthly),
            rule.rule_id.as_str().dimmed()
        );
    }

    let savings = simulator.savings();
    println!(
        "\n  Potential savings: {}  ({} per year)\n",
        money(savings, currency).as_str().green().bold(),
        money(savings.saturating_mul(Decimal::from(12)), currency)
    );
    Ok(())
}

fn show_config(config: &Config, path: &Path, verbosity: Verbosity) {
    println!("\n{}\n", "allotment configuration".bold());
    println!("File:");
    println!("  {}", path.display());
    println!();

    println!("Store:");
    match &config.store {
        StoreConfig::Json { dir } => {
            println!("  Backend:  json");
            println!("  Dir:      {}", dir.display());
        }
        StoreConfig::Sheets { url } => {
            println!("  Backend:  sheets");
            println!("  URL:      {}", url);
        }
    }
    println!();

    println!("Display:");
    println!("  Time unit:  {}", config.display.time_unit);
    println!("  Currency:   {}", config.display.currency);
    println!("  Verbosity:  {}", verbosity.as_str());
    println!();
}

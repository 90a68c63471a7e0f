// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use finance_tracker::config::{Cli, Command, Config};
use finance_tracker::validation::{self, validate_expense, validate_income};
use finance_tracker::Store;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();
    let command = cli.command();

    init_logging(&config, command == Command::Ui)?;

    let store = Store::open(config.db_path.clone())?;

    match command {
        Command::Ui => run_ui_mode(store, &config)?,
        Command::AddIncome { source, amount, date } => {
            let entry = validate_income(&source, &amount, &date)
                .map_err(|errors| anyhow::anyhow!(validation::describe(&errors)))?;
            let id = store.insert_income(&entry.source, entry.amount, &entry.date)?;
            println!("✓ Income #{} added", id);
        }
        Command::AddExpense { category, amount, date } => {
            let entry = validate_expense(&category, &amount, &date)
                .map_err(|errors| anyhow::anyhow!(validation::describe(&errors)))?;
            let id = store.insert_expense(entry.category, entry.amount, &entry.date)?;
            println!("✓ Expense #{} added", id);
        }
        Command::DeleteIncome { id } => report_delete("Income", id, store.delete_income(id)?),
        Command::DeleteExpense { id } => report_delete("Expense", id, store.delete_expense(id)?),
        Command::Summary => print_summary(&store, config.recent_limit)?,
        Command::NormalizeDates => {
            let report = store.normalize_dates()?;
            println!("✓ Rewritten: {} dates", report.rewritten);
            println!("✓ Unrecognised (left as-is): {}", report.skipped);
        }
    }

    Ok(())
}

/// The UI owns the terminal, so it logs to a file. Subcommands log to stderr.
fn init_logging(config: &Config, to_file: bool) -> Result<()> {
    let default_level = if to_file { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

fn report_delete(kind: &str, id: i64, removed: bool) {
    if removed {
        println!("✓ {} #{} deleted", kind, id);
    } else {
        println!("• No {} #{} to delete", kind.to_lowercase(), id);
    }
}

fn print_summary(store: &Store, recent_limit: usize) -> Result<()> {
    let totals = store.totals()?;
    let recent = store.recent_transactions(recent_limit)?;

    println!("💰 Finance Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Total Income:   {:>12.2}", totals.income);
    println!("  Total Expenses: {:>12.2}", totals.expenses);
    println!("  Balance:        {:>12.2}", totals.balance);

    println!("\n📈 Recent Income");
    if recent.income.is_empty() {
        println!("  (none)");
    }
    for r in &recent.income {
        println!("  #{:<5} {}  {:<24} {:>12.2}", r.id, r.display_date(), r.source, r.amount);
    }

    println!("\n📉 Recent Expenses");
    if recent.expenses.is_empty() {
        println!("  (none)");
    }
    for r in &recent.expenses {
        println!("  #{:<5} {}  {:<24} {:>12.2}", r.id, r.display_date(), r.category_label, r.amount);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: Store, config: &Config) -> Result<()> {
    let mut app = finance_tracker::App::new(store, config.recent_limit)?;
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: Store, _config: &Config) -> Result<()> {
    anyhow::bail!("TUI mode not available; rebuild with `--features tui` or use a subcommand (see --help)")
}

// Command line + environment configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "finance_tracker.db";
pub const DEFAULT_LOG_FILE: &str = "finance_tracker.log";
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "finance-tracker")]
#[command(version, about = "Record income and expenses in a local SQLite file", long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FINANCE_TRACKER_DB", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Log file used while the terminal UI is running
    #[arg(long, global = true, env = "FINANCE_TRACKER_LOG", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// How many recent records per table to show
    #[arg(long, global = true, default_value_t = DEFAULT_RECENT_LIMIT)]
    pub recent: usize,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the terminal UI (default)
    Ui,
    /// Record income. DATE is MM-DD-YYYY.
    AddIncome {
        source: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        date: String,
    },
    /// Record an expense. DATE is MM-DD-YYYY.
    AddExpense {
        category: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        date: String,
    },
    /// Delete an income record by id
    DeleteIncome { id: i64 },
    /// Delete an expense record by id
    DeleteExpense { id: i64 },
    /// Print totals, balance and recent records
    Summary,
    /// Rewrite MM-DD-YYYY dates stored by older versions as YYYY-MM-DD
    NormalizeDates,
}

/// Resolved settings shared by the UI and the subcommands
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_file: PathBuf,
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            db_path: cli.db.clone(),
            log_file: cli.log_file.clone(),
            recent_limit: cli.recent,
        }
    }
}

impl Cli {
    pub fn config(&self) -> Config {
        Config::from(self)
    }

    /// No subcommand means the UI
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["finance-tracker"]).unwrap();

        assert_eq!(cli.command(), Command::Ui);
        // env vars may be set on the machine running tests; only check the limit
        assert_eq!(cli.config().recent_limit, DEFAULT_RECENT_LIMIT);
    }

    #[test]
    fn test_add_expense_with_global_flags() {
        let cli = Cli::try_parse_from([
            "finance-tracker",
            "add-expense",
            "Groceries",
            "150.50",
            "01-16-2024",
            "--db",
            "/tmp/books.db",
            "--recent",
            "10",
        ])
        .unwrap();

        assert_eq!(
            cli.command(),
            Command::AddExpense {
                category: "Groceries".to_string(),
                amount: "150.50".to_string(),
                date: "01-16-2024".to_string(),
            }
        );
        let config = cli.config();
        assert_eq!(config.db_path, PathBuf::from("/tmp/books.db"));
        assert_eq!(config.recent_limit, 10);
    }

    #[test]
    fn test_delete_requires_numeric_id() {
        assert!(Cli::try_parse_from(["finance-tracker", "delete-income", "abc"]).is_err());

        let cli = Cli::try_parse_from(["finance-tracker", "delete-income", "42"]).unwrap();
        assert_eq!(cli.command(), Command::DeleteIncome { id: 42 });
    }
}

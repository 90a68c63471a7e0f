// Personal Finance Tracker - Core Library
// Income/expense storage, totals and recent entries over a local SQLite file

pub mod app;
pub mod config;
pub mod dates;
pub mod db;
pub mod entities;
pub mod forms;
pub mod validation;

// Re-export commonly used types
pub use app::{App, Page, Status};
pub use config::{Cli, Command, Config};
pub use db::{
    DateMigration, RecentTransactions, Store, Totals,
    setup_database, normalize_dates,
    insert, insert_income, insert_expense,
    delete, delete_income, delete_expense,
    totals, recent, recent_income, recent_expenses, recent_transactions,
    all_income, all_expenses,
};
pub use entities::{
    ExpenseCategory, ExpenseRecord, IncomeRecord, Ledger, NewExpense, NewIncome, Record,
};
pub use forms::{ExpenseForm, IncomeForm};
pub use validation::{EntryError, Field, ValidationResult, validate_expense, validate_income};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

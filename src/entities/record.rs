// Stored income and expense rows, plus the ledger (table) selector

use serde::{Deserialize, Serialize};

use super::category::ExpenseCategory;
use crate::dates;

// ============================================================================
// LEDGER
// ============================================================================

/// Which of the two tables an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ledger {
    Income,
    Expenses,
}

impl Ledger {
    pub fn table(&self) -> &'static str {
        match self {
            Ledger::Income => "income",
            Ledger::Expenses => "expenses",
        }
    }

    /// Name of the descriptive label column
    pub fn label_column(&self) -> &'static str {
        match self {
            Ledger::Income => "source",
            Ledger::Expenses => "category",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Ledger::Income => "Income",
            Ledger::Expenses => "Expenses",
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

/// One row of the `income` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: i64,
    pub source: String,
    pub amount: f64,
    /// Stored form, ISO `YYYY-MM-DD` once normalized
    pub date: String,
}

/// One row of the `expenses` table
///
/// `category_label` is the raw stored text. Databases written before the
/// category list existed may hold free text, so it is never rejected on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub category_label: String,
    pub amount: f64,
    pub date: String,
}

impl IncomeRecord {
    pub fn display_date(&self) -> String {
        dates::to_display(&self.date)
    }
}

impl ExpenseRecord {
    /// The known category, if the stored label is one
    pub fn category(&self) -> Option<ExpenseCategory> {
        ExpenseCategory::from_label(&self.category_label)
    }

    pub fn display_date(&self) -> String {
        dates::to_display(&self.date)
    }
}

/// A row from either table, for views that list both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Income(IncomeRecord),
    Expense(ExpenseRecord),
}

impl Record {
    pub fn id(&self) -> i64 {
        match self {
            Record::Income(r) => r.id,
            Record::Expense(r) => r.id,
        }
    }

    pub fn ledger(&self) -> Ledger {
        match self {
            Record::Income(_) => Ledger::Income,
            Record::Expense(_) => Ledger::Expenses,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Record::Income(r) => &r.source,
            Record::Expense(r) => &r.category_label,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Record::Income(r) => r.amount,
            Record::Expense(r) => r.amount,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Record::Income(r) => &r.date,
            Record::Expense(r) => &r.date,
        }
    }
}

// ============================================================================
// NEW ENTRIES (validated, not yet stored)
// ============================================================================

/// Validated income ready for insertion. `date` is canonical ISO.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    pub source: String,
    pub amount: f64,
    pub date: String,
}

/// Validated expense ready for insertion. `date` is canonical ISO.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub date: String,
}

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::dates::{self, DateLayout};
use crate::entities::{ExpenseCategory, ExpenseRecord, IncomeRecord, Ledger, Record};

/// Sums across both tables
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    /// income - expenses
    pub balance: f64,
}

/// Most recent rows of each table, newest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecentTransactions {
    pub income: Vec<IncomeRecord>,
    pub expenses: Vec<ExpenseRecord>,
}

impl RecentTransactions {
    /// Both lists merged into one, newest date first
    pub fn combined(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .income
            .iter()
            .cloned()
            .map(Record::Income)
            .chain(self.expenses.iter().cloned().map(Record::Expense))
            .collect();

        // stable sort keeps each table's own id ordering for equal dates
        records.sort_by(|a, b| b.date().cmp(a.date()));
        records
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expenses.is_empty()
    }
}

/// Outcome of `normalize_dates`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateMigration {
    /// Rows rewritten from MM-DD-YYYY to YYYY-MM-DD
    pub rewritten: usize,
    /// Rows whose date matches neither layout; left untouched
    pub skipped: usize,
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Create both tables and their date indexes if missing.
/// Leaves an existing file's journal mode alone.
pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create income table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create expenses table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_income_date ON income(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date)",
        [],
    )?;

    Ok(())
}

/// Rewrite MM-DD-YYYY dates to YYYY-MM-DD in both tables.
/// Safe to run repeatedly; ISO rows are left alone.
pub fn normalize_dates(conn: &Connection) -> Result<DateMigration> {
    let mut report = DateMigration::default();

    for ledger in [Ledger::Income, Ledger::Expenses] {
        let mut stmt = conn.prepare(&format!("SELECT id, date FROM {}", ledger.table()))?;
        let rows: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        for (id, date) in rows {
            match dates::parse_stored(&date) {
                Some((_, DateLayout::Iso)) => {}
                Some((parsed, DateLayout::MonthFirst)) => {
                    conn.execute(
                        &format!("UPDATE {} SET date = ?1 WHERE id = ?2", ledger.table()),
                        params![dates::to_stored(parsed), id],
                    )
                    .with_context(|| format!("Failed to rewrite date of {} #{}", ledger.table(), id))?;
                    report.rewritten += 1;
                }
                None => {
                    warn!(table = ledger.table(), id, date = %date, "unrecognised date left as-is");
                    report.skipped += 1;
                }
            }
        }
    }

    if report.rewritten > 0 {
        info!(rewritten = report.rewritten, skipped = report.skipped, "normalized stored dates");
    }

    Ok(report)
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// Insert a row into either table and return its id.
///
/// Dates may be MM-DD-YYYY or YYYY-MM-DD and are always written as
/// YYYY-MM-DD. Expense labels must name an `ExpenseCategory` and are written
/// in its canonical spelling.
pub fn insert(conn: &Connection, ledger: Ledger, label: &str, amount: f64, date: &str) -> Result<i64> {
    if label.trim().is_empty() {
        bail!("{} requires a non-empty {}", ledger.table(), ledger.label_column());
    }
    if !amount.is_finite() {
        bail!("{} amount must be a finite number, got {}", ledger.table(), amount);
    }
    if date.trim().is_empty() {
        bail!("{} requires a date", ledger.table());
    }

    let date = match dates::parse_stored(date) {
        Some((parsed, _)) => dates::to_stored(parsed),
        None => bail!("{} date must be MM-DD-YYYY or YYYY-MM-DD, got {:?}", ledger.table(), date.trim()),
    };

    let label = match ledger {
        Ledger::Income => label.trim(),
        Ledger::Expenses => match ExpenseCategory::from_label(label) {
            Some(category) => category.as_str(),
            None => bail!("unknown expense category {:?}", label.trim()),
        },
    };

    conn.execute(
        &format!(
            "INSERT INTO {} ({}, amount, date) VALUES (?1, ?2, ?3)",
            ledger.table(),
            ledger.label_column()
        ),
        params![label, amount, date],
    )
    .with_context(|| format!("Failed to insert into {}", ledger.table()))?;

    let id = conn.last_insert_rowid();
    info!(table = ledger.table(), id, amount, "record added");
    Ok(id)
}

pub fn insert_income(conn: &Connection, source: &str, amount: f64, date: &str) -> Result<i64> {
    insert(conn, Ledger::Income, source, amount, date)
}

pub fn insert_expense(
    conn: &Connection,
    category: ExpenseCategory,
    amount: f64,
    date: &str,
) -> Result<i64> {
    insert(conn, Ledger::Expenses, category.as_str(), amount, date)
}

/// Delete a row by id. Returns false if no such row existed.
pub fn delete(conn: &Connection, ledger: Ledger, id: i64) -> Result<bool> {
    let removed = conn
        .execute(
            &format!("DELETE FROM {} WHERE id = ?1", ledger.table()),
            params![id],
        )
        .with_context(|| format!("Failed to delete {} #{}", ledger.table(), id))?;

    if removed > 0 {
        info!(table = ledger.table(), id, "record deleted");
    } else {
        debug!(table = ledger.table(), id, "delete matched no record");
    }

    Ok(removed > 0)
}

pub fn delete_income(conn: &Connection, id: i64) -> Result<bool> {
    delete(conn, Ledger::Income, id)
}

pub fn delete_expense(conn: &Connection, id: i64) -> Result<bool> {
    delete(conn, Ledger::Expenses, id)
}

pub fn count(conn: &Connection, ledger: Ledger) -> Result<i64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", ledger.table()),
        [],
        |row| row.get(0),
    )?;

    Ok(count)
}

// ============================================================================
// AGGREGATOR
// ============================================================================

fn sum_amount(conn: &Connection, ledger: Ledger) -> Result<f64> {
    let sum: f64 = conn
        .query_row(
            &format!("SELECT COALESCE(SUM(amount), 0.0) FROM {}", ledger.table()),
            [],
            |row| row.get(0),
        )
        .with_context(|| format!("Failed to sum {}", ledger.table()))?;

    Ok(sum)
}

pub fn totals(conn: &Connection) -> Result<Totals> {
    let income = sum_amount(conn, Ledger::Income)?;
    let expenses = sum_amount(conn, Ledger::Expenses)?;

    Ok(Totals {
        income,
        expenses,
        balance: income - expenses,
    })
}

fn income_from_row(row: &Row) -> rusqlite::Result<IncomeRecord> {
    Ok(IncomeRecord {
        id: row.get(0)?,
        source: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
    })
}

fn expense_from_row(row: &Row) -> rusqlite::Result<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: row.get(0)?,
        category_label: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
    })
}

/// SQLite treats a negative LIMIT as unbounded; oversized counts saturate
fn sql_limit(limit: Option<usize>) -> i64 {
    match limit {
        Some(n) => i64::try_from(n).unwrap_or(i64::MAX),
        None => -1,
    }
}

/// Rows ordered by date descending, ties newest id first.
/// `limit = None` returns every row.
fn query_newest<T>(
    conn: &Connection,
    ledger: Ledger,
    limit: Option<usize>,
    map: fn(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let limit = sql_limit(limit);

    let mut stmt = conn.prepare(&format!(
        "SELECT id, {}, amount, date
         FROM {}
         ORDER BY date DESC, id DESC
         LIMIT ?1",
        ledger.label_column(),
        ledger.table()
    ))?;

    let rows = stmt
        .query_map(params![limit], map)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read {}", ledger.table()))?;

    Ok(rows)
}

pub fn recent_income(conn: &Connection, n: usize) -> Result<Vec<IncomeRecord>> {
    query_newest(conn, Ledger::Income, Some(n), income_from_row)
}

pub fn recent_expenses(conn: &Connection, n: usize) -> Result<Vec<ExpenseRecord>> {
    query_newest(conn, Ledger::Expenses, Some(n), expense_from_row)
}

/// Up to `n` rows of one table, newest first
pub fn recent(conn: &Connection, ledger: Ledger, n: usize) -> Result<Vec<Record>> {
    let records = match ledger {
        Ledger::Income => recent_income(conn, n)?.into_iter().map(Record::Income).collect(),
        Ledger::Expenses => recent_expenses(conn, n)?.into_iter().map(Record::Expense).collect(),
    };

    Ok(records)
}

pub fn recent_transactions(conn: &Connection, n: usize) -> Result<RecentTransactions> {
    Ok(RecentTransactions {
        income: recent_income(conn, n)?,
        expenses: recent_expenses(conn, n)?,
    })
}

pub fn all_income(conn: &Connection) -> Result<Vec<IncomeRecord>> {
    query_newest(conn, Ledger::Income, None, income_from_row)
}

pub fn all_expenses(conn: &Connection) -> Result<Vec<ExpenseRecord>> {
    query_newest(conn, Ledger::Expenses, None, expense_from_row)
}

// ============================================================================
// STORE (one connection per call)
// ============================================================================

/// File-backed store. Holds only the path; every call opens its own
/// connection and closes it before returning, on success or failure.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    /// Create the store, ensure the schema exists and normalize legacy dates
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Store::new(path);
        store.setup_schema()?;
        store.normalize_dates()?;
        info!(path = %store.path.display(), "store ready");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a fresh connection that is closed afterwards
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = Connection::open(&self.path)
            .with_context(|| format!("Failed to open database {}", self.path.display()))?;

        let result = f(&conn);

        if let Err((_, err)) = conn.close() {
            warn!(path = %self.path.display(), error = %err, "failed to close database");
        }

        result
    }

    pub fn setup_schema(&self) -> Result<()> {
        self.with_connection(setup_database)
    }

    pub fn normalize_dates(&self) -> Result<DateMigration> {
        self.with_connection(normalize_dates)
    }

    pub fn insert(&self, ledger: Ledger, label: &str, amount: f64, date: &str) -> Result<i64> {
        self.with_connection(|conn| insert(conn, ledger, label, amount, date))
    }

    pub fn insert_income(&self, source: &str, amount: f64, date: &str) -> Result<i64> {
        self.with_connection(|conn| insert_income(conn, source, amount, date))
    }

    pub fn insert_expense(&self, category: ExpenseCategory, amount: f64, date: &str) -> Result<i64> {
        self.with_connection(|conn| insert_expense(conn, category, amount, date))
    }

    pub fn delete(&self, ledger: Ledger, id: i64) -> Result<bool> {
        self.with_connection(|conn| delete(conn, ledger, id))
    }

    pub fn delete_income(&self, id: i64) -> Result<bool> {
        self.with_connection(|conn| delete_income(conn, id))
    }

    pub fn delete_expense(&self, id: i64) -> Result<bool> {
        self.with_connection(|conn| delete_expense(conn, id))
    }

    pub fn totals(&self) -> Result<Totals> {
        self.with_connection(totals)
    }

    pub fn recent(&self, ledger: Ledger, n: usize) -> Result<Vec<Record>> {
        self.with_connection(|conn| recent(conn, ledger, n))
    }

    pub fn recent_transactions(&self, n: usize) -> Result<RecentTransactions> {
        self.with_connection(|conn| recent_transactions(conn, n))
    }

    pub fn all_income(&self) -> Result<Vec<IncomeRecord>> {
        self.with_connection(all_income)
    }

    pub fn all_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        self.with_connection(all_expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_conn();
        insert_income(&conn, "Paycheck", 1000.0, "2024-01-15").unwrap();

        setup_database(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('income', 'expenses')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
        assert_eq!(count(&conn, Ledger::Income).unwrap(), 1);
    }

    #[test]
    fn test_totals_serialize_round_trip() {
        let totals = Totals { income: 1000.0, expenses: 150.5, balance: 849.5 };

        let json = serde_json::to_string(&totals).unwrap();
        assert_eq!(json, r#"{"income":1000.0,"expenses":150.5,"balance":849.5}"#);
        assert_eq!(serde_json::from_str::<Totals>(&json).unwrap(), totals);
    }

    #[test]
    fn test_insert_then_recent_returns_record() {
        let conn = test_conn();

        let id = insert_income(&conn, "Paycheck", 1000.0, "2024-01-15").unwrap();
        let recent = recent_income(&conn, 1).unwrap();

        assert_eq!(
            recent,
            vec![IncomeRecord {
                id,
                source: "Paycheck".to_string(),
                amount: 1000.0,
                date: "2024-01-15".to_string(),
            }]
        );
    }

    #[test]
    fn test_ids_are_never_reused() {
        let conn = test_conn();

        let first = insert_expense(&conn, ExpenseCategory::Dining, 20.0, "2024-01-01").unwrap();
        delete_expense(&conn, first).unwrap();
        let second = insert_expense(&conn, ExpenseCategory::Dining, 20.0, "2024-01-01").unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_insert_rejects_empty_label() {
        let conn = test_conn();

        assert!(insert(&conn, Ledger::Income, "  ", 5.0, "2024-01-01").is_err());
        assert!(insert(&conn, Ledger::Income, "Gift", f64::NAN, "2024-01-01").is_err());
        assert!(insert(&conn, Ledger::Income, "Gift", 5.0, "").is_err());
        assert_eq!(count(&conn, Ledger::Income).unwrap(), 0);
    }

    #[test]
    fn test_insert_stores_month_first_dates_as_iso() {
        let conn = test_conn();

        let paycheck = insert_income(&conn, "Paycheck", 1000.0, "01-15-2024").unwrap();
        insert_income(&conn, "Old", 5.0, "2023-12-31").unwrap();

        let recent = recent_income(&conn, 1).unwrap();
        assert_eq!(recent[0].id, paycheck);
        assert_eq!(recent[0].date, "2024-01-15");
    }

    #[test]
    fn test_insert_rejects_unrecognised_date() {
        let conn = test_conn();

        assert!(insert_income(&conn, "Gift", 5.0, "last tuesday").is_err());
        assert!(insert_income(&conn, "Gift", 5.0, "02-30-2024").is_err());
        assert_eq!(count(&conn, Ledger::Income).unwrap(), 0);
    }

    #[test]
    fn test_generic_insert_only_writes_known_categories() {
        let conn = test_conn();

        assert!(insert(&conn, Ledger::Expenses, "Yachts", 1.0, "2024-01-01").is_err());
        assert_eq!(count(&conn, Ledger::Expenses).unwrap(), 0);

        insert(&conn, Ledger::Expenses, "dining", 18.75, "2024-02-14").unwrap();
        let expenses = all_expenses(&conn).unwrap();
        assert_eq!(expenses[0].category_label, "Dining");
        assert_eq!(expenses[0].category(), Some(ExpenseCategory::Dining));
    }

    #[test]
    fn test_sql_limit_saturates() {
        assert_eq!(sql_limit(None), -1);
        assert_eq!(sql_limit(Some(5)), 5);
        assert_eq!(sql_limit(Some(usize::MAX)), i64::MAX);
    }

    #[test]
    fn test_no_duplicate_detection() {
        let conn = test_conn();

        insert_income(&conn, "Gift", 50.0, "2024-02-01").unwrap();
        insert_income(&conn, "Gift", 50.0, "2024-02-01").unwrap();

        assert_eq!(count(&conn, Ledger::Income).unwrap(), 2);
    }

    #[test]
    fn test_delete_removes_only_that_record() {
        let conn = test_conn();

        let keep = insert_expense(&conn, ExpenseCategory::Housing, 900.0, "2024-01-01").unwrap();
        let gone = insert_expense(&conn, ExpenseCategory::Dining, 40.0, "2024-01-02").unwrap();

        assert!(delete_expense(&conn, gone).unwrap());

        let remaining = all_expenses(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep);
        assert_eq!(totals(&conn).unwrap().expenses, 900.0);
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let conn = test_conn();
        insert_income(&conn, "Paycheck", 1000.0, "2024-01-15").unwrap();

        assert!(!delete_income(&conn, 9999).unwrap());
        assert_eq!(count(&conn, Ledger::Income).unwrap(), 1);
    }

    #[test]
    fn test_totals_on_empty_tables() {
        let conn = test_conn();

        assert_eq!(totals(&conn).unwrap(), Totals::default());

        insert_expense(&conn, ExpenseCategory::Utilities, 75.25, "2024-03-01").unwrap();
        let t = totals(&conn).unwrap();
        assert_eq!(t.income, 0.0);
        assert_eq!(t.expenses, 75.25);
        assert_eq!(t.balance, -75.25);
    }

    #[test]
    fn test_totals_end_to_end() {
        let conn = test_conn();

        insert_income(&conn, "Paycheck", 1000.00, "2024-01-15").unwrap();
        insert_expense(&conn, ExpenseCategory::Groceries, 150.50, "2024-01-16").unwrap();

        let t = totals(&conn).unwrap();
        assert_eq!(t.income, 1000.00);
        assert_eq!(t.expenses, 150.50);
        assert!((t.balance - 849.50).abs() < 1e-9);
    }

    #[test]
    fn test_recent_orders_by_date_then_newest_id() {
        let conn = test_conn();

        let old = insert_income(&conn, "Old", 1.0, "2023-12-31").unwrap();
        let tie_a = insert_income(&conn, "Tie A", 2.0, "2024-01-10").unwrap();
        let tie_b = insert_income(&conn, "Tie B", 3.0, "2024-01-10").unwrap();
        let newest = insert_income(&conn, "Newest", 4.0, "2024-02-01").unwrap();

        let ids: Vec<i64> = recent_income(&conn, 10).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newest, tie_b, tie_a, old]);

        let limited = recent(&conn, Ledger::Income, 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id(), newest);
    }

    #[test]
    fn test_recent_zero_returns_nothing() {
        let conn = test_conn();
        insert_income(&conn, "Paycheck", 1000.0, "2024-01-15").unwrap();

        assert!(recent_income(&conn, 0).unwrap().is_empty());
        assert_eq!(recent_income(&conn, usize::MAX).unwrap().len(), 1);
    }

    #[test]
    fn test_recent_transactions_combined() {
        let conn = test_conn();

        insert_income(&conn, "Paycheck", 1000.0, "2024-01-15").unwrap();
        insert_expense(&conn, ExpenseCategory::Groceries, 150.5, "2024-01-16").unwrap();
        insert_expense(&conn, ExpenseCategory::Dining, 30.0, "2024-01-01").unwrap();

        let recent = recent_transactions(&conn, 5).unwrap();
        assert_eq!(recent.income.len(), 1);
        assert_eq!(recent.expenses.len(), 2);

        let dates: Vec<String> = recent
            .combined()
            .iter()
            .map(|r| r.date().to_string())
            .collect();
        assert_eq!(dates, vec!["2024-01-16", "2024-01-15", "2024-01-01"]);
    }

    #[test]
    fn test_legacy_free_text_category_reads_back() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO expenses (category, amount, date) VALUES ('Grocery', 12.0, '2024-01-05')",
            [],
        )
        .unwrap();

        let expenses = all_expenses(&conn).unwrap();
        assert_eq!(expenses[0].category_label, "Grocery");
        assert_eq!(expenses[0].category(), None);
    }

    #[test]
    fn test_normalize_dates() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO income (source, amount, date) VALUES ('Legacy', 10.0, '01-15-2024')",
            [],
        )
        .unwrap();
        insert_income(&conn, "Current", 20.0, "2024-01-14").unwrap();
        conn.execute(
            "INSERT INTO expenses (category, amount, date) VALUES ('Other', 5.0, 'last tuesday')",
            [],
        )
        .unwrap();

        let report = normalize_dates(&conn).unwrap();
        assert_eq!(report, DateMigration { rewritten: 1, skipped: 1 });

        let income = all_income(&conn).unwrap();
        assert_eq!(income[0].source, "Legacy");
        assert_eq!(income[0].date, "2024-01-15");

        let again = normalize_dates(&conn).unwrap();
        assert_eq!(again.rewritten, 0);
    }
}

// Entry models
//
// - Ledger selects one of the two tables
// - IncomeRecord / ExpenseRecord are stored rows, NewIncome / NewExpense are
//   validated entries waiting to be inserted
// - ExpenseCategory is the fixed list of expense labels

pub mod category;
pub mod record;

pub use category::ExpenseCategory;
pub use record::{ExpenseRecord, IncomeRecord, Ledger, NewExpense, NewIncome, Record};

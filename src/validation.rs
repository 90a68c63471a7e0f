// 📐 Input validation - raw form strings → typed entries
//
// Runs before any store access. A failed validation leaves the caller's
// input untouched so it can be corrected and resubmitted.

use std::fmt;
use thiserror::Error;

use crate::dates;
use crate::entities::{ExpenseCategory, NewExpense, NewIncome};

// ============================================================================
// FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Source,
    Category,
    Amount,
    Date,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Source => "Source",
            Field::Category => "Category",
            Field::Amount => "Amount",
            Field::Date => "Date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("{0} is required")]
    MissingField(Field),

    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),

    #[error("amount cannot be negative (got {0})")]
    NegativeAmount(String),

    #[error("'{0}' is not a valid date, expected MM-DD-YYYY")]
    InvalidDate(String),

    #[error("'{0}' is not a known expense category")]
    UnknownCategory(String),
}

impl EntryError {
    /// The form field this error belongs to
    pub fn field(&self) -> Field {
        match self {
            EntryError::MissingField(field) => *field,
            EntryError::InvalidAmount(_) | EntryError::NegativeAmount(_) => Field::Amount,
            EntryError::InvalidDate(_) => Field::Date,
            EntryError::UnknownCategory(_) => Field::Category,
        }
    }
}

pub type ValidationResult<T> = Result<T, Vec<EntryError>>;

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Parse an amount string. Zero is allowed; negatives and non-finite values
/// are not.
pub fn parse_amount(input: &str) -> Result<f64, EntryError> {
    let trimmed = input.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| EntryError::InvalidAmount(trimmed.to_string()))?;

    if !amount.is_finite() {
        return Err(EntryError::InvalidAmount(trimmed.to_string()));
    }
    if amount < 0.0 {
        return Err(EntryError::NegativeAmount(trimmed.to_string()));
    }

    // "-0" parses to -0.0, which would display as -0.00
    Ok(amount + 0.0)
}

/// Parse an MM-DD-YYYY date and return it in stored (ISO) form
pub fn parse_date(input: &str) -> Result<String, EntryError> {
    dates::parse_entry(input)
        .map(dates::to_stored)
        .ok_or_else(|| EntryError::InvalidDate(input.trim().to_string()))
}

fn require(errors: &mut Vec<EntryError>, field: Field, value: &str) {
    if value.trim().is_empty() {
        errors.push(EntryError::MissingField(field));
    }
}

// ============================================================================
// ENTRY VALIDATORS
// ============================================================================

pub fn validate_income(source: &str, amount: &str, date: &str) -> ValidationResult<NewIncome> {
    let mut errors = Vec::new();
    require(&mut errors, Field::Source, source);
    require(&mut errors, Field::Amount, amount);
    require(&mut errors, Field::Date, date);
    if !errors.is_empty() {
        return Err(errors);
    }

    let amount = parse_amount(amount).map_err(|e| errors.push(e)).ok();
    let date = parse_date(date).map_err(|e| errors.push(e)).ok();

    match (amount, date) {
        (Some(amount), Some(date)) if errors.is_empty() => Ok(NewIncome {
            source: source.trim().to_string(),
            amount,
            date,
        }),
        _ => Err(errors),
    }
}

pub fn validate_expense(category: &str, amount: &str, date: &str) -> ValidationResult<NewExpense> {
    let mut errors = Vec::new();
    require(&mut errors, Field::Category, category);
    require(&mut errors, Field::Amount, amount);
    require(&mut errors, Field::Date, date);
    if !errors.is_empty() {
        return Err(errors);
    }

    let category = category
        .parse::<ExpenseCategory>()
        .map_err(|e| errors.push(e))
        .ok();
    let amount = parse_amount(amount).map_err(|e| errors.push(e)).ok();
    let date = parse_date(date).map_err(|e| errors.push(e)).ok();

    match (category, amount, date) {
        (Some(category), Some(amount), Some(date)) if errors.is_empty() => Ok(NewExpense {
            category,
            amount,
            date,
        }),
        _ => Err(errors),
    }
}

/// Join errors into one line for a status bar or stderr
pub fn describe(errors: &[EntryError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

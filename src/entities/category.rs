// 🏷️ Expense Category - fixed list of labels an expense can be filed under
//
// The expenses table keeps the label as TEXT. Parsing goes through this enum
// so forms and the CLI can only ever write a known label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::EntryError;

// ============================================================================
// EXPENSE CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Housing,
    Utilities,
    Groceries,
    Transportation,
    Dining,
    Healthcare,
    Insurance,
    Entertainment,
    Education,
    Shopping,
    Savings,
    Other,
}

impl ExpenseCategory {
    /// Every category, in the order forms cycle through them
    pub const ALL: [ExpenseCategory; 12] = [
        ExpenseCategory::Housing,
        ExpenseCategory::Utilities,
        ExpenseCategory::Groceries,
        ExpenseCategory::Transportation,
        ExpenseCategory::Dining,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Insurance,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Education,
        ExpenseCategory::Shopping,
        ExpenseCategory::Savings,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Housing => "Housing",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Groceries => "Groceries",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::Dining => "Dining",
            ExpenseCategory::Healthcare => "Healthcare",
            ExpenseCategory::Insurance => "Insurance",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Education => "Education",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Savings => "Savings",
            ExpenseCategory::Other => "Other",
        }
    }

    /// Look up a category by its stored label (case-insensitive, trimmed)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
    }

    /// Next category in `ALL`, wrapping around
    pub fn next(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous category in `ALL`, wrapping around
    pub fn previous(&self) -> Self {
        let i = self.index();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| EntryError::UnknownCategory(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for category in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::from_label(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_from_label_ignores_case_and_whitespace() {
        assert_eq!(
            ExpenseCategory::from_label("  groceries "),
            Some(ExpenseCategory::Groceries)
        );
        assert_eq!(ExpenseCategory::from_label("DINING"), Some(ExpenseCategory::Dining));
        assert_eq!(ExpenseCategory::from_label("Grocery"), None);
    }

    #[test]
    fn test_parse_unknown_category_is_an_error() {
        let err = "Yachts".parse::<ExpenseCategory>().unwrap_err();
        assert_eq!(err, EntryError::UnknownCategory("Yachts".to_string()));
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&ExpenseCategory::Groceries).unwrap();
        assert_eq!(json, "\"Groceries\"");

        for category in ExpenseCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(serde_json::from_str::<ExpenseCategory>(&json).unwrap(), category);
        }
    }

    #[test]
    fn test_next_and_previous_wrap() {
        assert_eq!(ExpenseCategory::Other.next(), ExpenseCategory::Housing);
        assert_eq!(ExpenseCategory::Housing.previous(), ExpenseCategory::Other);
        assert_eq!(ExpenseCategory::Housing.next(), ExpenseCategory::Utilities);
    }
}

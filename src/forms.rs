// View state for the entry forms
//
// Forms own the raw text the user typed. Validation never clears it; only a
// successful save does.

use crate::entities::{ExpenseCategory, NewExpense, NewIncome};
use crate::validation::{self, EntryError, Field};

fn cycle(fields: &[Field], current: Field, forward: bool) -> Field {
    let len = fields.len();
    let i = fields.iter().position(|f| *f == current).unwrap_or(0);
    let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
    fields[next]
}

// ============================================================================
// INCOME FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeForm {
    pub source: String,
    pub amount: String,
    pub date: String,
    pub focus: Field,
    pub errors: Vec<EntryError>,
}

impl Default for IncomeForm {
    fn default() -> Self {
        IncomeForm {
            source: String::new(),
            amount: String::new(),
            date: String::new(),
            focus: Field::Source,
            errors: Vec::new(),
        }
    }
}

impl IncomeForm {
    pub const FIELDS: [Field; 3] = [Field::Source, Field::Amount, Field::Date];

    pub fn next_field(&mut self) {
        self.focus = cycle(&Self::FIELDS, self.focus, true);
    }

    pub fn previous_field(&mut self) {
        self.focus = cycle(&Self::FIELDS, self.focus, false);
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Amount => &mut self.amount,
            Field::Date => &mut self.date,
            Field::Source | Field::Category => &mut self.source,
        }
    }

    pub fn input(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Source | Field::Category => &self.source,
            Field::Amount => &self.amount,
            Field::Date => &self.date,
        }
    }

    /// Validate the typed values, recording any errors on the form
    pub fn validate(&mut self) -> Option<NewIncome> {
        match validation::validate_income(&self.source, &self.amount, &self.date) {
            Ok(entry) => {
                self.errors.clear();
                Some(entry)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    pub fn clear(&mut self) {
        *self = IncomeForm::default();
    }
}

// ============================================================================
// EXPENSE FORM
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    /// Picked from the fixed list, never typed
    pub category: ExpenseCategory,
    pub amount: String,
    pub date: String,
    pub focus: Field,
    pub errors: Vec<EntryError>,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        ExpenseForm {
            category: ExpenseCategory::ALL[0],
            amount: String::new(),
            date: String::new(),
            focus: Field::Category,
            errors: Vec::new(),
        }
    }
}

impl ExpenseForm {
    pub const FIELDS: [Field; 3] = [Field::Category, Field::Amount, Field::Date];

    pub fn next_field(&mut self) {
        self.focus = cycle(&Self::FIELDS, self.focus, true);
    }

    pub fn previous_field(&mut self) {
        self.focus = cycle(&Self::FIELDS, self.focus, false);
    }

    pub fn next_category(&mut self) {
        self.category = self.category.next();
    }

    pub fn previous_category(&mut self) {
        self.category = self.category.previous();
    }

    /// Typing on the category field is ignored
    pub fn input(&mut self, c: char) {
        match self.focus {
            Field::Amount => self.amount.push(c),
            Field::Date => self.date.push(c),
            Field::Category | Field::Source => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Field::Amount => {
                self.amount.pop();
            }
            Field::Date => {
                self.date.pop();
            }
            Field::Category | Field::Source => {}
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Category | Field::Source => self.category.as_str(),
            Field::Amount => &self.amount,
            Field::Date => &self.date,
        }
    }

    pub fn validate(&mut self) -> Option<NewExpense> {
        match validation::validate_expense(self.category.as_str(), &self.amount, &self.date) {
            Ok(entry) => {
                self.errors.clear();
                Some(entry)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn has_error(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field() == field)
    }

    /// Reset amount and date; the category stays selected for the next entry
    pub fn clear(&mut self) {
        let category = self.category;
        *self = ExpenseForm {
            category,
            ..ExpenseForm::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut IncomeForm, s: &str) {
        for c in s.chars() {
            form.input(c);
        }
    }

    #[test]
    fn test_income_form_typing_and_focus() {
        let mut form = IncomeForm::default();

        type_str(&mut form, "Paycheck");
        form.next_field();
        type_str(&mut form, "1000");
        form.next_field();
        type_str(&mut form, "01-15-2024");
        form.next_field();

        assert_eq!(form.focus, Field::Source);
        assert_eq!(form.value(Field::Source), "Paycheck");
        assert_eq!(form.value(Field::Amount), "1000");
        assert_eq!(form.value(Field::Date), "01-15-2024");

        form.previous_field();
        form.backspace();
        assert_eq!(form.date, "01-15-202");
    }

    #[test]
    fn test_invalid_income_keeps_input() {
        let mut form = IncomeForm {
            source: "Paycheck".to_string(),
            amount: "abc".to_string(),
            date: "01-15-2024".to_string(),
            ..IncomeForm::default()
        };

        assert!(form.validate().is_none());
        assert!(form.has_error(Field::Amount));
        assert!(!form.has_error(Field::Date));
        assert_eq!(form.amount, "abc");
        assert_eq!(form.source, "Paycheck");
    }

    #[test]
    fn test_valid_income_clears_errors() {
        let mut form = IncomeForm {
            source: "Paycheck".to_string(),
            amount: "1000".to_string(),
            date: "01-15-2024".to_string(),
            errors: vec![EntryError::MissingField(Field::Source)],
            ..IncomeForm::default()
        };

        let entry = form.validate().unwrap();
        assert_eq!(entry.date, "2024-01-15");
        assert!(form.errors.is_empty());
    }

    #[test]
    fn test_expense_form_category_is_not_typed() {
        let mut form = ExpenseForm::default();

        form.input('x');
        form.backspace();
        assert_eq!(form.category, ExpenseCategory::Housing);

        form.next_category();
        form.next_category();
        assert_eq!(form.category, ExpenseCategory::Groceries);
        form.previous_category();
        assert_eq!(form.category, ExpenseCategory::Utilities);
    }

    #[test]
    fn test_expense_clear_keeps_category() {
        let mut form = ExpenseForm {
            category: ExpenseCategory::Dining,
            amount: "12".to_string(),
            date: "01-02-2024".to_string(),
            focus: Field::Date,
            errors: Vec::new(),
        };

        form.clear();

        assert_eq!(form.category, ExpenseCategory::Dining);
        assert!(form.amount.is_empty());
        assert!(form.date.is_empty());
        assert_eq!(form.focus, Field::Category);
    }
}

// Application state behind the terminal UI
//
// Holds the store handle, the pages' view state and the last status message.
// Rendering lives in the binary's ui module; everything here is plain data
// plus the actions a key press can trigger.

use anyhow::Result;
use tracing::{info, warn};

use crate::db::{Store, Totals};
use crate::entities::Record;
use crate::forms::{ExpenseForm, IncomeForm};
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Income,
    Expenses,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Income, Page::Expenses];

    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Income,
            Page::Income => Page::Expenses,
            Page::Expenses => Page::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Dashboard => Page::Expenses,
            Page::Income => Page::Dashboard,
            Page::Expenses => Page::Income,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Income => "Income",
            Page::Expenses => "Expenses",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Success(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Success(s) | Status::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

pub struct App {
    store: Store,
    pub current_page: Page,
    pub income_form: IncomeForm,
    pub expense_form: ExpenseForm,
    pub totals: Totals,
    /// Recent records of both tables, newest first
    pub recent: Vec<Record>,
    pub selected: Option<usize>,
    pub recent_limit: usize,
    pub status: Option<Status>,
}

impl App {
    /// Build the app and load the dashboard once
    pub fn new(store: Store, recent_limit: usize) -> Result<Self> {
        let mut app = App {
            store,
            current_page: Page::Dashboard,
            income_form: IncomeForm::default(),
            expense_form: ExpenseForm::default(),
            totals: Totals::default(),
            recent: Vec::new(),
            selected: None,
            recent_limit,
            status: None,
        };
        app.refresh()?;
        Ok(app)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Reload totals and the recent list from the store
    pub fn refresh(&mut self) -> Result<()> {
        self.totals = self.store.totals()?;
        self.recent = self.store.recent_transactions(self.recent_limit)?.combined();

        self.selected = match self.selected {
            _ if self.recent.is_empty() => None,
            Some(i) => Some(i.min(self.recent.len() - 1)),
            None => Some(0),
        };

        Ok(())
    }

    fn refresh_or_report(&mut self) {
        if let Err(err) = self.refresh() {
            warn!(error = %err, "dashboard refresh failed");
            self.status = Some(Status::Error(format!("Could not refresh: {:#}", err)));
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.selected.and_then(|i| self.recent.get(i))
    }

    pub fn next(&mut self) {
        let len = self.recent.len();
        if len == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    pub fn previous(&mut self) {
        let len = self.recent.len();
        if len == 0 {
            return;
        }
        let i = match self.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }

    /// Validate and save the income form
    pub fn submit_income(&mut self) {
        let entry = match self.income_form.validate() {
            Some(entry) => entry,
            None => {
                self.status = Some(Status::Error(validation::describe(&self.income_form.errors)));
                return;
            }
        };

        match self.store.insert_income(&entry.source, entry.amount, &entry.date) {
            Ok(id) => {
                info!(id, "income saved from form");
                self.income_form.clear();
                self.status = Some(Status::Success(format!("Income #{} added", id)));
                self.refresh_or_report();
            }
            Err(err) => {
                warn!(error = %err, "saving income failed");
                self.status = Some(Status::Error(format!("Could not save income: {:#}", err)));
            }
        }
    }

    /// Validate and save the expense form
    pub fn submit_expense(&mut self) {
        let entry = match self.expense_form.validate() {
            Some(entry) => entry,
            None => {
                self.status = Some(Status::Error(validation::describe(&self.expense_form.errors)));
                return;
            }
        };

        match self.store.insert_expense(entry.category, entry.amount, &entry.date) {
            Ok(id) => {
                info!(id, category = %entry.category, "expense saved from form");
                self.expense_form.clear();
                self.status = Some(Status::Success(format!("Expense #{} added", id)));
                self.refresh_or_report();
            }
            Err(err) => {
                warn!(error = %err, "saving expense failed");
                self.status = Some(Status::Error(format!("Could not save expense: {:#}", err)));
            }
        }
    }

    /// Submit whichever form is on screen
    pub fn submit(&mut self) {
        match self.current_page {
            Page::Income => self.submit_income(),
            Page::Expenses => self.submit_expense(),
            Page::Dashboard => {}
        }
    }

    /// Delete the record highlighted on the dashboard
    pub fn delete_selected(&mut self) {
        let (ledger, id) = match self.selected_record() {
            Some(record) => (record.ledger(), record.id()),
            None => return,
        };

        match self.store.delete(ledger, id) {
            Ok(true) => {
                self.status = Some(Status::Success(format!("Deleted {} #{}", ledger.title(), id)));
            }
            Ok(false) => {
                self.status = Some(Status::Error(format!("{} #{} no longer exists", ledger.title(), id)));
            }
            Err(err) => {
                warn!(error = %err, "delete failed");
                self.status = Some(Status::Error(format!("Could not delete: {:#}", err)));
                return;
            }
        }

        self.refresh_or_report();
    }
}

// 📅 Date formats
//
// Entry format (forms, CLI):  MM-DD-YYYY
// Stored format (database):   YYYY-MM-DD, so ORDER BY date is chronological
//
// Older databases may still hold MM-DD-YYYY rows; see db::normalize_dates.

use chrono::NaiveDate;

pub const ENTRY_FORMAT: &str = "%m-%d-%Y";
pub const STORED_FORMAT: &str = "%Y-%m-%d";

/// Which layout a date string uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// MM-DD-YYYY
    MonthFirst,
    /// YYYY-MM-DD
    Iso,
}

/// Checks the digit/dash shape before handing off to chrono, which would
/// otherwise accept single-digit months and days.
fn layout_of(s: &str) -> Option<DateLayout> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return None;
    }

    let shape = |dashes: [usize; 2]| {
        bytes.iter().enumerate().all(|(i, b)| {
            if dashes.contains(&i) {
                *b == b'-'
            } else {
                b.is_ascii_digit()
            }
        })
    };

    if shape([2, 5]) {
        Some(DateLayout::MonthFirst)
    } else if shape([4, 7]) {
        Some(DateLayout::Iso)
    } else {
        None
    }
}

/// Strict MM-DD-YYYY parse of user input
pub fn parse_entry(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    match layout_of(s) {
        Some(DateLayout::MonthFirst) => NaiveDate::parse_from_str(s, ENTRY_FORMAT).ok(),
        _ => None,
    }
}

/// Parse a stored date in either layout
pub fn parse_stored(s: &str) -> Option<(NaiveDate, DateLayout)> {
    let s = s.trim();
    let layout = layout_of(s)?;
    let format = match layout {
        DateLayout::MonthFirst => ENTRY_FORMAT,
        DateLayout::Iso => STORED_FORMAT,
    };
    NaiveDate::parse_from_str(s, format).ok().map(|d| (d, layout))
}

pub fn to_stored(date: NaiveDate) -> String {
    date.format(STORED_FORMAT).to_string()
}

/// Render a stored date as MM-DD-YYYY; unparseable text is shown as-is
pub fn to_display(stored: &str) -> String {
    match parse_stored(stored) {
        Some((date, _)) => date.format(ENTRY_FORMAT).to_string(),
        None => stored.to_string(),
    }
}

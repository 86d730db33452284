//! Domain records for the library desk.
//!
//! All three collections are owned by [`crate::library::Library`]; these are
//! plain named-field structs with no behaviour of their own.

use chrono::NaiveDate;

/// A catalogued title. `available_copies` never exceeds `copies` and never
/// drops below zero.
#[derive(Debug, Clone)]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub copies: u32,
    pub available_copies: u32,
}

/// A registered member.
#[derive(Debug, Clone)]
pub struct Member {
    pub member_id: String,
    pub name: String,
}

/// One loan. Multiple records per (book, member) pair may exist over time;
/// the active one is the most recent with `returned == false`.
#[derive(Debug, Clone)]
pub struct BorrowRecord {
    pub book_id: String,
    pub member_id: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
}

/// Loan rules and the fixed dates stamped on new records.
#[derive(Debug, Clone)]
pub struct LoanPolicy {
    /// Maximum concurrently unreturned loans per member.
    pub loan_limit: usize,
    /// Fine per overdue day, in currency units.
    pub fine_per_day: u64,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl From<&crate::config::LibraryConfig> for LoanPolicy {
    fn from(cfg: &crate::config::LibraryConfig) -> Self {
        Self {
            loan_limit: cfg.loan_limit,
            fine_per_day: cfg.fine_per_day,
            borrow_date: cfg.borrow_date,
            due_date: cfg.due_date,
        }
    }
}

/// An active loan joined with book and member details, for display.
#[derive(Debug, Clone)]
pub struct ActiveLoan {
    pub book_id: String,
    pub title: String,
    pub member_id: String,
    pub member_name: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// One row of the overdue-fine report.
#[derive(Debug, Clone)]
pub struct FineEntry {
    pub book_id: String,
    pub title: String,
    pub member_id: String,
    pub member_name: String,
    pub overdue_days: u64,
    pub fine: u64,
}

/// One row of a member's loan history, returned loans included.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub book_id: String,
    /// `None` when the record references a book no longer in the catalog.
    pub title: Option<String>,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned: bool,
}

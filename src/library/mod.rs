//! Library desk state and operations.
//!
//! [`Library`] is the single context object holding the three collections —
//! books, members, borrow records — and every operation the console menu
//! dispatches to. Lookups are linear scans by ID, which is fine at desk
//! scale. Failed operations leave state untouched.

pub mod clock;
pub mod console;
pub mod types;

use thiserror::Error;
use tracing::debug;

use clock::Clock;
pub use types::{ActiveLoan, Book, BorrowRecord, FineEntry, HistoryEntry, LoanPolicy, Member};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LibraryError {
    #[error("book ID \"{0}\" already exists")]
    BookExists(String),
    #[error("book ID \"{0}\" does not exist")]
    BookNotFound(String),
    #[error("member ID \"{0}\" already exists")]
    MemberExists(String),
    #[error("member ID \"{0}\" does not exist")]
    MemberNotFound(String),
    #[error("no copies of \"{0}\" are currently available")]
    NoCopiesAvailable(String),
    #[error("loan limit is {0} books")]
    LoanLimitReached(usize),
    #[error("member ID \"{member_id}\" has not borrowed book ID \"{book_id}\"")]
    LoanNotFound { book_id: String, member_id: String },
}

// ── Library ───────────────────────────────────────────────────────────────────

pub struct Library {
    policy: LoanPolicy,
    books: Vec<Book>,
    members: Vec<Member>,
    records: Vec<BorrowRecord>,
}

impl Library {
    pub fn new(policy: LoanPolicy) -> Self {
        Self { policy, books: Vec::new(), members: Vec::new(), records: Vec::new() }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    // ── Books ─────────────────────────────────────────────────────────

    /// Register a new title. A duplicate ID is rejected and the original
    /// entry is retained unchanged.
    pub fn add_book(
        &mut self,
        book_id: &str,
        title: &str,
        author: &str,
        copies: u32,
    ) -> Result<(), LibraryError> {
        if self.find_book(book_id).is_some() {
            return Err(LibraryError::BookExists(book_id.to_string()));
        }
        debug!(book_id, title, copies, "book added");
        self.books.push(Book {
            book_id: book_id.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            copies,
            available_copies: copies,
        });
        Ok(())
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn find_book(&self, book_id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.book_id == book_id)
    }

    // ── Members ───────────────────────────────────────────────────────

    pub fn add_member(&mut self, member_id: &str, name: &str) -> Result<(), LibraryError> {
        if self.find_member(member_id).is_some() {
            return Err(LibraryError::MemberExists(member_id.to_string()));
        }
        debug!(member_id, name, "member added");
        self.members.push(Member {
            member_id: member_id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn find_member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.member_id == member_id)
    }

    /// Count of the member's currently unreturned loans.
    fn active_loan_count(&self, member_id: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.member_id == member_id && !r.returned)
            .count()
    }

    // ── Loans ─────────────────────────────────────────────────────────

    /// Lend a book to a member; returns the loan's due date.
    ///
    /// Checks, in order: book exists, member exists, a copy is available,
    /// the member is under the loan limit. Any failure returns before state
    /// changes. On success a record is appended with the policy dates and
    /// `available_copies` is decremented.
    pub fn borrow_book(&mut self, book_id: &str, member_id: &str) -> Result<chrono::NaiveDate, LibraryError> {
        let book_idx = self
            .books
            .iter()
            .position(|b| b.book_id == book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;
        if self.find_member(member_id).is_none() {
            return Err(LibraryError::MemberNotFound(member_id.to_string()));
        }
        if self.books[book_idx].available_copies == 0 {
            return Err(LibraryError::NoCopiesAvailable(self.books[book_idx].title.clone()));
        }
        if self.active_loan_count(member_id) >= self.policy.loan_limit {
            return Err(LibraryError::LoanLimitReached(self.policy.loan_limit));
        }

        self.books[book_idx].available_copies -= 1;
        self.records.push(BorrowRecord {
            book_id: book_id.to_string(),
            member_id: member_id.to_string(),
            borrow_date: self.policy.borrow_date,
            due_date: self.policy.due_date,
            returned: false,
        });
        debug!(book_id, member_id, "book lent");
        Ok(self.policy.due_date)
    }

    /// Active loans joined with book and member details for display.
    pub fn borrowed_books(&self) -> Vec<ActiveLoan> {
        self.records
            .iter()
            .filter(|r| !r.returned)
            .map(|r| {
                // Records only ever reference existing entries: books and
                // members are never removed and borrow_book validates both.
                let book = self.find_book(&r.book_id);
                let member = self.find_member(&r.member_id);
                ActiveLoan {
                    book_id: r.book_id.clone(),
                    title: book.map(|b| b.title.clone()).unwrap_or_else(|| "unknown".into()),
                    member_id: r.member_id.clone(),
                    member_name: member.map(|m| m.name.clone()).unwrap_or_else(|| "unknown".into()),
                    borrow_date: r.borrow_date,
                    due_date: r.due_date,
                }
            })
            .collect()
    }

    /// Return a book: flip the most recent unreturned record matching both
    /// IDs and restore one copy. Not-found leaves all state unchanged.
    pub fn return_book(&mut self, book_id: &str, member_id: &str) -> Result<String, LibraryError> {
        let record_idx = self
            .records
            .iter()
            .rposition(|r| r.book_id == book_id && r.member_id == member_id && !r.returned)
            .ok_or_else(|| LibraryError::LoanNotFound {
                book_id: book_id.to_string(),
                member_id: member_id.to_string(),
            })?;
        let book_idx = self
            .books
            .iter()
            .position(|b| b.book_id == book_id)
            .ok_or_else(|| LibraryError::BookNotFound(book_id.to_string()))?;

        self.records[record_idx].returned = true;
        let book = &mut self.books[book_idx];
        // A matched record implies a prior decrement, so this stays ≤ copies.
        book.available_copies = (book.available_copies + 1).min(book.copies);
        debug!(book_id, member_id, "book returned");
        Ok(book.title.clone())
    }

    /// Overdue fines for every active loan: days past due (never negative)
    /// times the per-day rate.
    pub fn calculate_fines(&self, clock: &dyn Clock) -> Vec<FineEntry> {
        let today = clock.today();
        self.borrowed_books()
            .into_iter()
            .map(|loan| {
                let overdue_days = (today - loan.due_date).num_days().max(0) as u64;
                FineEntry {
                    fine: overdue_days * self.policy.fine_per_day,
                    overdue_days,
                    book_id: loan.book_id,
                    title: loan.title,
                    member_id: loan.member_id,
                    member_name: loan.member_name,
                }
            })
            .collect()
    }

    /// Full loan history for one member, returned loans included.
    pub fn member_history(&self, member_id: &str) -> Result<Vec<HistoryEntry>, LibraryError> {
        if self.find_member(member_id).is_none() {
            return Err(LibraryError::MemberNotFound(member_id.to_string()));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.member_id == member_id)
            .map(|r| HistoryEntry {
                book_id: r.book_id.clone(),
                title: self.find_book(&r.book_id).map(|b| b.title.clone()),
                borrow_date: r.borrow_date,
                due_date: r.due_date,
                returned: r.returned,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::clock::FixedClock;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn library() -> Library {
        Library::new(LoanPolicy {
            loan_limit: 5,
            fine_per_day: 100,
            borrow_date: date(2024, 11, 24),
            due_date: date(2024, 12, 1),
        })
    }

    #[test]
    fn duplicate_book_id_rejected_original_retained() {
        let mut lib = library();
        lib.add_book("B1", "First", "A", 2).unwrap();
        let err = lib.add_book("B1", "Second", "B", 9).unwrap_err();
        assert_eq!(err, LibraryError::BookExists("B1".into()));
        assert_eq!(lib.books().len(), 1);
        let b = lib.find_book("B1").unwrap();
        assert_eq!(b.title, "First");
        assert_eq!(b.copies, 2);
    }

    #[test]
    fn duplicate_member_id_rejected() {
        let mut lib = library();
        lib.add_member("M1", "Aki").unwrap();
        let err = lib.add_member("M1", "Yuki").unwrap_err();
        assert_eq!(err, LibraryError::MemberExists("M1".into()));
        assert_eq!(lib.find_member("M1").unwrap().name, "Aki");
    }

    #[test]
    fn borrow_decrements_return_increments() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 2).unwrap();
        lib.add_member("M1", "Aki").unwrap();

        lib.borrow_book("B1", "M1").unwrap();
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 1);

        lib.return_book("B1", "M1").unwrap();
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 2);
    }

    #[test]
    fn available_copies_bounded() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 1).unwrap();
        lib.add_member("M1", "Aki").unwrap();
        lib.add_member("M2", "Yuki").unwrap();

        lib.borrow_book("B1", "M1").unwrap();
        // Out of stock: second member cannot take a copy.
        let err = lib.borrow_book("B1", "M2").unwrap_err();
        assert_eq!(err, LibraryError::NoCopiesAvailable("T".into()));
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 0);

        lib.return_book("B1", "M1").unwrap();
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 1);
    }

    #[test]
    fn borrow_unknown_book_or_member_fails_clean() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 1).unwrap();
        assert_eq!(
            lib.borrow_book("B9", "M1").unwrap_err(),
            LibraryError::BookNotFound("B9".into())
        );
        assert_eq!(
            lib.borrow_book("B1", "M9").unwrap_err(),
            LibraryError::MemberNotFound("M9".into())
        );
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 1);
        assert!(lib.borrowed_books().is_empty());
    }

    #[test]
    fn sixth_loan_rejected_without_state_change() {
        let mut lib = library();
        for i in 1..=6 {
            lib.add_book(&format!("B{i}"), &format!("T{i}"), "A", 1).unwrap();
        }
        lib.add_member("M1", "Aki").unwrap();

        for i in 1..=5 {
            lib.borrow_book(&format!("B{i}"), "M1").unwrap();
        }
        let err = lib.borrow_book("B6", "M1").unwrap_err();
        assert_eq!(err, LibraryError::LoanLimitReached(5));
        assert_eq!(lib.borrowed_books().len(), 5);
        assert_eq!(lib.find_book("B6").unwrap().available_copies, 1);

        // Returning one frees a slot.
        lib.return_book("B3", "M1").unwrap();
        lib.borrow_book("B6", "M1").unwrap();
        assert_eq!(lib.borrowed_books().len(), 5);
    }

    #[test]
    fn return_without_active_loan_changes_nothing() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 2).unwrap();
        lib.add_member("M1", "Aki").unwrap();

        let err = lib.return_book("B1", "M1").unwrap_err();
        assert_eq!(
            err,
            LibraryError::LoanNotFound { book_id: "B1".into(), member_id: "M1".into() }
        );
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 2);

        // Double return: second attempt finds no active record.
        lib.borrow_book("B1", "M1").unwrap();
        lib.return_book("B1", "M1").unwrap();
        assert!(lib.return_book("B1", "M1").is_err());
        assert_eq!(lib.find_book("B1").unwrap().available_copies, 2);
    }

    #[test]
    fn fines_overdue_and_never_negative() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 1).unwrap();
        lib.add_member("M1", "Aki").unwrap();
        lib.borrow_book("B1", "M1").unwrap();

        // 23 days past the 2024-12-01 due date at 100/day.
        let fines = lib.calculate_fines(&FixedClock(date(2024, 12, 24)));
        assert_eq!(fines.len(), 1);
        assert_eq!(fines[0].overdue_days, 23);
        assert_eq!(fines[0].fine, 2300);

        // Before the due date the fine clamps to zero.
        let fines = lib.calculate_fines(&FixedClock(date(2024, 11, 28)));
        assert_eq!(fines[0].fine, 0);
        assert_eq!(fines[0].overdue_days, 0);
    }

    #[test]
    fn returned_loans_carry_no_fine() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 1).unwrap();
        lib.add_member("M1", "Aki").unwrap();
        lib.borrow_book("B1", "M1").unwrap();
        lib.return_book("B1", "M1").unwrap();

        assert!(lib.calculate_fines(&FixedClock(date(2024, 12, 24))).is_empty());
    }

    #[test]
    fn history_includes_returned_loans() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 1).unwrap();
        lib.add_member("M1", "Aki").unwrap();

        lib.borrow_book("B1", "M1").unwrap();
        lib.return_book("B1", "M1").unwrap();
        lib.borrow_book("B1", "M1").unwrap();

        let history = lib.member_history("M1").unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].returned);
        assert!(!history[1].returned);
        assert_eq!(history[0].title.as_deref(), Some("T"));

        assert_eq!(
            lib.member_history("M9").unwrap_err(),
            LibraryError::MemberNotFound("M9".into())
        );
    }

    #[test]
    fn borrowed_books_joins_details() {
        let mut lib = library();
        lib.add_book("B1", "T", "A", 1).unwrap();
        lib.add_member("M1", "Aki").unwrap();
        lib.borrow_book("B1", "M1").unwrap();

        let loans = lib.borrowed_books();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].title, "T");
        assert_eq!(loans[0].member_name, "Aki");
        assert_eq!(loans[0].due_date, date(2024, 12, 1));
    }
}

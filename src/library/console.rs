//! Text menu for the library desk.
//!
//! The loop is generic over `BufRead`/`Write` so scripted input can drive it
//! in tests. Every user-facing failure — unknown ID, bad number, bad menu
//! choice — is printed here and the loop continues; nothing propagates except
//! real I/O errors on the console itself.

use std::io::{BufRead, Write};

use tracing::warn;

use super::clock::Clock;
use super::{Book, Library};

const MENU: &str = "\
Library menu:
1: Add a book
2: List books
3: Search for a book
4: Add a member
5: List members
6: Lend a book
7: List books on loan
8: Return a book
9: Calculate overdue fines
10: Show a member's loan history
11: Exit";

/// Run the menu loop until the user picks Exit or input ends.
pub fn run<R, W>(
    input: &mut R,
    out: &mut W,
    library: &mut Library,
    clock: &dyn Clock,
) -> std::io::Result<()>
where
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(out, "{MENU}")?;
        let Some(choice) = prompt(input, out, "Choose an operation (1-11): ")? else {
            break;
        };
        match choice.parse::<u32>() {
            Ok(n) if (1..=11).contains(&n) => {
                if n == 11 {
                    writeln!(out, "Exiting the library console.")?;
                    break;
                }
                dispatch(n, input, out, library, clock)?;
            }
            _ => {
                warn!(%choice, "invalid menu choice");
                writeln!(out, "Invalid choice. Enter a number from 1 to 11.")?;
            }
        }
    }
    Ok(())
}

fn dispatch<R, W>(
    choice: u32,
    input: &mut R,
    out: &mut W,
    library: &mut Library,
    clock: &dyn Clock,
) -> std::io::Result<()>
where
    R: BufRead,
    W: Write,
{
    match choice {
        1 => {
            let Some(book_id) = prompt(input, out, "Book ID: ")? else { return Ok(()) };
            let Some(title) = prompt(input, out, "Title: ")? else { return Ok(()) };
            let Some(author) = prompt(input, out, "Author: ")? else { return Ok(()) };
            let Some(copies) = prompt(input, out, "Copies: ")? else { return Ok(()) };
            let Ok(copies) = copies.parse::<u32>() else {
                writeln!(out, "Enter a number for copies.")?;
                return Ok(());
            };
            match library.add_book(&book_id, &title, &author, copies) {
                Ok(()) => writeln!(
                    out,
                    "Added book \"{title}\" (ID: {book_id}, author: {author}, copies: {copies})."
                )?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        2 => {
            if library.books().is_empty() {
                writeln!(out, "No books registered.")?;
            } else {
                writeln!(out, "--- Book list ---")?;
                for book in library.books() {
                    write_book(out, book)?;
                }
            }
        }
        3 => {
            let Some(book_id) = prompt(input, out, "Book ID to search for: ")? else {
                return Ok(());
            };
            match library.find_book(&book_id) {
                Some(book) => write_book(out, book)?,
                None => writeln!(out, "Book ID \"{book_id}\" does not exist.")?,
            }
        }
        4 => {
            let Some(member_id) = prompt(input, out, "Member ID: ")? else { return Ok(()) };
            let Some(name) = prompt(input, out, "Name: ")? else { return Ok(()) };
            match library.add_member(&member_id, &name) {
                Ok(()) => writeln!(out, "Added member \"{name}\" (ID: {member_id}).")?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        5 => {
            if library.members().is_empty() {
                writeln!(out, "No members registered.")?;
            } else {
                writeln!(out, "--- Member list ---")?;
                for m in library.members() {
                    writeln!(out, "ID: {}, name: {}", m.member_id, m.name)?;
                }
            }
        }
        6 => {
            let Some(book_id) = prompt(input, out, "Book ID to lend: ")? else { return Ok(()) };
            let Some(member_id) = prompt(input, out, "Member ID: ")? else { return Ok(()) };
            match library.borrow_book(&book_id, &member_id) {
                Ok(due) => {
                    // Both lookups succeed: borrow_book just validated them.
                    let title = library.find_book(&book_id).map(|b| b.title.as_str()).unwrap_or("unknown");
                    let name = library.find_member(&member_id).map(|m| m.name.as_str()).unwrap_or("unknown");
                    writeln!(out, "Lent \"{title}\" to member \"{name}\".")?;
                    writeln!(out, "Due date: {due}")?;
                }
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        7 => {
            let loans = library.borrowed_books();
            writeln!(out, "--- Books on loan ---")?;
            if loans.is_empty() {
                writeln!(out, "No books are currently on loan.")?;
            }
            for loan in loans {
                writeln!(
                    out,
                    "Book: {} (ID: {}), member: {} (ID: {}), borrowed: {}, due: {}",
                    loan.title, loan.book_id, loan.member_name, loan.member_id,
                    loan.borrow_date, loan.due_date
                )?;
            }
        }
        8 => {
            let Some(book_id) = prompt(input, out, "Book ID to return: ")? else { return Ok(()) };
            let Some(member_id) = prompt(input, out, "Member ID: ")? else { return Ok(()) };
            match library.return_book(&book_id, &member_id) {
                Ok(title) => writeln!(out, "\"{title}\" has been returned.")?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        9 => {
            let fines = library.calculate_fines(clock);
            writeln!(out, "--- Overdue fines ---")?;
            if fines.is_empty() {
                writeln!(out, "No books are currently on loan.")?;
            }
            for f in fines {
                writeln!(
                    out,
                    "Book: {} (ID: {}), member: {} (ID: {}), fine: {}",
                    f.title, f.book_id, f.member_name, f.member_id, f.fine
                )?;
            }
        }
        10 => {
            let Some(member_id) = prompt(input, out, "Member ID for history: ")? else {
                return Ok(());
            };
            match library.member_history(&member_id) {
                Ok(history) => {
                    // Unwrap is safe: member_history just validated the ID.
                    let name = library.find_member(&member_id).map(|m| m.name.as_str()).unwrap_or("unknown");
                    writeln!(out, "--- Loan history for \"{name}\" (ID: {member_id}) ---")?;
                    if history.is_empty() {
                        writeln!(out, "No loan history for this member.")?;
                    }
                    for h in history {
                        let status = if h.returned { "returned" } else { "on loan" };
                        writeln!(
                            out,
                            "Book: {} (ID: {}), borrowed: {}, due: {}, status: {}",
                            h.title.as_deref().unwrap_or("unknown"),
                            h.book_id, h.borrow_date, h.due_date, status
                        )?;
                    }
                }
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        _ => unreachable!("run() validates the range"),
    }
    Ok(())
}

fn write_book<W: Write>(out: &mut W, book: &Book) -> std::io::Result<()> {
    writeln!(
        out,
        "ID: {}, title: {}, author: {}, copies: {}, available: {}",
        book.book_id, book.title, book.author, book.copies, book.available_copies
    )
}

/// Print a prompt and read one trimmed line. `None` means end of input.
fn prompt<R, W>(input: &mut R, out: &mut W, msg: &str) -> std::io::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(out, "{msg}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

//! bunko-library — library desk console entry point.
//!
//! All state is in memory and lost on exit. The menu loop itself never
//! fails on user input; only console I/O errors or bad config reach `run`'s
//! error path.

use std::io;

use tracing::info;

use bunko::config;
use bunko::error::AppError;
use bunko::library::clock::FixedClock;
use bunko::library::{console, Library, LoanPolicy};
use bunko::logger;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    info!(
        loan_limit = config.library.loan_limit,
        fine_per_day = config.library.fine_per_day,
        today = %config.library.today,
        "library desk starting"
    );

    let mut library = Library::new(LoanPolicy::from(&config.library));
    let clock = FixedClock(config.library.today);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    console::run(&mut input, &mut out, &mut library, &clock)?;

    Ok(())
}

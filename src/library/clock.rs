//! Injectable clock for fine calculation.
//!
//! The desk runs against a configured fixed date rather than the wall clock,
//! so fine reports are reproducible. Anything needing "today" takes a
//! `&dyn Clock`; swapping in a real-time implementation is a one-liner for
//! callers that want it.

use chrono::NaiveDate;

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// A clock pinned to one date, taken from `[library] today` in config.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_its_date() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 24).unwrap();
        assert_eq!(FixedClock(d).today(), d);
    }
}

//! Loan records and the calendar-date newtype they are keyed on
use crate::error::LendError;
use chrono::{Datelike, NaiveDate, Utc};
use std::fmt;

/// A calendar date without a time component.
///
/// Loans only care about days, not instants, so this wraps [`NaiveDate`] and
/// encodes as the number of days since the Common Era - the same integer
/// trick used for instant timestamps elsewhere in the ecosystem, just at day
/// granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    /// Today's date in UTC.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid calendar date")
            .into()
    }

    pub fn plus_days(self, days: i64) -> Self {
        Self(self.0 + chrono::Duration::days(days))
    }

    pub fn to_naive_date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Day {
    fn from(value: NaiveDate) -> Self {
        Day(value)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<C> minicbor::Encode<C> for Day {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.i32(self.0.num_days_from_ce())?.ok()
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Day {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let days = d.i32()?;

        NaiveDate::from_num_days_from_ce_opt(days)
            .map(Day)
            .ok_or(minicbor::decode::Error::message(
                "day count is outside the representable calendar range",
            ))
    }
}

/// A single borrow transaction, open or closed.
///
/// Loans reference their book and patron by id rather than holding the
/// entities themselves; every mutation resolves the live instance through
/// the owning aggregate. Records are permanent history and are never removed
/// from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Loan {
    #[n(0)]
    id: u64,
    #[n(1)]
    isbn: String,
    #[n(2)]
    patron_id: String,
    #[n(3)]
    start_date: Day,
    #[n(4)]
    due_date: Day,
    #[n(5)]
    returned_on: Option<Day>,
    #[n(6)]
    overdue: bool,
}

impl Loan {
    pub(crate) fn new(id: u64, isbn: String, patron_id: String, start_date: Day, due_date: Day) -> Self {
        Self {
            id,
            isbn,
            patron_id,
            start_date,
            due_date,
            returned_on: None,
            overdue: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn patron_id(&self) -> &str {
        &self.patron_id
    }

    pub fn start_date(&self) -> Day {
        self.start_date
    }

    pub fn due_date(&self) -> Day {
        self.due_date
    }

    pub fn returned_on(&self) -> Option<Day> {
        self.returned_on
    }

    /// An open loan has no actual return date yet.
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    /// Whether the overdue condition has been observed at least once.
    pub fn overdue_flagged(&self) -> bool {
        self.overdue
    }

    /// Closes the loan. Closing is a one-way transition: a second close
    /// fails, as does a return date before the loan even started. On a late
    /// return the overdue flag is latched.
    pub(crate) fn close(&mut self, returned_on: Day) -> Result<(), LendError> {
        if self.returned_on.is_some() {
            return Err(LendError::AlreadyClosed(self.id));
        }
        if returned_on < self.start_date {
            return Err(LendError::ReturnBeforeStart {
                start: self.start_date,
                returned: returned_on,
            });
        }

        self.returned_on = Some(returned_on);
        if returned_on > self.due_date {
            self.overdue = true;
        }

        Ok(())
    }

    /// Overdue status as derived at query time.
    ///
    /// A closed loan compares its actual return date to the due date and the
    /// answer never changes afterwards; an open loan compares the supplied
    /// reference day instead.
    pub fn is_overdue_as_of(&self, today: Day) -> bool {
        match self.returned_on {
            Some(returned) => returned > self.due_date,
            None => today > self.due_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_encoding() {
        let original = Day::from_ymd(2024, 2, 29);

        let encoding = minicbor::to_vec(original).unwrap();
        let decoded: Day = minicbor::decode(&encoding).unwrap();

        assert_eq!(original, decoded);
    }

    #[test]
    fn day_arithmetic_and_ordering() {
        let day = Day::from_ymd(2024, 12, 30);
        assert_eq!(day.plus_days(2), Day::from_ymd(2025, 1, 1));
        assert!(day < day.plus_days(1));
    }

    #[test]
    fn close_is_one_way() {
        let start = Day::from_ymd(2025, 3, 1);
        let mut loan = Loan::new(1, "978-0134685991".into(), "0512108907".into(), start, start.plus_days(14));

        loan.close(start.plus_days(7)).unwrap();
        assert!(!loan.is_open());
        assert!(!loan.overdue_flagged());

        let second = loan.close(start.plus_days(8));
        assert_eq!(second, Err(LendError::AlreadyClosed(1)));
    }

    #[test]
    fn close_rejects_return_before_start() {
        let start = Day::from_ymd(2025, 3, 10);
        let mut loan = Loan::new(2, "978-0134685991".into(), "0512108907".into(), start, start.plus_days(14));

        let res = loan.close(start.plus_days(-1));
        assert!(matches!(res, Err(LendError::ReturnBeforeStart { .. })));
        assert!(loan.is_open());
    }

    #[test]
    fn overdue_latches_on_late_close() {
        let start = Day::from_ymd(2025, 3, 1);
        let due = start.plus_days(14);
        let mut loan = Loan::new(3, "978-0134685991".into(), "0512108907".into(), start, due);

        // open loan: derived against the reference day
        assert!(!loan.is_overdue_as_of(due));
        assert!(loan.is_overdue_as_of(due.plus_days(1)));

        loan.close(due.plus_days(3)).unwrap();
        assert!(loan.overdue_flagged());
        // closed loan: the answer no longer depends on "today"
        assert!(loan.is_overdue_as_of(start));
    }

    #[test]
    fn on_time_close_is_not_overdue() {
        let start = Day::from_ymd(2025, 3, 1);
        let due = start.plus_days(14);
        let mut loan = Loan::new(4, "978-0134685991".into(), "0512108907".into(), start, due);

        loan.close(due).unwrap();
        assert!(!loan.overdue_flagged());
        assert!(!loan.is_overdue_as_of(due.plus_days(30)));
    }
}

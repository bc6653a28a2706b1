use std::fmt;

use time::{Date, Month};

use super::DomainError;

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: u8) -> Result<Self, DomainError> {
        let month = Month::try_from(month).map_err(|_| DomainError::InvalidMonth(month))?;
        Ok(Self { year, month })
    }

    pub fn of_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn month_number(self) -> u8 {
        u8::from(self.month)
    }

    pub fn first_day(self) -> Result<Date, DomainError> {
        Date::from_calendar_date(self.year, self.month, 1)
            .map_err(|e| DomainError::InvalidDate(e.to_string()))
    }

    /// The following month; December rolls over to January of the next year.
    pub fn next(self) -> Self {
        match self.month {
            Month::December => Self {
                year: self.year + 1,
                month: Month::January,
            },
            m => Self {
                year: self.year,
                month: m.next(),
            },
        }
    }

    /// Number of days from the first of this month to the first of the next.
    pub fn days_in_month(self) -> Result<u32, DomainError> {
        let span = self.next().first_day()? - self.first_day()?;
        Ok(span.whole_days() as u32)
    }
}

impl Ord for YearMonth {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.year, self.month_number()).cmp(&(other.year, other.month_number()))
    }
}

impl PartialOrd for YearMonth {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month_number())
    }
}

/// Convenience wrapper over [`YearMonth::days_in_month`].
pub fn days_in_month(year: i32, month: u8) -> Result<u32, DomainError> {
    YearMonth::new(year, month)?.days_in_month()
}

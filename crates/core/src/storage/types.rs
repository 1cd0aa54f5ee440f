use chrono::{Datelike, NaiveDate};

/// A date window with optional inclusive bounds.
///
/// A missing bound leaves that side open. A window whose start lies after its
/// end is *vacuous*: it contains no dates, and every query over it yields an
/// empty result rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// The unbounded range covering all history.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a range between two inclusive bounds.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// Everything from `start` onwards.
    pub fn since(start: NaiveDate) -> Self {
        Self::new(Some(start), None)
    }

    /// The 1st of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self::between(first_day_of_month(today), today)
    }

    /// Returns true when no date can satisfy both bounds.
    pub fn is_vacuous(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    /// Returns true if `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Returns the first day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

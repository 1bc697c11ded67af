use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Calendar month bucket used for commission attribution and history
/// indexing.
///
/// Replaces the string keys of a document store with a value type that has
/// structural equality and a total order, so month arithmetic cannot go
/// through string formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl Month {
    /// Panics if `month` is outside 1..=12. Month buckets come from dates or
    /// report parameters, so an out-of-range value is a caller bug, not an
    /// input error to soften.
    pub fn new(year: i32, month: u32) -> Self {
        assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self::from_date(instant.date_naive())
    }

    /// The immediately following calendar month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> NaiveDate {
        // Month is validated at construction; only a year past chrono's
        // representable range can fail here.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Number of calendar days in this month.
    pub fn days(self) -> u32 {
        let next = self.next();
        next.first_day()
            .signed_duration_since(self.first_day())
            .num_days() as u32
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::from_date(date) == self
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;

/// Window used when the viewer picks "all time".
pub const ALL_TIME_WINDOW_DAYS: u32 = 90;
/// Longest range, in days, a request may ask for.
pub const MAX_WINDOW_DAYS: u32 = 3660;

const MIN_YEAR: i32 = 0;
const MAX_YEAR: i32 = 9999;

/// A year/month/day triple with no clock or timezone attached.
///
/// The month is kept zero-based so that borrowing and carrying across month
/// boundaries index straight into the month-length table. Everything that
/// leaves this type (parsing, display, serde) uses canonical `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate {
    year: i32,
    month0: u8,
    day: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDateError {
    #[error("expected YYYY-MM-DD, got {0:?}")]
    Format(String),
    #[error("{0:?} is not a calendar date")]
    OutOfRange(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid {field} date: {source}")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: ParseDateError,
    },
    #[error("range start {start} is after end {end}")]
    Reversed {
        start: CalendarDate,
        end: CalendarDate,
    },
    #[error("days must be a positive number or 'all', got {0:?}")]
    InvalidSelection(String),
    #[error("range of {days} days exceeds the {max} day limit")]
    TooLong { days: u32, max: u32 },
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month0: u8) -> u32 {
    const LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month0 == 1 && is_leap_year(year) {
        29
    } else {
        LENGTHS[usize::from(month0 % 12)]
    }
}

impl CalendarDate {
    pub const MIN: CalendarDate = CalendarDate { year: MIN_YEAR, month0: 0, day: 1 };
    pub const MAX: CalendarDate = CalendarDate { year: MAX_YEAR, month0: 11, day: 31 };

    /// Builds a date from a one-based month, rejecting days the month does not
    /// have and years that do not fit in four digits.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        let month0 = (month - 1) as u8;
        if day == 0 || day > days_in_month(year, month0) {
            return None;
        }
        Some(Self {
            year,
            month0,
            day: day as u8,
        })
    }

    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        Self::from_ymd(date.year(), date.month(), date.day())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// One-based month.
    pub fn month(&self) -> u32 {
        u32::from(self.month0) + 1
    }

    pub fn month0(&self) -> u32 {
        u32::from(self.month0)
    }

    pub fn day(&self) -> u32 {
        u32::from(self.day)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month0)
    }

    pub fn pred(self) -> Option<Self> {
        self.checked_sub_days(1)
    }

    pub fn succ(self) -> Option<Self> {
        self.checked_add_days(1)
    }

    /// Steps back `days` calendar days, borrowing whole months from the
    /// previous month (and year) whenever the day of month would reach zero.
    /// `None` once the result would fall before year 0.
    pub fn checked_sub_days(self, days: u32) -> Option<Self> {
        let mut year = self.year;
        let mut month0 = self.month0;
        let mut day = u32::from(self.day);
        let mut remaining = days;

        while remaining >= day {
            remaining -= day;
            if month0 == 0 {
                month0 = 11;
                year -= 1;
                if year < MIN_YEAR {
                    return None;
                }
            } else {
                month0 -= 1;
            }
            day = days_in_month(year, month0);
        }

        Some(Self {
            year,
            month0,
            day: (day - remaining) as u8,
        })
    }

    /// `None` once the result would pass 9999-12-31.
    pub fn checked_add_days(self, days: u32) -> Option<Self> {
        let mut year = self.year;
        let mut month0 = self.month0;
        let mut day = u32::from(self.day);
        let mut remaining = days;

        loop {
            let left_in_month = days_in_month(year, month0) - day;
            if remaining <= left_in_month {
                day += remaining;
                break;
            }
            remaining -= left_in_month + 1;
            day = 1;
            if month0 == 11 {
                month0 = 0;
                year += 1;
                if year > MAX_YEAR {
                    return None;
                }
            } else {
                month0 += 1;
            }
        }

        Some(Self {
            year,
            month0,
            day: day as u8,
        })
    }

    /// Days since 1970-01-01 (negative before it).
    pub fn day_number(&self) -> i64 {
        let month = i64::from(self.month());
        let year = i64::from(self.year) - i64::from(month <= 2);
        let era = (if year >= 0 { year } else { year - 399 }) / 400;
        let year_of_era = year - era * 400;
        let shifted_month = (month + 9) % 12;
        let day_of_year = (153 * shifted_month + 2) / 5 + i64::from(self.day) - 1;
        let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
        era * 146_097 + day_of_era - 719_468
    }

    pub fn days_until(&self, other: &CalendarDate) -> i64 {
        other.day_number() - self.day_number()
    }

    /// The instant at 12:00 UTC on this date. Any display offset within
    /// ±12h still lands on the same calendar day.
    pub fn noon_utc(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year, self.month(), self.day())?
            .and_hms_opt(12, 0, 0)
            .map(|noon| noon.and_utc())
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month0, self.day).cmp(&(other.year, other.month0, other.day))
    }
}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month(), self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format_err = || ParseDateError::Format(s.to_string());
        let mut parts = s.split('-');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format_err());
        };

        let all_digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !all_digits(year, 4) || !all_digits(month, 2) || !all_digits(day, 2) {
            return Err(format_err());
        }

        let year: i32 = year.parse().map_err(|_| format_err())?;
        let month: u32 = month.parse().map_err(|_| format_err())?;
        let day: u32 = day.parse().map_err(|_| format_err())?;

        Self::from_ymd(year, month, day).ok_or_else(|| ParseDateError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = ParseDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

/// Inclusive `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn len_days(&self) -> u32 {
        (self.start.days_until(&self.end) + 1) as u32
    }

    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.start <= *date && *date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = CalendarDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |date| {
            if *date < end { date.succ() } else { None }
        })
    }
}

/// Trailing window of `window_days` dates ending on (and including) `today`.
///
/// The window is clamped to `1..=MAX_WINDOW_DAYS`, and the start never moves
/// before `CalendarDate::MIN`. Callers are expected to pass a positive size.
pub fn resolve_range(window_days: u32, today: CalendarDate) -> DateRange {
    let back = window_days.clamp(1, MAX_WINDOW_DAYS) - 1;
    DateRange {
        start: today.checked_sub_days(back).unwrap_or(CalendarDate::MIN),
        end: today,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    Days(u32),
    AllTime,
}

impl RangeSelection {
    pub fn window_days(self) -> u32 {
        match self {
            RangeSelection::Days(days) => days,
            RangeSelection::AllTime => ALL_TIME_WINDOW_DAYS,
        }
    }
}

impl Default for RangeSelection {
    fn default() -> Self {
        RangeSelection::Days(30)
    }
}

impl FromStr for RangeSelection {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(RangeSelection::AllTime);
        }
        match value.parse::<u32>() {
            Ok(days) if days > MAX_WINDOW_DAYS => Err(RangeError::TooLong {
                days,
                max: MAX_WINDOW_DAYS,
            }),
            Ok(days) if days > 0 => Ok(RangeSelection::Days(days)),
            _ => Err(RangeError::InvalidSelection(s.to_string())),
        }
    }
}

/// Resolves the range a dashboard request asks for.
///
/// When both custom bounds are present they replace the computed window
/// outright, up to `MAX_WINDOW_DAYS` long. A single custom bound on its own is
/// ignored.
pub fn resolve_selection(
    selection: RangeSelection,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
    today: CalendarDate,
) -> Result<DateRange, RangeError> {
    match (custom_start, custom_end) {
        (Some(start), Some(end)) => {
            let start = start
                .parse()
                .map_err(|source| RangeError::InvalidDate { field: "start", source })?;
            let end = end
                .parse()
                .map_err(|source| RangeError::InvalidDate { field: "end", source })?;
            let range = DateRange::new(start, end)?;
            if range.len_days() > MAX_WINDOW_DAYS {
                return Err(RangeError::TooLong {
                    days: range.len_days(),
                    max: MAX_WINDOW_DAYS,
                });
            }
            Ok(range)
        }
        _ => Ok(resolve_range(selection.window_days(), today)),
    }
}

/// The viewer-local calendar date, read from the clock on every call.
pub fn local_today() -> CalendarDate {
    // Clock years past 9999 pin to the last representable date.
    CalendarDate::from_naive(Local::now().date_naive()).unwrap_or(CalendarDate::MAX)
}

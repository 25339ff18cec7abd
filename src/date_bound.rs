//! Calendar arithmetic for range bounds and feed dates.
//!
//! All dates are reduced to integer milliseconds since the Unix epoch at
//! midnight UTC, so range checks are plain integer comparisons. Out-of-range
//! parts carry over instead of being rejected: day 30 of February is the
//! 1st or 2nd of March, month 13 is January of the next year.

use chrono::{Datelike, NaiveDate, TimeDelta};

/// Milliseconds since the Unix epoch
pub type EpochMillis = i64;

/// Build a midnight-UTC timestamp from numeric year/month/day parts.
///
/// Months outside 1-12 carry into the year and days outside the month carry
/// into neighbouring months. Returns `None` only when the result cannot be
/// represented.
pub fn utc_midnight(year: i64, month: i64, day: i64) -> Option<EpochMillis> {
    let months = year.checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let y = i32::try_from(months.div_euclid(12)).ok()?;
    let m = u32::try_from(months.rem_euclid(12) + 1).ok()?;

    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    let date = first.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Three independently selected date parts.
///
/// A bound exists only when all three are present. No check is made that the
/// day fits the month, and nothing relates a start bound to an end bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub year: Option<i32>,
}

impl DateParts {
    pub fn new(month: Option<u32>, day: Option<u32>, year: Option<i32>) -> Self {
        Self { month, day, year }
    }

    /// All three parts taken from a real calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: Some(date.month()),
            day: Some(date.day()),
            year: Some(date.year()),
        }
    }

    /// Midnight UTC of the selected date, or `None` (unrestricted) if any part
    /// is unselected.
    pub fn bound(&self) -> Option<EpochMillis> {
        let (month, day, year) = (self.month?, self.day?, self.year?);
        utc_midnight(i64::from(year), i64::from(month), i64::from(day))
    }
}

/// The date of a feed record, as far as it could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedDate {
    /// No date string at all (absent or empty)
    Missing,
    /// A date string that did not split into three integers
    Unparsed,
    At(EpochMillis),
}

impl FeedDate {
    /// Read a `YYYY-MM-DD` string. Parts are split on `-` and parsed as
    /// integers, an empty part reading as 0; anything past the third part is
    /// ignored.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return FeedDate::Missing;
        }

        let mut parts = raw.split('-').map(|p| match p.trim() {
            "" => Some(0),
            p => p.parse::<i64>().ok(),
        });
        let (Some(Some(y)), Some(Some(m)), Some(Some(d))) = (parts.next(), parts.next(), parts.next())
        else {
            return FeedDate::Unparsed;
        };

        match utc_midnight(y, m, d) {
            Some(ms) => FeedDate::At(ms),
            None => FeedDate::Unparsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(y: i32, m: u32, d: u32) -> EpochMillis {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_epoch() {
        assert_eq!(utc_midnight(1970, 1, 1), Some(0));
        assert_eq!(utc_midnight(1970, 1, 2), Some(86_400_000));
    }

    #[test]
    fn test_day_rollover() {
        // 2021 is not a leap year: Feb 30 -> Mar 2
        assert_eq!(utc_midnight(2021, 2, 30), Some(ms(2021, 3, 2)));
        // 2020 is: Feb 30 -> Mar 1
        assert_eq!(utc_midnight(2020, 2, 30), Some(ms(2020, 3, 1)));
        assert_eq!(utc_midnight(2020, 4, 31), Some(ms(2020, 5, 1)));
        assert_eq!(utc_midnight(2020, 3, 0), Some(ms(2020, 2, 29)));
    }

    #[test]
    fn test_month_rollover() {
        assert_eq!(utc_midnight(2020, 13, 1), Some(ms(2021, 1, 1)));
        assert_eq!(utc_midnight(2020, 0, 1), Some(ms(2019, 12, 1)));
    }

    #[test]
    fn test_unrepresentable() {
        assert_eq!(utc_midnight(i64::MAX, 1, 1), None);
        assert_eq!(utc_midnight(2020, 1, i64::MAX), None);
    }

    #[test]
    fn test_bound_requires_all_parts() {
        assert_eq!(DateParts::new(None, Some(1), Some(2020)).bound(), None);
        assert_eq!(DateParts::new(Some(6), None, Some(2020)).bound(), None);
        assert_eq!(DateParts::new(Some(6), Some(1), None).bound(), None);
        assert_eq!(DateParts::default().bound(), None);
        assert_eq!(
            DateParts::new(Some(6), Some(1), Some(2020)).bound(),
            Some(ms(2020, 6, 1))
        );
    }

    #[test]
    fn test_bound_accepts_impossible_day() {
        let parts = DateParts::new(Some(2), Some(31), Some(2023));
        assert_eq!(parts.bound(), Some(ms(2023, 3, 3)));
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(1995, 6, 16).unwrap();
        let parts = DateParts::from_date(date);
        assert_eq!(parts, DateParts::new(Some(6), Some(16), Some(1995)));
        assert_eq!(parts.bound(), Some(ms(1995, 6, 16)));
    }

    #[test]
    fn test_feed_date_parse() {
        assert_eq!(FeedDate::parse("2020-06-01"), FeedDate::At(ms(2020, 6, 1)));
        assert_eq!(FeedDate::parse("2020-6-1"), FeedDate::At(ms(2020, 6, 1)));
        assert_eq!(FeedDate::parse(""), FeedDate::Missing);
        assert_eq!(FeedDate::parse("2020-06"), FeedDate::Unparsed);
        assert_eq!(FeedDate::parse("June 1st"), FeedDate::Unparsed);
        assert_eq!(FeedDate::parse("2020-xx-01"), FeedDate::Unparsed);
    }

    #[test]
    fn test_feed_date_empty_part_is_zero() {
        // Month 0 is December of the year before
        assert_eq!(FeedDate::parse("2020--01"), FeedDate::At(ms(2019, 12, 1)));
        assert_eq!(FeedDate::parse("2020-06- "), FeedDate::At(ms(2020, 5, 31)));
    }
}

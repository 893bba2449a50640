use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// Wall-clock instant plus an IANA timezone, as `spec.md` §3 requires.
/// `instant` is always UTC; `tz` records the zone the value was expressed
/// in and is used when rendering or when offsetting by a calendar unit
/// (month/year arithmetic is timezone-local, not a fixed duration).
#[derive(Debug, Clone, Copy)]
pub struct DateValue {
    pub instant: DateTime<Utc>,
    pub tz: Tz,
}

impl DateValue {
    pub fn new(instant: DateTime<Utc>, tz: Tz) -> Self {
        DateValue { instant, tz }
    }

    pub fn now(tz: Tz) -> Self {
        DateValue { instant: Utc::now(), tz }
    }

    pub fn local(&self) -> DateTime<Tz> {
        self.instant.with_timezone(&self.tz)
    }

    /// Offset this date by a [`DateDistance`], honoring calendar (month,
    /// year) vs. fixed-duration (day, hour, minute, second) semantics and
    /// correctly crossing year boundaries, e.g. `2025-12-30 + 5d ->
    /// 2026-01-04`.
    pub fn add(&self, distance: DateDistance) -> DateValue {
        let local = self.local();
        let shifted = match distance.unit {
            DateUnit::Years => shift_months(local.date_naive(), distance.amount * 12)
                .and_time(local.time()),
            DateUnit::Months => {
                shift_months(local.date_naive(), distance.amount).and_time(local.time())
            }
            DateUnit::Days => {
                return DateValue {
                    instant: (local + Duration::days(distance.amount)).with_timezone(&Utc),
                    tz: self.tz,
                }
            }
            DateUnit::Hours => {
                return DateValue {
                    instant: (local + Duration::hours(distance.amount)).with_timezone(&Utc),
                    tz: self.tz,
                }
            }
            DateUnit::Minutes => {
                return DateValue {
                    instant: (local + Duration::minutes(distance.amount))
                        .with_timezone(&Utc),
                    tz: self.tz,
                }
            }
            DateUnit::Seconds => {
                return DateValue {
                    instant: (local + Duration::seconds(distance.amount))
                        .with_timezone(&Utc),
                    tz: self.tz,
                }
            }
        };
        let shifted = self
            .tz
            .from_local_datetime(&shifted)
            .single()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&shifted));
        DateValue { instant: shifted.with_timezone(&Utc), tz: self.tz }
    }
}

fn shift_months(date: NaiveDate, months: i64) -> NaiveDate {
    let total = date.year() as i64 * 12 + (date.month() as i64 - 1) + months;
    let year = total.div_euclid(12) as i32;
    let month = total.rem_euclid(12) as u32 + 1;
    let last_day = last_day_of_month(year, month);
    let day = date.day().min(last_day);
    NaiveDate::from_ymd_opt(year, month, day).expect("computed calendar date is valid")
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

impl PartialEq for DateValue {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local().to_rfc3339())
    }
}

/// An inclusive-or-exclusive span of time, per `spec.md`'s `contains` /
/// `containsExclusive` boundary behaviors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    pub start: DateValue,
    pub end: DateValue,
}

impl DateRange {
    pub fn new(start: DateValue, end: DateValue) -> Self {
        DateRange { start, end }
    }

    /// Inclusive containment on both ends.
    pub fn contains(&self, point: &DateValue) -> bool {
        self.start.instant <= point.instant && point.instant <= self.end.instant
    }

    /// Exclusive containment on the end boundary, matching half-open range
    /// semantics (`[start, end)`).
    pub fn contains_exclusive(&self, point: &DateValue) -> bool {
        self.start.instant <= point.instant && point.instant < self.end.instant
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The unit of a [`DateDistance`]. `spec.md` §9 fixes the two ambiguous
/// single-letter forms from the original source: `m` always means minutes,
/// `mo` always means months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl FromStr for DateUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "y" | "yr" | "year" | "years" => Ok(DateUnit::Years),
            "mo" | "month" | "months" => Ok(DateUnit::Months),
            "d" | "day" | "days" => Ok(DateUnit::Days),
            "h" | "hr" | "hour" | "hours" => Ok(DateUnit::Hours),
            "m" | "min" | "minute" | "minutes" => Ok(DateUnit::Minutes),
            "s" | "sec" | "second" | "seconds" => Ok(DateUnit::Seconds),
            other => Err(format!("unknown date unit `{other}`")),
        }
    }
}

/// A signed calendar/duration offset, e.g. `5d`, `-2mo`, `90s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateDistance {
    pub amount: i64,
    pub unit: DateUnit,
}

impl DateDistance {
    pub fn new(amount: i64, unit: DateUnit) -> Self {
        DateDistance { amount, unit }
    }

    /// Parse `spec.md`'s compact distance encoding, e.g. `"5d"`, `"-3mo"`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let split = s.find(|c: char| c.is_ascii_alphabetic()).ok_or_else(|| {
            format!("date distance `{s}` has no unit suffix")
        })?;
        let (amount, unit) = s.split_at(split);
        let amount: i64 =
            amount.parse().map_err(|_| format!("invalid date distance amount `{amount}`"))?;
        Ok(DateDistance { amount, unit: DateUnit::from_str(unit)? })
    }
}

impl fmt::Display for DateDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            DateUnit::Years => "y",
            DateUnit::Months => "mo",
            DateUnit::Days => "d",
            DateUnit::Hours => "h",
            DateUnit::Minutes => "m",
            DateUnit::Seconds => "s",
        };
        write!(f, "{}{}", self.amount, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_unit_parses_as_months_not_minutes() {
        assert_eq!(DateUnit::from_str("mo").unwrap(), DateUnit::Months);
        assert_eq!(DateUnit::from_str("m").unwrap(), DateUnit::Minutes);
    }

    #[test]
    fn day_offset_crosses_year_boundary() {
        let start = DateValue::new(
            Utc.with_ymd_and_hms(2025, 12, 30, 0, 0, 0).unwrap(),
            Tz::UTC,
        );
        let shifted = start.add(DateDistance::new(5, DateUnit::Days));
        assert_eq!(shifted.local().date_naive(), NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
    }

    #[test]
    fn range_contains_is_inclusive_both_ends_exclusive_is_not() {
        let start = DateValue::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(), Tz::UTC);
        let end = DateValue::new(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(), Tz::UTC);
        let range = DateRange::new(start, end);
        assert!(range.contains(&end));
        assert!(!range.contains_exclusive(&end));
    }
}

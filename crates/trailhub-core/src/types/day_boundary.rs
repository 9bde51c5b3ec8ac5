//! Time zone used to cut history into calendar days.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

/// Where one calendar day ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    /// The process's local wall clock.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

/// Returned when a day boundary string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid day boundary '{0}'")]
pub struct ParseDayBoundaryError(pub String);

impl DayBoundary {
    /// Wall-clock date and time of `at` in this zone.
    pub fn local_datetime(&self, at: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Local => at.with_timezone(&Local).naive_local(),
            Self::Utc => at.naive_utc(),
            Self::Fixed(offset) => at.with_timezone(offset).naive_local(),
        }
    }

    /// Calendar date of `at` in this zone.
    pub fn date_of(&self, at: &DateTime<Utc>) -> NaiveDate {
        self.local_datetime(at).date()
    }

    /// The instant at which `date` begins in this zone, or `None` when that
    /// instant falls outside the representable range.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self {
            Self::Utc => Some(midnight.and_utc()),
            Self::Fixed(offset) => midnight
                .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
                .map(|t| t.and_utc()),
            // Midnight can fall in a DST gap; the day then starts an hour later.
            Self::Local => Some(
                Local
                    .from_local_datetime(&midnight)
                    .earliest()
                    .or_else(|| {
                        midnight
                            .checked_add_signed(Duration::hours(1))
                            .and_then(|later| Local.from_local_datetime(&later).earliest())
                    })
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_else(|| midnight.and_utc()),
            ),
        }
    }

    /// The instant at which the day after `date` begins in this zone.
    pub fn end_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        date.succ_opt().and_then(|next| self.start_of_day(next))
    }
}

impl FromStr for DayBoundary {
    type Err = ParseDayBoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(Self::Local),
            "utc" | "z" | "gmt" => return Ok(Self::Utc),
            _ => {}
        }

        let err = || ParseDayBoundaryError(s.to_string());
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return Err(err()),
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let (hours, minutes) = match digits.len() {
            1 | 2 => (digits.as_str(), "0"),
            3 => (&digits[..1], &digits[1..]),
            4 => (&digits[..2], &digits[2..]),
            _ => return Err(err()),
        };
        let hours: i32 = hours.parse().map_err(|_| err())?;
        let minutes: i32 = minutes.parse().map_err(|_| err())?;
        if hours > 23 || minutes > 59 {
            return Err(err());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Fixed)
            .ok_or_else(err)
    }
}

impl fmt::Display for DayBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Utc => write!(f, "utc"),
            Self::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

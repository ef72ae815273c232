//! Wall-clock shift ranges.
//!
//! A [`TimeRange`] is a start/end pair of minute-resolution clock times on a
//! single zone-less calendar date. Ranges are half-open: a shift ending at
//! `12:00` does not collide with one starting at `12:00`.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTimeRange")]
pub struct TimeRange {
    date: NaiveDate,
    #[serde(with = "hhmm")]
    start_time: NaiveTime,
    #[serde(with = "hhmm")]
    end_time: NaiveTime,
}

impl TimeRange {
    /// Builds a range from already-typed values, enforcing `start < end`.
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        Self::check_order(start, end)?;
        Ok(Self {
            date,
            start_time: start,
            end_time: end,
        })
    }

    /// Strict `start < end`; equal values are rejected too.
    pub fn check_order(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
        if start >= end {
            return Err(ValidationError::InvertedRange {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }
        Ok(())
    }

    /// Parses `YYYY-MM-DD`, `HH:MM`, `HH:MM`.
    ///
    /// The date is checked first, then both clock values, then ordering.
    pub fn parse(date: &str, start: &str, end: &str) -> Result<Self, ValidationError> {
        let date = parse_date(date)?;
        let start = parse_clock(start)?;
        let end = parse_clock(end)?;
        Self::new(date, start, end)
    }

    /// Same calendar date, new clock values.
    pub fn with_times(&self, start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(self.date, parse_clock(start)?, parse_clock(end)?)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end(&self) -> NaiveTime {
        self.end_time
    }

    pub fn duration_minutes(&self) -> u32 {
        minute_of_day(self.end_time) - minute_of_day(self.start_time)
    }

    /// Length in hours, rounded half-up to two decimals.
    pub fn duration_hours(&self) -> f64 {
        round_hours(self.duration_minutes())
    }

    /// Half-open overlap on the same date. Ranges on different dates never overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && self.end_time > other.start_time
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.date.format(DATE_FORMAT),
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[derive(Deserialize)]
#[serde(rename = "TimeRange", rename_all = "camelCase")]
struct RawTimeRange {
    date: String,
    start_time: String,
    end_time: String,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ValidationError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        TimeRange::parse(&raw.date, &raw.start_time, &raw.end_time)
    }
}

/// Strict `HH:MM`, 24-hour, two digits on each side.
pub fn parse_clock(value: &str) -> Result<NaiveTime, ValidationError> {
    let malformed = || ValidationError::MalformedTime(value.to_string());
    let bytes = value.as_bytes();

    let shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !shaped {
        return Err(malformed());
    }

    let hours = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
    let minutes = u32::from(bytes[3] - b'0') * 10 + u32::from(bytes[4] - b'0');
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(malformed)
}

/// Strict `YYYY-MM-DD` naming a real calendar day.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(ValidationError::MalformedDate(value.to_string()));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ValidationError::MalformedDate(value.to_string()))
}

/// Rounds a minute count to hours with two decimals, half-up.
///
/// Works in integer hundredths so the result is the closest `f64` to the
/// exact decimal.
pub fn round_hours(minutes: u32) -> f64 {
    let hundredths = (minutes * 100 + 30) / 60;
    f64::from(hundredths) / 100.0
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Serde adapter for `HH:MM` clock values.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock(&raw).map_err(de::Error::custom)
    }
}

//! Time buckets the readings are grouped into

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Day names, Monday first
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Time bucket key
///
/// Buckets of the same kind are sorted chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// Hour of the day: 0-23
    Hour(u32),
    /// Calendar date
    Date(NaiveDate),
    /// Week identified by the Sunday it starts on
    Week(NaiveDate),
    /// Year and month
    Month { year: i32, month: u32 },
    /// Day of the week (Monday=0) and hour of the day
    DayHour { day: u32, hour: u32 },
}
impl Bucket {
    /// Returns the CSV cells of the bucket key
    pub fn fields(&self) -> Vec<String> {
        match self {
            Bucket::Hour(hour) => vec![hour.to_string()],
            Bucket::Date(date) | Bucket::Week(date) => vec![date.format("%Y-%m-%d").to_string()],
            Bucket::Month { year, month } => vec![format!("{year:04}-{month:02}")],
            Bucket::DayHour { day, hour } => vec![
                DAY_NAMES[*day as usize % 7].to_string(),
                day.to_string(),
                hour.to_string(),
            ],
        }
    }
}

/// Returns the Sunday starting the week of a given date
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Bucket key extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketBy {
    HourOfDay,
    Date,
    /// Weeks starting on Sunday
    Week,
    Month,
    DayOfWeekHour,
}
impl BucketBy {
    pub fn key(&self, timestamp: &NaiveDateTime) -> Bucket {
        match self {
            BucketBy::HourOfDay => Bucket::Hour(timestamp.hour()),
            BucketBy::Date => Bucket::Date(timestamp.date()),
            BucketBy::Week => Bucket::Week(week_start(timestamp.date())),
            BucketBy::Month => Bucket::Month {
                year: timestamp.year(),
                month: timestamp.month(),
            },
            BucketBy::DayOfWeekHour => Bucket::DayHour {
                day: timestamp.weekday().num_days_from_monday(),
                hour: timestamp.hour(),
            },
        }
    }
    /// Default CSV headers of the bucket key
    pub fn headers(&self) -> Vec<&'static str> {
        match self {
            BucketBy::HourOfDay => vec!["hour"],
            BucketBy::Date => vec!["date"],
            BucketBy::Week => vec!["week_start"],
            BucketBy::Month => vec!["month"],
            BucketBy::DayOfWeekHour => vec!["day_name", "day", "hour"],
        }
    }
}

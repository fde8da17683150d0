//! Time window selection policies
//!
//! A window is always derived from the readings it is applied to,
//! never from the wall clock.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::fmt;

use crate::Reading;

/// Time window bounds, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
impl TimeWindow {
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        *timestamp >= self.start && *timestamp <= self.end
    }
}
impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}

/// Window selection policy
#[derive(Debug, Clone, PartialEq)]
pub enum Window {
    /// The last `hours` hours of the readings taken on `date`
    LastHoursOf { date: NaiveDate, hours: i64 },
    /// The last `days` calendar days of the readings taken in `month`
    LastDaysOfMonth { month: u32, days: i64 },
    /// The last `weeks` weeks of readings
    LastWeeks(i64),
    /// The readings taken in any of the months of the year
    Months(Vec<u32>),
    /// All the readings
    All,
}
impl Window {
    /// October through May
    pub fn october_to_may() -> Self {
        Window::Months(vec![10, 11, 12, 1, 2, 3, 4, 5])
    }
    /// March, April and May
    pub fn last_quarter() -> Self {
        Window::Months(vec![3, 4, 5])
    }
    /// A single month of the year
    pub fn month(month: u32) -> Self {
        Window::Months(vec![month])
    }
    /// Selects the readings within the window
    ///
    /// Returns the window bounds and the selected readings or `None` if no reading is left
    pub fn select<'a>(&self, readings: Vec<&'a Reading>) -> Option<(TimeWindow, Vec<&'a Reading>)> {
        let (window, selection): (TimeWindow, Vec<&Reading>) = match self {
            Window::LastHoursOf { date, hours } => {
                let on_date: Vec<_> = readings
                    .into_iter()
                    .filter(|r| r.timestamp.date() == *date)
                    .collect();
                let end = on_date.iter().map(|r| r.timestamp).max()?;
                let window = TimeWindow {
                    start: end - Duration::hours(*hours),
                    end,
                };
                (window, keep(on_date, &window))
            }
            Window::LastDaysOfMonth { month, days } => {
                let in_month: Vec<_> = readings
                    .into_iter()
                    .filter(|r| r.timestamp.month() == *month)
                    .collect();
                let end = in_month.iter().map(|r| r.timestamp).max()?;
                let first_day = end.date() - Duration::days(days - 1);
                let window = TimeWindow {
                    start: first_day.and_hms_opt(0, 0, 0)?,
                    end,
                };
                (window, keep(in_month, &window))
            }
            Window::LastWeeks(weeks) => {
                let end = readings.iter().map(|r| r.timestamp).max()?;
                let window = TimeWindow {
                    start: end - Duration::weeks(*weeks),
                    end,
                };
                (window, keep(readings, &window))
            }
            Window::Months(months) => {
                let selection: Vec<_> = readings
                    .into_iter()
                    .filter(|r| months.contains(&r.timestamp.month()))
                    .collect();
                (span(&selection)?, selection)
            }
            Window::All => (span(&readings)?, readings),
        };
        if selection.is_empty() {
            None
        } else {
            Some((window, selection))
        }
    }
}
impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::LastHoursOf { date, hours } => write!(f, "last {hours} hours of {date}"),
            Window::LastDaysOfMonth { month, days } => {
                write!(f, "last {days} days of month #{month}")
            }
            Window::LastWeeks(weeks) => write!(f, "last {weeks} weeks"),
            Window::Months(months) => write!(f, "months {months:?}"),
            Window::All => write!(f, "all"),
        }
    }
}

fn keep<'a>(readings: Vec<&'a Reading>, window: &TimeWindow) -> Vec<&'a Reading> {
    readings
        .into_iter()
        .filter(|r| window.contains(&r.timestamp))
        .collect()
}

fn span(readings: &[&Reading]) -> Option<TimeWindow> {
    Some(TimeWindow {
        start: readings.iter().map(|r| r.timestamp).min()?,
        end: readings.iter().map(|r| r.timestamp).max()?,
    })
}

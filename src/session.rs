use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Exchange holidays used when no calendar is configured.
pub const DEFAULT_HOLIDAYS: &[&str] = &[
    "2023-01-26", "2023-03-07", "2023-03-30", "2023-04-04", "2023-04-14",
    "2023-05-01", "2023-06-28", "2023-08-15", "2023-09-19", "2023-10-02",
    "2023-10-24", "2023-11-14", "2023-11-27", "2023-12-25",
];

static DEFAULT_CALENDAR: Lazy<HolidayCalendar> = Lazy::new(|| {
    HolidayCalendar::from_dates(
        DEFAULT_HOLIDAYS
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
    )
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        HolidayCalendar {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Weekdays that are not on the calendar.
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        DEFAULT_CALENDAR.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Pre,
    Open,
    Post,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketSessionState {
    pub status: SessionStatus,
    pub reason: &'static str,
}

impl MarketSessionState {
    fn new(status: SessionStatus, reason: &'static str) -> Self {
        MarketSessionState { status, reason }
    }
}

/// Market session for a local date and wall-clock time. First matching rule
/// wins, so 15:00..=15:30 is OPEN and only 15:31..=15:59 is POST.
pub fn classify_session(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    calendar: &HolidayCalendar,
) -> MarketSessionState {
    if !calendar.is_trading_day(date) {
        return MarketSessionState::new(SessionStatus::Closed, "Market Holiday");
    }

    if (hour == 8 && minute >= 45) || (hour == 9 && minute < 15) {
        MarketSessionState::new(SessionStatus::Pre, "Pre-Market Session")
    } else if (9..15).contains(&hour) || (hour == 15 && minute <= 30) {
        MarketSessionState::new(SessionStatus::Open, "Regular Trading Hours")
    } else if hour == 15 {
        MarketSessionState::new(SessionStatus::Post, "Post-Market Session")
    } else {
        MarketSessionState::new(SessionStatus::Closed, "Outside Market Hours")
    }
}

pub fn classify_at(at: NaiveDateTime, calendar: &HolidayCalendar) -> MarketSessionState {
    classify_session(at.date(), at.hour(), at.minute(), calendar)
}

/// Session for the machine's local clock.
pub fn classify_now(calendar: &HolidayCalendar) -> MarketSessionState {
    classify_at(Local::now().naive_local(), calendar)
}

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

/// One logged unit of work. `hours` is null for tips-only shifts and
/// contributes zero wages regardless of `wage_rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: Option<f64>,
    pub wage_rate: f64,
    pub tips_cashout: f64,
    pub shift_type: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Shift {
    pub fn wages(&self) -> f64 {
        self.hours.unwrap_or(0.0) * self.wage_rate
    }

    pub fn total(&self) -> f64 {
        self.wages() + self.tips_cashout
    }
}

/// One reported payment covering an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paycheck {
    pub id: String,
    pub user_id: String,
    pub period_start: String,
    pub period_end: String,
    pub wages_paid: f64,
    pub tips_paid: f64,
    pub received_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Parse the calendar-date part of a date or timestamp string.
/// Time components are truncated away so period bounds stored with a
/// time-of-day still compare date-only.
pub fn date_only(s: &str) -> Option<NaiveDate> {
    let date_part = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Extract the time-of-day from a timestamp or bare time string.
pub fn time_of_day(s: &str) -> Option<NaiveTime> {
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.time());
        }
    }
    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    None
}

/// Hours between start and end times. If end is earlier than start the
/// shift ran past midnight and end counts as the next calendar day.
pub fn derive_hours(start: &str, end: &str) -> Option<f64> {
    let start = time_of_day(start)?;
    let end = time_of_day(end)?;
    let mut seconds = (end - start).num_seconds();
    if seconds < 0 {
        seconds += 24 * 60 * 60;
    }
    Some(seconds as f64 / 3600.0)
}

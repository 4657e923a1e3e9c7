use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{date_only, Shift};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Days7,
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "90d")]
    Days90,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::Days30
    }
}

impl TimeRange {
    pub fn label(self) -> &'static str {
        match self {
            Self::Days7 => "7d",
            Self::Days30 => "30d",
            Self::Days90 => "90d",
            Self::Year => "1y",
            Self::All => "all",
        }
    }

    fn start(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = match self {
            Self::Days7 => 7,
            Self::Days30 => 30,
            Self::Days90 => 90,
            Self::Year => 365,
            Self::All => return None,
        };
        Some(today - Duration::days(days))
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_shifts: usize,
    pub total_hours: f64,
    pub total_wages: f64,
    pub total_tips: f64,
    pub total_earnings: f64,
    pub avg_per_shift: f64,
    pub avg_hourly_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyTotal {
    pub date: String,
    pub wages: f64,
    pub tips: f64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct WeekdayAverage {
    pub weekday: &'static str,
    pub shifts: usize,
    pub average_earnings: f64,
}

#[derive(Debug, Serialize)]
pub struct ShiftTypeTotal {
    pub shift_type: String,
    pub shifts: usize,
    pub total_earnings: f64,
}

/// Keep shifts whose nominal calendar date falls inside the range.
/// `All` keeps everything, including rows with unparseable dates.
pub fn filter_range(shifts: Vec<Shift>, range: TimeRange, today: NaiveDate) -> Vec<Shift> {
    let Some(start) = range.start(today) else {
        return shifts;
    };
    shifts
        .into_iter()
        .filter(|s| date_only(&s.date).is_some_and(|d| d >= start))
        .collect()
}

pub fn summary_stats(shifts: &[Shift]) -> SummaryStats {
    let total_wages: f64 = shifts.iter().map(Shift::wages).sum();
    let total_tips: f64 = shifts.iter().map(|s| s.tips_cashout).sum();
    let total_hours: f64 = shifts.iter().filter_map(|s| s.hours).sum();
    let total_shifts = shifts.len();
    let total_earnings = total_wages + total_tips;

    let avg_per_shift = if total_shifts > 0 {
        total_earnings / total_shifts as f64
    } else {
        0.0
    };
    let avg_hourly_rate = if total_hours > 0.0 {
        total_earnings / total_hours
    } else {
        0.0
    };

    SummaryStats {
        total_shifts,
        total_hours,
        total_wages,
        total_tips,
        total_earnings,
        avg_per_shift,
        avg_hourly_rate,
    }
}

/// Per-date wages and tips, ascending by date. The grouping key is the
/// shift's nominal calendar date; no timezone shifting.
pub fn daily_totals(shifts: &[Shift]) -> Vec<DailyTotal> {
    let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for shift in shifts {
        let key = shift.date.get(..10).unwrap_or(&shift.date).to_string();
        let entry = buckets.entry(key).or_insert((0.0, 0.0));
        entry.0 += shift.wages();
        entry.1 += shift.tips_cashout;
    }

    buckets
        .into_iter()
        .map(|(date, (wages, tips))| DailyTotal {
            date,
            wages,
            tips,
            total: wages + tips,
        })
        .collect()
}

/// Average earnings per shift for each weekday, Sunday through Saturday.
/// Weekdays with no shifts report an average of 0.
pub fn weekday_averages(shifts: &[Shift]) -> Vec<WeekdayAverage> {
    let mut totals = [0.0f64; 7];
    let mut counts = [0usize; 7];

    for shift in shifts {
        let Some(date) = date_only(&shift.date) else {
            continue;
        };
        let idx = date.weekday().num_days_from_sunday() as usize;
        totals[idx] += shift.total();
        counts[idx] += 1;
    }

    (0..7)
        .map(|i| WeekdayAverage {
            weekday: DAY_NAMES[i],
            shifts: counts[i],
            average_earnings: if counts[i] > 0 {
                totals[i] / counts[i] as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// Earnings totals grouped by shift type.
pub fn shift_type_totals(shifts: &[Shift]) -> Vec<ShiftTypeTotal> {
    let mut buckets: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for shift in shifts {
        let entry = buckets.entry(shift.shift_type.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += shift.total();
    }

    buckets
        .into_iter()
        .map(|(shift_type, (shifts, total_earnings))| ShiftTypeTotal {
            shift_type,
            shifts,
            total_earnings,
        })
        .collect()
}

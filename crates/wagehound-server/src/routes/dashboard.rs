use axum::{extract::State, Extension, Json};
use chrono::{Datelike, Duration, Utc};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{date_only, Paycheck, Shift, User};
use crate::routes::shifts::fetch_user_shifts;
use crate::routes::AppState;
use crate::services::reconcile::reconcile;

/// How many recent paychecks feed the discrepancy count.
const RECENT_PAYCHECKS: usize = 5;
const RECENT_SHIFTS: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub week_earnings: f64,
    pub discrepancy_count: usize,
    pub recent_shifts: Vec<Shift>,
}

/// GET /api/dashboard
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<DashboardSummary>> {
    let conn = state.db.get()?;
    let shifts = fetch_user_shifts(&conn, &user.id)?;

    // Earnings since the start of the current week (Sunday).
    let today = Utc::now().date_naive();
    let week_start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
    let week_earnings: f64 = shifts
        .iter()
        .filter(|s| date_only(&s.date).is_some_and(|d| d >= week_start))
        .map(Shift::total)
        .sum();

    // Each recent paycheck is reconciled independently against the full
    // shift pool; the count is simply how many come back discrepant.
    let mut stmt = conn.prepare(
        "SELECT id, user_id, period_start, period_end, wages_paid, tips_paid, received_at, created_at, updated_at
         FROM paychecks WHERE user_id = ?1 ORDER BY period_end DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(
        rusqlite::params![user.id, RECENT_PAYCHECKS as i64],
        |row| {
            Ok(Paycheck {
                id: row.get(0)?,
                user_id: row.get(1)?,
                period_start: row.get(2)?,
                period_end: row.get(3)?,
                wages_paid: row.get(4)?,
                tips_paid: row.get(5)?,
                received_at: row.get(6)?,
                created_at: row.get(7)?,
                updated_at: row.get(8)?,
            })
        },
    )?;
    let paychecks: Result<Vec<_>, _> = rows.collect();

    let discrepancy_count = paychecks?
        .iter()
        .filter(|p| reconcile(&shifts, p).is_discrepancy())
        .count();

    let recent_shifts = shifts.into_iter().take(RECENT_SHIFTS).collect();

    Ok(Json(DashboardSummary {
        week_earnings,
        discrepancy_count,
        recent_shifts,
    }))
}

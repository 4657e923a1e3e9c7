use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{date_only, derive_hours, Shift, User};
use crate::routes::AppState;

const SHIFT_TYPES: [&str; 2] = ["HOURLY_PLUS_TIPS", "TIPS_ONLY"];

const SHIFT_COLS: &str = "id, user_id, date, start_time, end_time, hours, wage_rate, tips_cashout, shift_type, created_at, updated_at";

fn row_to_shift(row: &rusqlite::Row) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        hours: row.get(5)?,
        wage_rate: row.get(6)?,
        tips_cashout: row.get(7)?,
        shift_type: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// All shifts owned by a user, newest first. Reconciliation and reports
/// start from this full set.
pub(crate) fn fetch_user_shifts(
    conn: &rusqlite::Connection,
    user_id: &str,
) -> AppResult<Vec<Shift>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHIFT_COLS} FROM shifts WHERE user_id = ?1 ORDER BY date DESC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user_id], row_to_shift)?;
    let shifts: Result<Vec<_>, _> = rows.collect();
    Ok(shifts?)
}

/// Shift dates must carry a parseable calendar date, otherwise the row
/// would silently fall out of reconciliation and every report bucket.
fn validate_date(date: &str) -> AppResult<()> {
    if date_only(date).is_none() {
        return Err(AppError::BadRequest("Invalid shift date".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateShiftRequest {
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: Option<f64>,
    pub wage_rate: f64,
    #[serde(default)]
    pub tips_cashout: f64,
    pub shift_type: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShiftRequest {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: Option<f64>,
    pub wage_rate: Option<f64>,
    pub tips_cashout: Option<f64>,
    pub shift_type: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<Shift>>> {
    let conn = state.db.get()?;
    let shifts = fetch_user_shifts(&conn, &user.id)?;
    Ok(Json(shifts))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<CreateShiftRequest>,
) -> AppResult<(StatusCode, Json<Shift>)> {
    if !SHIFT_TYPES.contains(&body.shift_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Invalid shift_type. Must be one of: {}",
            SHIFT_TYPES.join(", ")
        )));
    }
    validate_date(&body.date)?;

    // Hours can be supplied directly or derived from the times.
    let hours = body.hours.or_else(|| {
        match (body.start_time.as_deref(), body.end_time.as_deref()) {
            (Some(start), Some(end)) => derive_hours(start, end),
            _ => None,
        }
    });

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO shifts (id, user_id, date, start_time, end_time, hours, wage_rate, tips_cashout, shift_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            id, user.id, body.date, body.start_time, body.end_time,
            hours, body.wage_rate, body.tips_cashout, body.shift_type, now, now
        ],
    )?;

    let shift = Shift {
        id,
        user_id: user.id,
        date: body.date,
        start_time: body.start_time,
        end_time: body.end_time,
        hours,
        wage_rate: body.wage_rate,
        tips_cashout: body.tips_cashout,
        shift_type: body.shift_type,
        created_at: now.clone(),
        updated_at: now,
    };

    Ok((StatusCode::CREATED, Json(shift)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(shift_id): Path<String>,
    Json(body): Json<UpdateShiftRequest>,
) -> AppResult<Json<Shift>> {
    let conn = state.db.get()?;

    let existing = conn
        .query_row(
            &format!("SELECT {SHIFT_COLS} FROM shifts WHERE id = ?1 AND user_id = ?2"),
            rusqlite::params![shift_id, user.id],
            row_to_shift,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Shift not found".into()),
            e => AppError::Database(e),
        })?;

    if let Some(ref shift_type) = body.shift_type {
        if !SHIFT_TYPES.contains(&shift_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Invalid shift_type. Must be one of: {}",
                SHIFT_TYPES.join(", ")
            )));
        }
    }
    if let Some(ref date) = body.date {
        validate_date(date)?;
    }

    let times_changed = body.start_time.is_some() || body.end_time.is_some();
    let date = body.date.unwrap_or(existing.date);
    let start_time = body.start_time.or(existing.start_time);
    let end_time = body.end_time.or(existing.end_time);
    let wage_rate = body.wage_rate.unwrap_or(existing.wage_rate);
    let tips_cashout = body.tips_cashout.unwrap_or(existing.tips_cashout);
    let shift_type = body.shift_type.unwrap_or(existing.shift_type);

    // Re-derive hours when the times moved and no explicit value came in.
    let hours = match body.hours {
        Some(h) => Some(h),
        None if times_changed => match (start_time.as_deref(), end_time.as_deref()) {
            (Some(start), Some(end)) => derive_hours(start, end),
            _ => existing.hours,
        },
        None => existing.hours,
    };

    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    conn.execute(
        "UPDATE shifts SET date = ?1, start_time = ?2, end_time = ?3, hours = ?4, wage_rate = ?5, tips_cashout = ?6, shift_type = ?7, updated_at = ?8
         WHERE id = ?9 AND user_id = ?10",
        rusqlite::params![
            date, start_time, end_time, hours, wage_rate, tips_cashout,
            shift_type, now, shift_id, user.id
        ],
    )?;

    Ok(Json(Shift {
        id: shift_id,
        user_id: user.id,
        date,
        start_time,
        end_time,
        hours,
        wage_rate,
        tips_cashout,
        shift_type,
        created_at: existing.created_at,
        updated_at: now,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(shift_id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;

    let affected = conn.execute(
        "DELETE FROM shifts WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![shift_id, user.id],
    )?;

    if affected == 0 {
        return Err(AppError::NotFound("Shift not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_dates_must_carry_a_calendar_date() {
        assert!(validate_date("2024-01-02").is_ok());
        assert!(validate_date("2024-01-02T09:00:00").is_ok());
        assert!(validate_date("not-a-date").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn multibyte_dates_are_rejected_not_panicked_on() {
        assert!(validate_date("123456789é").is_err());
        assert!(validate_date("2024-01-1é").is_err());
    }
}

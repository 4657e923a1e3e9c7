use axum::http::StatusCode;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{date_only, Paycheck, User};
use crate::routes::shifts::fetch_user_shifts;
use crate::routes::AppState;
use crate::services::reconcile::{reconcile, ReconciliationResult};

const PAYCHECK_COLS: &str = "id, user_id, period_start, period_end, wages_paid, tips_paid, received_at, created_at, updated_at";

fn row_to_paycheck(row: &rusqlite::Row) -> rusqlite::Result<Paycheck> {
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
}

/// A paycheck with its reconciliation, recomputed from the owner's
/// current shifts on every read.
#[derive(Debug, Serialize)]
pub struct PaycheckWithReconciliation {
    #[serde(flatten)]
    pub paycheck: Paycheck,
    pub reconciliation: ReconciliationResult,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaycheckRequest {
    pub period_start: String,
    pub period_end: String,
    pub wages_paid: f64,
    pub tips_paid: f64,
    pub received_at: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaycheckRequest {
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub wages_paid: Option<f64>,
    pub tips_paid: Option<f64>,
    pub received_at: Option<String>,
}

fn validate_period(period_start: &str, period_end: &str) -> AppResult<()> {
    let start = date_only(period_start)
        .ok_or_else(|| AppError::BadRequest("Invalid period_start date".to_string()))?;
    let end = date_only(period_end)
        .ok_or_else(|| AppError::BadRequest("Invalid period_end date".to_string()))?;
    if start > end {
        return Err(AppError::BadRequest(
            "period_start must be on or before period_end".to_string(),
        ));
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Vec<PaycheckWithReconciliation>>> {
    let conn = state.db.get()?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYCHECK_COLS} FROM paychecks WHERE user_id = ?1 ORDER BY period_end DESC"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user.id], row_to_paycheck)?;
    let paychecks: Result<Vec<_>, _> = rows.collect();
    let paychecks = paychecks?;

    let shifts = fetch_user_shifts(&conn, &user.id)?;

    let reconciled = paychecks
        .into_iter()
        .map(|paycheck| {
            let reconciliation = reconcile(&shifts, &paycheck);
            PaycheckWithReconciliation {
                paycheck,
                reconciliation,
            }
        })
        .collect();

    Ok(Json(reconciled))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(paycheck_id): Path<String>,
) -> AppResult<Json<PaycheckWithReconciliation>> {
    let conn = state.db.get()?;

    let paycheck = conn
        .query_row(
            &format!("SELECT {PAYCHECK_COLS} FROM paychecks WHERE id = ?1 AND user_id = ?2"),
            rusqlite::params![paycheck_id, user.id],
            row_to_paycheck,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Paycheck not found".into()),
            e => AppError::Database(e),
        })?;

    let shifts = fetch_user_shifts(&conn, &user.id)?;
    let reconciliation = reconcile(&shifts, &paycheck);

    Ok(Json(PaycheckWithReconciliation {
        paycheck,
        reconciliation,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(body): Json<CreatePaycheckRequest>,
) -> AppResult<(StatusCode, Json<PaycheckWithReconciliation>)> {
    validate_period(&body.period_start, &body.period_end)?;

    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO paychecks (id, user_id, period_start, period_end, wages_paid, tips_paid, received_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id, user.id, body.period_start, body.period_end,
            body.wages_paid, body.tips_paid, body.received_at, now, now
        ],
    )?;

    let paycheck = Paycheck {
        id,
        user_id: user.id.clone(),
        period_start: body.period_start,
        period_end: body.period_end,
        wages_paid: body.wages_paid,
        tips_paid: body.tips_paid,
        received_at: body.received_at,
        created_at: now.clone(),
        updated_at: now,
    };

    let shifts = fetch_user_shifts(&conn, &user.id)?;
    let reconciliation = reconcile(&shifts, &paycheck);

    Ok((
        StatusCode::CREATED,
        Json(PaycheckWithReconciliation {
            paycheck,
            reconciliation,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(paycheck_id): Path<String>,
    Json(body): Json<UpdatePaycheckRequest>,
) -> AppResult<Json<PaycheckWithReconciliation>> {
    let conn = state.db.get()?;

    let existing = conn
        .query_row(
            &format!("SELECT {PAYCHECK_COLS} FROM paychecks WHERE id = ?1 AND user_id = ?2"),
            rusqlite::params![paycheck_id, user.id],
            row_to_paycheck,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound("Paycheck not found".into()),
            e => AppError::Database(e),
        })?;

    let period_start = body.period_start.unwrap_or(existing.period_start);
    let period_end = body.period_end.unwrap_or(existing.period_end);
    let wages_paid = body.wages_paid.unwrap_or(existing.wages_paid);
    let tips_paid = body.tips_paid.unwrap_or(existing.tips_paid);
    let received_at = body.received_at.unwrap_or(existing.received_at);

    validate_period(&period_start, &period_end)?;

    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    conn.execute(
        "UPDATE paychecks SET period_start = ?1, period_end = ?2, wages_paid = ?3, tips_paid = ?4, received_at = ?5, updated_at = ?6
         WHERE id = ?7 AND user_id = ?8",
        rusqlite::params![
            period_start, period_end, wages_paid, tips_paid, received_at,
            now, paycheck_id, user.id
        ],
    )?;

    let paycheck = Paycheck {
        id: paycheck_id,
        user_id: user.id.clone(),
        period_start,
        period_end,
        wages_paid,
        tips_paid,
        received_at,
        created_at: existing.created_at,
        updated_at: now,
    };

    let shifts = fetch_user_shifts(&conn, &user.id)?;
    let reconciliation = reconcile(&shifts, &paycheck);

    Ok(Json(PaycheckWithReconciliation {
        paycheck,
        reconciliation,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(paycheck_id): Path<String>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;

    let affected = conn.execute(
        "DELETE FROM paychecks WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![paycheck_id, user.id],
    )?;

    if affected == 0 {
        return Err(AppError::NotFound("Paycheck not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}

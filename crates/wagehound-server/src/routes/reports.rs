use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::models::{Shift, User};
use crate::routes::shifts::fetch_user_shifts;
use crate::routes::AppState;
use crate::services::export;
use crate::services::reports::{
    daily_totals, filter_range, shift_type_totals, summary_stats, weekday_averages, DailyTotal,
    ShiftTypeTotal, SummaryStats, TimeRange, WeekdayAverage,
};

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub range: Option<TimeRange>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub stats: SummaryStats,
    pub daily: Vec<DailyTotal>,
    pub weekday_averages: Vec<WeekdayAverage>,
    pub shift_types: Vec<ShiftTypeTotal>,
}

fn shifts_in_range(state: &AppState, user: &User, range: TimeRange) -> AppResult<Vec<Shift>> {
    let conn = state.db.get()?;
    let shifts = fetch_user_shifts(&conn, &user.id)?;
    Ok(filter_range(shifts, range, Utc::now().date_naive()))
}

/// GET /api/reports/summary?range=30d
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ReportsQuery>,
) -> AppResult<Json<ReportSummary>> {
    let range = query.range.unwrap_or_default();
    let shifts = shifts_in_range(&state, &user, range)?;

    Ok(Json(ReportSummary {
        stats: summary_stats(&shifts),
        daily: daily_totals(&shifts),
        weekday_averages: weekday_averages(&shifts),
        shift_types: shift_type_totals(&shifts),
    }))
}

/// GET /api/reports/export.csv?range=30d
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ReportsQuery>,
) -> AppResult<impl IntoResponse> {
    let range = query.range.unwrap_or_default();
    let shifts = shifts_in_range(&state, &user, range)?;

    let csv = export::shifts_csv(&shifts)?;

    let filename = format!(
        "wagehound-earnings-{}-{}.csv",
        range.label(),
        Utc::now().format("%Y-%m-%d")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}

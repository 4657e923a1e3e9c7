use crate::error::{AppError, AppResult};
use crate::models::{date_only, time_of_day, Shift};
use crate::services::reports;

/// Render shifts as the earnings-report CSV: one row per shift followed
/// by a summary block.
pub fn shifts_csv(shifts: &[Shift]) -> AppResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    wtr.write_record([
        "Date",
        "Day of Week",
        "Start Time",
        "End Time",
        "Hours",
        "Shift Type",
        "Wage Rate",
        "Wages Earned",
        "Tips Cash-out",
        "Total Earnings",
    ])
    .map_err(csv_err)?;

    for shift in shifts {
        let date = date_only(&shift.date);
        wtr.write_record([
            date.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            date.map(|d| d.format("%A").to_string()).unwrap_or_default(),
            fmt_time(shift.start_time.as_deref()),
            fmt_time(shift.end_time.as_deref()),
            shift.hours.map(|h| h.to_string()).unwrap_or_default(),
            shift_type_label(&shift.shift_type).to_string(),
            format!("{:.2}", shift.wage_rate),
            format!("{:.2}", shift.wages()),
            format!("{:.2}", shift.tips_cashout),
            format!("{:.2}", shift.total()),
        ])
        .map_err(csv_err)?;
    }

    let stats = reports::summary_stats(shifts);

    wtr.write_record([""]).map_err(csv_err)?;
    wtr.write_record(["SUMMARY"]).map_err(csv_err)?;
    wtr.write_record(["Total Shifts", &stats.total_shifts.to_string()])
        .map_err(csv_err)?;
    wtr.write_record(["Total Hours", &format!("{:.1}", stats.total_hours)])
        .map_err(csv_err)?;
    wtr.write_record(["Total Wages", &format!("{:.2}", stats.total_wages)])
        .map_err(csv_err)?;
    wtr.write_record(["Total Tips", &format!("{:.2}", stats.total_tips)])
        .map_err(csv_err)?;
    wtr.write_record(["Total Earnings", &format!("{:.2}", stats.total_earnings)])
        .map_err(csv_err)?;
    wtr.write_record(["Average per Shift", &format!("{:.2}", stats.avg_per_shift)])
        .map_err(csv_err)?;
    wtr.write_record(["Average Hourly Rate", &format!("{:.2}", stats.avg_hourly_rate)])
        .map_err(csv_err)?;

    let data = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush error: {e}")))?;

    String::from_utf8(data).map_err(|e| AppError::Internal(format!("CSV encoding error: {e}")))
}

fn shift_type_label(shift_type: &str) -> &'static str {
    if shift_type == "HOURLY_PLUS_TIPS" {
        "Hourly + Tips"
    } else {
        "Tips Only"
    }
}

fn fmt_time(value: Option<&str>) -> String {
    value
        .and_then(time_of_day)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn csv_err(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV write error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(
        date: &str,
        start: Option<&str>,
        end: Option<&str>,
        hours: Option<f64>,
        wage_rate: f64,
        tips: f64,
        kind: &str,
    ) -> Shift {
        Shift {
            id: format!("shift-{date}"),
            user_id: "u1".into(),
            date: date.into(),
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            hours,
            wage_rate,
            tips_cashout: tips,
            shift_type: kind.into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn csv_has_header_rows_and_summary_block() {
        let shifts = vec![
            shift(
                "2024-01-02",
                Some("2024-01-02T09:00:00"),
                Some("2024-01-02T17:00:00"),
                Some(8.0),
                15.0,
                20.0,
                "HOURLY_PLUS_TIPS",
            ),
            shift("2024-01-05", None, None, None, 0.0, 50.0, "TIPS_ONLY"),
        ];

        let csv = shifts_csv(&shifts).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Date,Day of Week,Start Time,End Time,Hours,Shift Type,Wage Rate,Wages Earned,Tips Cash-out,Total Earnings"
        );
        assert_eq!(
            lines[1],
            "2024-01-02,Tuesday,09:00,17:00,8,Hourly + Tips,15.00,120.00,20.00,140.00"
        );
        assert_eq!(lines[2], "2024-01-05,Friday,,,,Tips Only,0.00,0.00,50.00,50.00");

        assert!(lines.contains(&"SUMMARY"));
        assert!(lines.contains(&"Total Shifts,2"));
        assert!(lines.contains(&"Total Hours,8.0"));
        assert!(lines.contains(&"Total Wages,120.00"));
        assert!(lines.contains(&"Total Tips,70.00"));
        assert!(lines.contains(&"Total Earnings,190.00"));
        assert!(lines.contains(&"Average per Shift,95.00"));
        assert!(lines.contains(&"Average Hourly Rate,23.75"));
    }

    #[test]
    fn empty_export_still_carries_the_summary() {
        let csv = shifts_csv(&[]).unwrap();
        assert!(csv.starts_with("Date,Day of Week"));
        assert!(csv.contains("Total Shifts,0"));
        assert!(csv.contains("Average per Shift,0.00"));
    }
}

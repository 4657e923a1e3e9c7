use serde::Serialize;

use crate::models::{date_only, Paycheck, Shift};

/// Differences smaller than one cent are floating-point noise, not
/// discrepancies.
pub const CENT_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Verified,
    Overpaid,
    Underpaid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    pub expected_wages: f64,
    pub expected_tips: f64,
    pub wage_difference: f64,
    pub tips_difference: f64,
    pub total_difference: f64,
    pub verdict: Verdict,
}

impl ReconciliationResult {
    pub fn is_discrepancy(&self) -> bool {
        self.verdict != Verdict::Verified
    }
}

/// Compare a paycheck's reported amounts against the earnings its period
/// implies. `shifts` is the owner's complete shift history; period
/// filtering happens here, date-only and inclusive on both ends.
///
/// Recomputed on every read — shifts can change after a paycheck is
/// recorded, so the verdict is never stored. Overlapping paycheck
/// periods each count the same shifts; paychecks are independent.
pub fn reconcile(shifts: &[Shift], paycheck: &Paycheck) -> ReconciliationResult {
    let period_start = date_only(&paycheck.period_start);
    let period_end = date_only(&paycheck.period_end);

    let in_period: Vec<&Shift> = shifts
        .iter()
        .filter(|shift| match (date_only(&shift.date), period_start, period_end) {
            (Some(date), Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        })
        .collect();

    let expected_wages: f64 = in_period.iter().map(|s| s.wages()).sum();
    let expected_tips: f64 = in_period.iter().map(|s| s.tips_cashout).sum();

    let wage_difference = paycheck.wages_paid - expected_wages;
    let tips_difference = paycheck.tips_paid - expected_tips;
    let total_difference = wage_difference + tips_difference;

    let verdict = if total_difference.abs() < CENT_EPSILON {
        Verdict::Verified
    } else if total_difference > 0.0 {
        Verdict::Overpaid
    } else {
        Verdict::Underpaid
    };

    ReconciliationResult {
        expected_wages,
        expected_tips,
        wage_difference,
        tips_difference,
        total_difference,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(date: &str, hours: Option<f64>, wage_rate: f64, tips: f64) -> Shift {
        Shift {
            id: format!("shift-{date}"),
            user_id: "u1".into(),
            date: date.into(),
            start_time: None,
            end_time: None,
            hours,
            wage_rate,
            tips_cashout: tips,
            shift_type: if hours.is_some() {
                "HOURLY_PLUS_TIPS".into()
            } else {
                "TIPS_ONLY".into()
            },
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn paycheck(start: &str, end: &str, wages: f64, tips: f64) -> Paycheck {
        Paycheck {
            id: "p1".into(),
            user_id: "u1".into(),
            period_start: start.into(),
            period_end: end.into(),
            wages_paid: wages,
            tips_paid: tips,
            received_at: end.into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn matching_paycheck_is_verified() {
        let shifts = vec![
            shift("2024-01-02", Some(8.0), 15.0, 20.0),
            shift("2024-01-03", Some(6.0), 15.0, 10.0),
        ];
        let p = paycheck("2024-01-01", "2024-01-07", 210.0, 30.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, 210.0);
        assert_eq!(r.expected_tips, 30.0);
        assert_eq!(r.total_difference, 0.0);
        assert_eq!(r.verdict, Verdict::Verified);
        assert!(!r.is_discrepancy());
    }

    #[test]
    fn underpaid_wages_flag_a_discrepancy() {
        let shifts = vec![
            shift("2024-01-02", Some(8.0), 15.0, 20.0),
            shift("2024-01-03", Some(6.0), 15.0, 10.0),
        ];
        let p = paycheck("2024-01-01", "2024-01-07", 200.0, 30.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.wage_difference, -10.0);
        assert_eq!(r.total_difference, -10.0);
        assert_eq!(r.verdict, Verdict::Underpaid);
    }

    #[test]
    fn overpaid_total_is_flagged() {
        let shifts = vec![shift("2024-01-02", Some(4.0), 10.0, 0.0)];
        let p = paycheck("2024-01-01", "2024-01-07", 45.0, 0.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.verdict, Verdict::Overpaid);
    }

    #[test]
    fn one_cent_boundary() {
        // No in-period shifts, so the reported amount IS the difference.
        let shifts: Vec<Shift> = Vec::new();

        // Exactly one cent off is a discrepancy.
        let r = reconcile(&shifts, &paycheck("2024-01-01", "2024-01-07", 0.01, 0.0));
        assert_eq!(r.verdict, Verdict::Overpaid);

        // Just under one cent is tolerated as rounding noise.
        let r = reconcile(&shifts, &paycheck("2024-01-01", "2024-01-07", 0.0099, 0.0));
        assert_eq!(r.verdict, Verdict::Verified);
    }

    #[test]
    fn null_hours_contribute_no_wages() {
        let shifts = vec![shift("2024-01-02", None, 25.0, 50.0)];
        let p = paycheck("2024-01-01", "2024-01-07", 0.0, 50.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, 0.0);
        assert_eq!(r.expected_tips, 50.0);
        assert_eq!(r.verdict, Verdict::Verified);
    }

    #[test]
    fn period_bounds_are_inclusive() {
        let shifts = vec![
            shift("2024-01-01", Some(1.0), 10.0, 0.0),
            shift("2024-01-07", Some(1.0), 10.0, 0.0),
            shift("2024-01-08", Some(1.0), 10.0, 0.0),
        ];
        let p = paycheck("2024-01-01", "2024-01-07", 20.0, 0.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, 20.0);
        assert_eq!(r.verdict, Verdict::Verified);
    }

    #[test]
    fn time_components_on_period_bounds_are_ignored() {
        let shifts = vec![shift("2024-01-07", Some(2.0), 10.0, 0.0)];
        // Bounds stored with a time-of-day must still match date-only.
        let p = paycheck("2024-01-01T12:00:00", "2024-01-07T00:00:00", 20.0, 0.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, 20.0);
        assert_eq!(r.verdict, Verdict::Verified);
    }

    #[test]
    fn overlapping_paychecks_each_count_the_same_shifts() {
        let shifts = vec![shift("2024-01-05", Some(5.0), 10.0, 0.0)];
        let first = paycheck("2024-01-01", "2024-01-07", 50.0, 0.0);
        let second = paycheck("2024-01-04", "2024-01-10", 50.0, 0.0);

        // The shift counts toward both periods; no deduplication.
        assert_eq!(reconcile(&shifts, &first).expected_wages, 50.0);
        assert_eq!(reconcile(&shifts, &second).expected_wages, 50.0);
    }

    #[test]
    fn negative_values_are_not_rejected() {
        let shifts = vec![shift("2024-01-02", Some(2.0), -5.0, -1.0)];
        let p = paycheck("2024-01-01", "2024-01-07", -10.0, -1.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, -10.0);
        assert_eq!(r.verdict, Verdict::Verified);
    }

    #[test]
    fn unparseable_period_matches_nothing() {
        let shifts = vec![shift("2024-01-02", Some(8.0), 15.0, 0.0)];
        let p = paycheck("not-a-date", "2024-01-07", 0.0, 0.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, 0.0);
        assert_eq!(r.verdict, Verdict::Verified);
    }

    #[test]
    fn empty_period_reports_full_amounts_as_difference() {
        let shifts = vec![shift("2024-02-01", Some(8.0), 15.0, 0.0)];
        let p = paycheck("2024-01-01", "2024-01-07", 120.0, 0.0);

        let r = reconcile(&shifts, &p);
        assert_eq!(r.expected_wages, 0.0);
        assert_eq!(r.total_difference, 120.0);
        assert_eq!(r.verdict, Verdict::Overpaid);
    }
}

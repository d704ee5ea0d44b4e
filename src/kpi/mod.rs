// src/kpi/mod.rs

//! Pure KPI reductions over a snapshot of report rows.
//!
//! Every function here is a stateless reduction over the rows passed in:
//! no I/O, no hidden state. Absence of data is `None`, never a zero-valued
//! summary — callers must be able to tell "operator not yet reporting"
//! apart from "operator reported zero calls".

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Report, Shift};

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Per-slot figures derived from one report row and its predecessor.
#[derive(Debug, PartialEq, Serialize)]
pub struct SlotKpi {
    pub slot: Shift,
    /// Calls handled in this slot: cumulative total minus the previous
    /// slot's cumulative total. Goes negative if a later cumulative value
    /// was corrected below an earlier one; surfaced as-is.
    pub actual_calls: i64,
    pub incoming_accepted: i64,
    pub outgoing_made: i64,
    pub missed: i64,
    pub minutes_on_line: i64,
    pub minutes_in_calls: i64,
    pub recordings: i64,
    /// minutes_in_calls / actual_calls, one decimal; 0 when actual_calls <= 0.
    pub avg_call_duration: f64,
}

/// Daily roll-up across the three slots.
#[derive(Debug, PartialEq, Serialize)]
pub struct DailyKpi {
    pub total_calls: i64,
    pub total_incoming: i64,
    pub total_outgoing: i64,
    pub total_missed: i64,
    pub total_minutes_on_line: i64,
    pub total_minutes_in_calls: i64,
    pub total_recordings: i64,
    pub avg_call_duration: f64,
    pub utilization_rate: f64,
}

/// Monthly roll-up across every reported date in the snapshot.
#[derive(Debug, PartialEq, Serialize)]
pub struct MonthlyKpi {
    pub total_calls: i64,
    pub total_incoming: i64,
    pub total_outgoing: i64,
    pub total_missed: i64,
    pub total_minutes_on_line: i64,
    pub total_minutes_in_calls: i64,
    pub total_recordings: i64,
    /// Distinct dates with at least one report.
    pub working_days: i64,
    pub avg_call_duration: f64,
    pub utilization_rate: f64,
    pub avg_calls_per_day: f64,
}

/// Figures for one operator's slot on one date, or `None` when that slot
/// has no report. The cumulative call counter resets at day boundaries, so
/// the first slot of the day (or a slot whose predecessor is unreported)
/// subtracts 0.
pub fn slot_kpi(
    reports: &[Report],
    operator_id: i64,
    date: NaiveDate,
    slot: Shift,
) -> Option<SlotKpi> {
    let find = |s: Shift| {
        reports
            .iter()
            .find(|r| r.operator_id == operator_id && r.report_date == date && r.slot == s)
    };

    let current = find(slot)?;
    let prev_cumulative = slot
        .prev()
        .and_then(find)
        .map(|r| r.calls_cumulative)
        .unwrap_or(0);
    let actual_calls = i64::from(current.calls_cumulative) - i64::from(prev_cumulative);

    let avg_call_duration = if actual_calls > 0 {
        round1(f64::from(current.minutes_in_calls) / actual_calls as f64)
    } else {
        0.0
    };

    Some(SlotKpi {
        slot,
        actual_calls,
        incoming_accepted: i64::from(current.incoming_accepted),
        outgoing_made: i64::from(current.outgoing_made),
        missed: i64::from(current.missed),
        minutes_on_line: i64::from(current.minutes_on_line),
        minutes_in_calls: i64::from(current.minutes_in_calls),
        recordings: i64::from(current.recordings),
        avg_call_duration,
    })
}

/// Daily KPI for one operator, or `None` when the operator has no report
/// rows on that date at all — empty individual slots are fine.
pub fn daily_kpi(reports: &[Report], operator_id: i64, date: NaiveDate) -> Option<DailyKpi> {
    if !reports
        .iter()
        .any(|r| r.operator_id == operator_id && r.report_date == date)
    {
        return None;
    }

    let mut k = DailyKpi {
        total_calls: 0,
        total_incoming: 0,
        total_outgoing: 0,
        total_missed: 0,
        total_minutes_on_line: 0,
        total_minutes_in_calls: 0,
        total_recordings: 0,
        avg_call_duration: 0.0,
        utilization_rate: 0.0,
    };

    for slot in Shift::ALL {
        if let Some(s) = slot_kpi(reports, operator_id, date, slot) {
            k.total_calls += s.actual_calls;
            k.total_incoming += s.incoming_accepted;
            k.total_outgoing += s.outgoing_made;
            k.total_missed += s.missed;
            k.total_minutes_on_line += s.minutes_on_line;
            k.total_minutes_in_calls += s.minutes_in_calls;
            k.total_recordings += s.recordings;
        }
    }

    if k.total_calls > 0 {
        k.avg_call_duration = round1(k.total_minutes_in_calls as f64 / k.total_calls as f64);
    }
    if k.total_minutes_on_line > 0 {
        k.utilization_rate =
            round1(k.total_minutes_in_calls as f64 / k.total_minutes_on_line as f64 * 100.0);
    }

    Some(k)
}

/// Monthly KPI for one operator over whatever dates appear in the
/// snapshot, or `None` when the operator has no rows in it.
pub fn monthly_kpi(reports: &[Report], operator_id: i64) -> Option<MonthlyKpi> {
    let mut dates: Vec<NaiveDate> = reports
        .iter()
        .filter(|r| r.operator_id == operator_id)
        .map(|r| r.report_date)
        .collect();
    if dates.is_empty() {
        return None;
    }
    dates.sort_unstable();
    dates.dedup();

    let mut k = MonthlyKpi {
        total_calls: 0,
        total_incoming: 0,
        total_outgoing: 0,
        total_missed: 0,
        total_minutes_on_line: 0,
        total_minutes_in_calls: 0,
        total_recordings: 0,
        working_days: dates.len() as i64,
        avg_call_duration: 0.0,
        utilization_rate: 0.0,
        avg_calls_per_day: 0.0,
    };

    for date in &dates {
        for slot in Shift::ALL {
            if let Some(s) = slot_kpi(reports, operator_id, *date, slot) {
                k.total_calls += s.actual_calls;
                k.total_incoming += s.incoming_accepted;
                k.total_outgoing += s.outgoing_made;
                k.total_missed += s.missed;
                k.total_minutes_on_line += s.minutes_on_line;
                k.total_minutes_in_calls += s.minutes_in_calls;
                k.total_recordings += s.recordings;
            }
        }
    }

    if k.total_calls > 0 {
        k.avg_call_duration = round1(k.total_minutes_in_calls as f64 / k.total_calls as f64);
    }
    if k.total_minutes_on_line > 0 {
        k.utilization_rate =
            round1(k.total_minutes_in_calls as f64 / k.total_minutes_on_line as f64 * 100.0);
    }
    if k.working_days > 0 {
        k.avg_calls_per_day = round1(k.total_calls as f64 / k.working_days as f64);
    }

    Some(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn report(operator_id: i64, date: &str, slot: Shift, calls_cumulative: i32) -> Report {
        Report {
            report_id: 0,
            operator_id,
            report_date: d(date),
            slot,
            calls_cumulative,
            incoming_accepted: 0,
            outgoing_made: 0,
            missed: 0,
            minutes_on_line: 0,
            minutes_in_calls: 0,
            recordings: 0,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_reports_means_no_data_not_zero() {
        let rows = vec![report(2, "2025-06-02", Shift::Morning, 12)];
        assert!(daily_kpi(&rows, 1, d("2025-06-02")).is_none());
        // Same operator, different date: still no data.
        assert!(daily_kpi(&rows, 2, d("2025-06-03")).is_none());
    }

    #[test]
    fn reported_zero_calls_is_data() {
        let rows = vec![report(1, "2025-06-02", Shift::Morning, 0)];
        let k = daily_kpi(&rows, 1, d("2025-06-02")).unwrap();
        assert_eq!(k.total_calls, 0);
        assert_eq!(k.avg_call_duration, 0.0);
    }

    #[test]
    fn first_slot_subtracts_zero() {
        let rows = vec![report(1, "2025-06-02", Shift::Morning, 40)];
        let s = slot_kpi(&rows, 1, d("2025-06-02"), Shift::Morning).unwrap();
        assert_eq!(s.actual_calls, 40);
    }

    #[test]
    fn delta_against_previous_slot() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 40),
            report(1, "2025-06-02", Shift::Afternoon, 95),
        ];
        let s = slot_kpi(&rows, 1, d("2025-06-02"), Shift::Afternoon).unwrap();
        assert_eq!(s.actual_calls, 55);
    }

    #[test]
    fn unreported_previous_slot_counts_as_zero() {
        // Afternoon reported, morning missing: the whole cumulative total
        // lands on the afternoon.
        let rows = vec![report(1, "2025-06-02", Shift::Afternoon, 95)];
        let s = slot_kpi(&rows, 1, d("2025-06-02"), Shift::Afternoon).unwrap();
        assert_eq!(s.actual_calls, 95);
        assert!(slot_kpi(&rows, 1, d("2025-06-02"), Shift::Morning).is_none());
    }

    #[test]
    fn negative_delta_is_surfaced_not_clamped() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 50),
            report(1, "2025-06-02", Shift::Afternoon, 30),
        ];
        let s = slot_kpi(&rows, 1, d("2025-06-02"), Shift::Afternoon).unwrap();
        assert_eq!(s.actual_calls, -20);
        assert_eq!(s.avg_call_duration, 0.0);
        let k = daily_kpi(&rows, 1, d("2025-06-02")).unwrap();
        assert_eq!(k.total_calls, 30);
    }

    #[test]
    fn ratios_are_zero_on_zero_denominators() {
        // One slot, zero calls, zero minutes on line: both ratios must be
        // an exact 0.0, not NaN.
        let rows = vec![report(1, "2025-06-02", Shift::Morning, 0)];
        let k = daily_kpi(&rows, 1, d("2025-06-02")).unwrap();
        assert_eq!(k.avg_call_duration, 0.0);
        assert_eq!(k.utilization_rate, 0.0);
        assert!(!k.avg_call_duration.is_nan());
    }

    #[test]
    fn slot_average_rounds_to_one_decimal() {
        let mut r = report(1, "2025-06-02", Shift::Morning, 3);
        r.minutes_in_calls = 100;
        let s = slot_kpi(&[r], 1, d("2025-06-02"), Shift::Morning).unwrap();
        assert_eq!(s.avg_call_duration, 33.3);
    }

    #[test]
    fn daily_ratios_over_summed_totals() {
        let mut morning = report(1, "2025-06-02", Shift::Morning, 10);
        morning.minutes_in_calls = 30;
        morning.minutes_on_line = 120;
        let mut afternoon = report(1, "2025-06-02", Shift::Afternoon, 30);
        afternoon.minutes_in_calls = 60;
        afternoon.minutes_on_line = 240;

        let k = daily_kpi(&[morning, afternoon], 1, d("2025-06-02")).unwrap();
        assert_eq!(k.total_calls, 30);
        assert_eq!(k.avg_call_duration, 3.0); // 90 / 30
        assert_eq!(k.utilization_rate, 25.0); // 90 / 360 * 100
    }

    #[test]
    fn daily_total_equals_sum_of_slot_deltas() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 12),
            report(1, "2025-06-02", Shift::Afternoon, 40),
            report(1, "2025-06-02", Shift::Evening, 47),
        ];
        let date = d("2025-06-02");
        let slot_sum: i64 = Shift::ALL
            .iter()
            .filter_map(|&s| slot_kpi(&rows, 1, date, s))
            .map(|s| s.actual_calls)
            .sum();
        let k = daily_kpi(&rows, 1, date).unwrap();
        assert_eq!(slot_sum, k.total_calls);
        assert_eq!(k.total_calls, 47);
    }

    #[test]
    fn monthly_sums_deltas_across_working_days() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 20),
            report(1, "2025-06-02", Shift::Afternoon, 50),
            report(1, "2025-06-03", Shift::Morning, 10),
        ];
        let k = monthly_kpi(&rows, 1).unwrap();
        assert_eq!(k.total_calls, 60);
        assert_eq!(k.working_days, 2);
        assert_eq!(k.avg_calls_per_day, 30.0);
    }

    #[test]
    fn monthly_ignores_other_operators() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 20),
            report(2, "2025-06-02", Shift::Morning, 99),
        ];
        let k = monthly_kpi(&rows, 1).unwrap();
        assert_eq!(k.total_calls, 20);
        assert_eq!(k.working_days, 1);
        assert!(monthly_kpi(&rows, 3).is_none());
    }

    #[test]
    fn duplicate_dates_count_one_working_day() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 20),
            report(1, "2025-06-02", Shift::Evening, 35),
        ];
        let k = monthly_kpi(&rows, 1).unwrap();
        assert_eq!(k.working_days, 1);
        // Evening's predecessor (afternoon) is unreported, so its delta
        // subtracts 0: 20 + 35.
        assert_eq!(k.total_calls, 55);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let rows = vec![
            report(1, "2025-06-02", Shift::Morning, 20),
            report(1, "2025-06-02", Shift::Afternoon, 50),
            report(1, "2025-06-03", Shift::Morning, 10),
        ];
        let date = d("2025-06-02");
        assert_eq!(daily_kpi(&rows, 1, date), daily_kpi(&rows, 1, date));
        assert_eq!(monthly_kpi(&rows, 1), monthly_kpi(&rows, 1));
        assert_eq!(
            slot_kpi(&rows, 1, date, Shift::Afternoon),
            slot_kpi(&rows, 1, date, Shift::Afternoon)
        );
    }
}

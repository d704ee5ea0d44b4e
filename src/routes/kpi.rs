// src/routes/kpi.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::query_as;

use crate::{
    auth::AuthUser,
    kpi,
    models::{Operator, Report, Shift},
    AppState,
};
use super::{internal_error, month_bounds};

async fn active_operators(
    state: &AppState,
    operator_id: Option<i64>,
) -> Result<Vec<Operator>, (StatusCode, String)> {
    query_as::<_, Operator>(
        r#"SELECT operator_id, full_name, is_active, created_at
           FROM operators
           WHERE is_active AND ($1::BIGINT IS NULL OR operator_id = $1)
           ORDER BY full_name"#,
    )
    .bind(operator_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)
}

#[derive(Deserialize)]
pub struct DailyKpiQ {
    pub date: NaiveDate,
    pub operator_id: Option<i64>,
}

#[derive(Serialize)]
pub struct OperatorDailyKpi {
    pub operator_id: i64,
    pub operator_name: String,
    /// Per-slot breakdown; slots without a report are omitted.
    pub slots: Vec<kpi::SlotKpi>,
    /// `null` when the operator has no reports on the date.
    pub daily: Option<kpi::DailyKpi>,
}

pub async fn daily(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<DailyKpiQ>,
) -> Result<Json<Vec<OperatorDailyKpi>>, (StatusCode, String)> {
    let operators = active_operators(&state, q.operator_id).await?;
    let reports = query_as::<_, Report>(
        r#"SELECT report_id, operator_id, report_date, slot,
                  calls_cumulative, incoming_accepted, outgoing_made, missed,
                  minutes_on_line, minutes_in_calls, recordings,
                  created_by, created_at, updated_at
           FROM reports WHERE report_date = $1"#,
    )
    .bind(q.date)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    let out = operators
        .into_iter()
        .map(|op| OperatorDailyKpi {
            slots: Shift::ALL
                .iter()
                .filter_map(|&slot| kpi::slot_kpi(&reports, op.operator_id, q.date, slot))
                .collect(),
            daily: kpi::daily_kpi(&reports, op.operator_id, q.date),
            operator_id: op.operator_id,
            operator_name: op.full_name,
        })
        .collect();
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct MonthlyKpiQ {
    pub month: String,
    pub operator_id: Option<i64>,
}

#[derive(Serialize)]
pub struct OperatorMonthlyKpi {
    pub operator_id: i64,
    pub operator_name: String,
    /// `null` when the operator has no reports in the month.
    pub monthly: Option<kpi::MonthlyKpi>,
}

pub async fn monthly(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<MonthlyKpiQ>,
) -> Result<Json<Vec<OperatorMonthlyKpi>>, (StatusCode, String)> {
    let (start, end) = month_bounds(&q.month)?;
    let operators = active_operators(&state, q.operator_id).await?;
    let reports = query_as::<_, Report>(
        r#"SELECT report_id, operator_id, report_date, slot,
                  calls_cumulative, incoming_accepted, outgoing_made, missed,
                  minutes_on_line, minutes_in_calls, recordings,
                  created_by, created_at, updated_at
           FROM reports WHERE report_date >= $1 AND report_date < $2"#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    let out = operators
        .into_iter()
        .map(|op| OperatorMonthlyKpi {
            monthly: kpi::monthly_kpi(&reports, op.operator_id),
            operator_id: op.operator_id,
            operator_name: op.full_name,
        })
        .collect();
    Ok(Json(out))
}

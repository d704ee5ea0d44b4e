// src/routes/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query, query_as};

use crate::{
    auth::{self, AuthUser},
    models::{Report, ReportWithOperator, Shift},
    AppState,
};
use super::{bad_request, internal_error, month_bounds, not_found};

#[derive(Deserialize)]
pub struct ListReportsQ {
    pub operator_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub month: Option<String>,
}

pub async fn list_reports(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<ListReportsQ>,
) -> Result<Json<Vec<ReportWithOperator>>, (StatusCode, String)> {
    let (month_start, month_end) = match &q.month {
        Some(m) => {
            let (s, e) = month_bounds(m)?;
            (Some(s), Some(e))
        }
        None => (None, None),
    };

    let rows = query_as::<_, ReportWithOperator>(
        r#"
        SELECT r.report_id, r.operator_id, o.full_name AS operator_name,
               r.report_date, r.slot,
               r.calls_cumulative, r.incoming_accepted, r.outgoing_made, r.missed,
               r.minutes_on_line, r.minutes_in_calls, r.recordings,
               r.created_by, r.created_at, r.updated_at
        FROM reports r
        JOIN operators o ON o.operator_id = r.operator_id
        WHERE ($1::BIGINT IS NULL OR r.operator_id = $1)
          AND ($2::DATE IS NULL OR r.report_date = $2)
          AND ($3::DATE IS NULL OR r.report_date >= $3)
          AND ($4::DATE IS NULL OR r.report_date <= $4)
          AND ($5::DATE IS NULL OR (r.report_date >= $5 AND r.report_date < $6))
        ORDER BY r.report_date DESC, r.slot
        "#,
    )
    .bind(q.operator_id)
    .bind(q.date)
    .bind(q.start_date)
    .bind(q.end_date)
    .bind(month_start)
    .bind(month_end)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn get_report(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ReportWithOperator>, (StatusCode, String)> {
    let row = query_as::<_, ReportWithOperator>(
        r#"
        SELECT r.report_id, r.operator_id, o.full_name AS operator_name,
               r.report_date, r.slot,
               r.calls_cumulative, r.incoming_accepted, r.outgoing_made, r.missed,
               r.minutes_on_line, r.minutes_in_calls, r.recordings,
               r.created_by, r.created_at, r.updated_at
        FROM reports r
        JOIN operators o ON o.operator_id = r.operator_id
        WHERE r.report_id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;
    row.map(Json).ok_or_else(|| not_found("report"))
}

#[derive(Deserialize)]
pub struct UpsertReportBody {
    pub operator_id: i64,
    pub report_date: NaiveDate,
    pub slot: Shift,
    #[serde(default)]
    pub calls_cumulative: i32,
    #[serde(default)]
    pub incoming_accepted: i32,
    #[serde(default)]
    pub outgoing_made: i32,
    #[serde(default)]
    pub missed: i32,
    #[serde(default)]
    pub minutes_on_line: i32,
    #[serde(default)]
    pub minutes_in_calls: i32,
    #[serde(default)]
    pub recordings: i32,
}

/// Create-or-overwrite keyed on (operator, date, slot). A second
/// submission for the same triple replaces the first; concurrent
/// submissions resolve to last-writer-wins inside the database.
pub async fn upsert_report(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(b): Json<UpsertReportBody>,
) -> Result<Json<Report>, (StatusCode, String)> {
    auth::require_manage(&claims)?;

    let counts = [
        b.calls_cumulative,
        b.incoming_accepted,
        b.outgoing_made,
        b.missed,
        b.minutes_on_line,
        b.minutes_in_calls,
        b.recordings,
    ];
    if counts.iter().any(|&v| v < 0) {
        return Err(bad_request("numeric report fields must be non-negative"));
    }

    let row = query_as::<_, Report>(
        r#"
        INSERT INTO reports(operator_id, report_date, slot,
            calls_cumulative, incoming_accepted, outgoing_made, missed,
            minutes_on_line, minutes_in_calls, recordings, created_by)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
        ON CONFLICT (operator_id, report_date, slot)
        DO UPDATE SET calls_cumulative = EXCLUDED.calls_cumulative,
                      incoming_accepted = EXCLUDED.incoming_accepted,
                      outgoing_made = EXCLUDED.outgoing_made,
                      missed = EXCLUDED.missed,
                      minutes_on_line = EXCLUDED.minutes_on_line,
                      minutes_in_calls = EXCLUDED.minutes_in_calls,
                      recordings = EXCLUDED.recordings,
                      created_by = EXCLUDED.created_by,
                      updated_at = now()
        RETURNING report_id, operator_id, report_date, slot,
                  calls_cumulative, incoming_accepted, outgoing_made, missed,
                  minutes_on_line, minutes_in_calls, recordings,
                  created_by, created_at, updated_at
        "#,
    )
    .bind(b.operator_id)
    .bind(b.report_date)
    .bind(b.slot)
    .bind(b.calls_cumulative)
    .bind(b.incoming_accepted)
    .bind(b.outgoing_made)
    .bind(b.missed)
    .bind(b.minutes_on_line)
    .bind(b.minutes_in_calls)
    .bind(b.recordings)
    .bind(claims.sub)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_report(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    auth::require_manage(&claims)?;
    let res = query(r#"DELETE FROM reports WHERE report_id = $1"#)
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(internal_error)?;
    if res.rows_affected() == 0 {
        return Err(not_found("report"));
    }
    Ok(Json(serde_json::json!({"deleted": true})))
}

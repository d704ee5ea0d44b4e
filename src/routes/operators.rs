// src/routes/operators.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::query_as;

use crate::{
    auth::{self, AuthUser},
    models::Operator,
    AppState,
};
use super::{bad_request, internal_error, not_found};

pub async fn list_operators(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Operator>>, (StatusCode, String)> {
    let rows = query_as::<_, Operator>(
        r#"SELECT operator_id, full_name, is_active, created_at
           FROM operators WHERE is_active ORDER BY full_name"#,
    )
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn get_operator(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Operator>, (StatusCode, String)> {
    let row = query_as::<_, Operator>(
        r#"SELECT operator_id, full_name, is_active, created_at
           FROM operators WHERE operator_id = $1"#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;
    row.map(Json).ok_or_else(|| not_found("operator"))
}

#[derive(Deserialize)]
pub struct CreateOperatorBody {
    pub full_name: String,
}

pub async fn create_operator(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(b): Json<CreateOperatorBody>,
) -> Result<Json<Operator>, (StatusCode, String)> {
    auth::require_manage(&claims)?;
    let full_name = b.full_name.trim();
    if full_name.is_empty() {
        return Err(bad_request("full_name is required"));
    }

    let row = query_as::<_, Operator>(
        r#"INSERT INTO operators(full_name) VALUES ($1)
           RETURNING operator_id, full_name, is_active, created_at"#,
    )
    .bind(full_name)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct RenameOperatorBody {
    pub full_name: String,
}

pub async fn rename_operator(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
    Json(b): Json<RenameOperatorBody>,
) -> Result<Json<Operator>, (StatusCode, String)> {
    auth::require_manage(&claims)?;
    let full_name = b.full_name.trim();
    if full_name.is_empty() {
        return Err(bad_request("full_name is required"));
    }

    let row = query_as::<_, Operator>(
        r#"UPDATE operators SET full_name = $2 WHERE operator_id = $1
           RETURNING operator_id, full_name, is_active, created_at"#,
    )
    .bind(id)
    .bind(full_name)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;
    row.map(Json).ok_or_else(|| not_found("operator"))
}

// Soft delete: the active flag flips so historical reports keep their
// operator reference.
pub async fn delete_operator(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    auth::require_manage(&claims)?;
    let row: Option<(i64,)> =
        query_as(r#"UPDATE operators SET is_active = FALSE WHERE operator_id = $1 RETURNING operator_id"#)
            .bind(id)
            .fetch_optional(&state.pool)
            .await
            .map_err(internal_error)?;
    match row {
        Some(_) => Ok(Json(serde_json::json!({"deleted": true}))),
        None => Err(not_found("operator")),
    }
}

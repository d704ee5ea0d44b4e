// src/routes/auth.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sqlx::query_as;

use crate::{
    auth::{self, AuthUser},
    models::{Role, User, UserInfo},
    AppState,
};
use super::{internal_error, unauthorized};

#[derive(Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResp {
    pub token: String,
    pub user: UserInfo,
}

pub async fn login(
    State(state): State<AppState>,
    Json(b): Json<LoginBody>,
) -> Result<Json<LoginResp>, (StatusCode, String)> {
    let user = query_as::<_, User>(
        r#"SELECT user_id, username, password_hash, role, is_active, created_at
           FROM users WHERE username = $1 AND is_active"#,
    )
    .bind(&b.username)
    .fetch_optional(&state.pool)
    .await
    .map_err(internal_error)?;

    // Same response for unknown user and wrong password.
    let user = match user {
        Some(u) if auth::verify_password(&b.password, &u.password_hash) => u,
        _ => {
            tracing::warn!(username = %b.username, "failed login attempt");
            return Err(unauthorized("invalid credentials"));
        }
    };

    let role = Role::parse(&user.role).ok_or_else(|| {
        internal_error(format!("unknown role '{}' on user {}", user.role, user.user_id))
    })?;
    let token =
        auth::create_token(&state.jwt, user.user_id, &user.username, role).map_err(internal_error)?;

    Ok(Json(LoginResp {
        token,
        user: UserInfo {
            user_id: user.user_id,
            username: user.username,
            role,
        },
    }))
}

pub async fn me(AuthUser(claims): AuthUser) -> Json<UserInfo> {
    Json(UserInfo {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role,
    })
}

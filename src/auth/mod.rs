// src/auth/mod.rs

//! Token issuance/verification and password digests.

use std::env;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{models::Role, routes, AppState};

const TOKEN_TTL_HOURS: i64 = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development secret");
            "callcenter-dev-secret-change-in-production".into()
        });
        Self::from_secret(secret.as_bytes())
    }
}

pub fn create_token(
    keys: &JwtKeys,
    user_id: i64,
    username: &str,
    role: Role,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp,
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, &keys.decoding, &Validation::default()).map(|data| data.claims)
}

pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(password: &str, stored_digest: &str) -> bool {
    password_digest(password) == stored_digest
}

/// Verified identity of the caller. Any handler taking this rejects
/// missing or invalid credentials with 401 before running.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| routes::unauthorized("missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| routes::unauthorized("expected bearer token"))?;
        let claims = verify_token(&state.jwt, token).map_err(|e| {
            tracing::warn!("rejected token: {e}");
            routes::unauthorized("invalid or expired token")
        })?;
        Ok(AuthUser(claims))
    }
}

/// Gate for mutating endpoints: supervisor or admin only.
pub fn require_manage(claims: &Claims) -> Result<(), (StatusCode, String)> {
    if claims.role.can_manage() {
        Ok(())
    } else {
        Err(routes::forbidden("supervisor or admin role required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let token = create_token(&keys, 7, "supervisor", Role::Supervisor).unwrap();
        let claims = verify_token(&keys, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "supervisor");
        assert_eq!(claims.role, Role::Supervisor);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let other = JwtKeys::from_secret(b"other-secret");
        let token = create_token(&keys, 7, "supervisor", Role::Supervisor).unwrap();
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn tampered_token_rejected() {
        let keys = JwtKeys::from_secret(b"test-secret");
        let mut token = create_token(&keys, 7, "supervisor", Role::Supervisor).unwrap();
        token.push('x');
        assert!(verify_token(&keys, &token).is_err());
    }

    #[test]
    fn password_digest_round_trip() {
        let digest = password_digest("admin123");
        assert_eq!(
            digest,
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
        );
        assert!(verify_password("admin123", &digest));
        assert!(!verify_password("admin124", &digest));
    }

    #[test]
    fn manage_gate_follows_role() {
        let claims = |role| Claims {
            sub: 1,
            username: "u".into(),
            role,
            exp: 0,
        };
        assert!(require_manage(&claims(Role::Admin)).is_ok());
        assert!(require_manage(&claims(Role::Supervisor)).is_ok());
        assert!(require_manage(&claims(Role::Management)).is_err());
    }
}

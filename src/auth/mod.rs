use anyhow::{Context, Result};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::config::{config_loader, config_model::AuthSecrets};

const SESSION_ISSUER: &str = "sgrpt-backend";

/// Claims of an externally issued bootstrap credential. `sub` carries the
/// durable principal identifier.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomTokenClaims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub anon: bool,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
}

/// The stable identifier every data access is scoped under for the rest of
/// the session.
#[derive(Debug, Clone, Copy)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub anonymous: bool,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub anonymous: bool,
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::UNAUTHORIZED,
            format!("Unauthorized: {}", self.0),
        )
            .into_response()
    }
}

/// Resolves the session identity from an optional bootstrap credential.
///
/// A valid custom token yields the authenticated principal; anything else
/// (absent, malformed, expired, wrong signature) is logged and falls back to
/// a freshly generated anonymous identifier, so callers always make forward
/// progress.
pub fn resolve_identity(secrets: &AuthSecrets, custom_token: Option<&str>) -> SessionIdentity {
    if let Some(token) = custom_token {
        match validate_custom_token(secrets, token) {
            Ok(claims) => match Uuid::parse_str(&claims.sub) {
                Ok(user_id) => {
                    return SessionIdentity {
                        user_id,
                        anonymous: false,
                    };
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "session: custom token sub is not a valid id, falling back to anonymous"
                    );
                }
            },
            Err(err) => {
                warn!(
                    error = %err.0,
                    "session: custom token rejected, falling back to anonymous"
                );
            }
        }
    }

    SessionIdentity {
        user_id: Uuid::new_v4(),
        anonymous: true,
    }
}

pub fn validate_custom_token(
    secrets: &AuthSecrets,
    token: &str,
) -> Result<CustomTokenClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secrets.custom_token_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<CustomTokenClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("Custom token validation failed: {}", e))?;

    Ok(token_data.claims)
}

pub fn issue_session_token(secrets: &AuthSecrets, identity: &SessionIdentity) -> Result<String> {
    let ttl = i64::try_from(secrets.session_ttl_seconds)
        .context("session_ttl_seconds is too large")?;

    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::seconds(ttl))
        .ok_or_else(|| anyhow::anyhow!("Failed to compute session expiration"))?;

    let claims = SessionClaims {
        sub: identity.user_id.to_string(),
        anon: identity.anonymous,
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
        iss: SESSION_ISSUER.to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secrets.session_secret.as_bytes()),
    )
    .context("failed to sign session token")
}

pub fn validate_session_jwt(token: &str) -> Result<SessionClaims, AuthError> {
    let secrets = config_loader::get_auth_secrets()
        .map_err(|e| anyhow::anyhow!("Failed to load auth secrets: {}", e))?;

    let decoding_key = DecodingKey::from_secret(secrets.session_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);

    let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("Session token validation failed: {}", e))?;

    Ok(token_data.claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let auth_str = auth_header.to_str().map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            )
        })?;

        if !auth_str.starts_with("Bearer ") {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = &auth_str[7..];

        let claims = validate_session_jwt(token)
            .map_err(|e| (StatusCode::UNAUTHORIZED, e.0.to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid user ID in token".to_string(),
            )
        })?;

        Ok(AuthUser {
            user_id,
            anonymous: claims.anon,
        })
    }
}

#[cfg(test)]
mod tests;

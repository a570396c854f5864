use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    auth::{issue_session_token, resolve_identity},
    config::config_loader,
};

#[derive(Debug, Deserialize)]
pub struct BootstrapSessionRequest {
    pub custom_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BootstrapSessionResponse {
    pub user_id: Uuid,
    pub session_token: String,
    pub anonymous: bool,
}

pub fn routes() -> Router {
    Router::new().route("/", post(bootstrap_session))
}

/// Exchanges an optional bootstrap credential for a session token. This
/// endpoint never rejects a caller over a bad credential: the fallback is a
/// fresh anonymous identity.
pub async fn bootstrap_session(
    Json(payload): Json<BootstrapSessionRequest>,
) -> impl IntoResponse {
    let secrets = match config_loader::get_auth_secrets() {
        Ok(secrets) => secrets,
        Err(err) => {
            error!(error = ?err, "session: auth secrets are not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to establish session".to_string(),
            )
                .into_response();
        }
    };

    let identity = resolve_identity(&secrets, payload.custom_token.as_deref());

    match issue_session_token(&secrets, &identity) {
        Ok(session_token) => {
            info!(
                user_id = %identity.user_id,
                anonymous = identity.anonymous,
                "session: session established"
            );
            Json(BootstrapSessionResponse {
                user_id: identity.user_id,
                session_token,
                anonymous: identity.anonymous,
            })
            .into_response()
        }
        Err(err) => {
            error!(
                user_id = %identity.user_id,
                error = ?err,
                "session: failed to sign session token"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to establish session".to_string(),
            )
                .into_response()
        }
    }
}

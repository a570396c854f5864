use anyhow::{Ok, Result};

use super::config_model::{App, AuthSecrets, Database, DotEnvyConfig, Server};

const DEFAULT_APP_ID: &str = "default-app-id";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let app = App {
        id: sanitize_app_id(
            &std::env::var("APP_ID").unwrap_or_else(|_| DEFAULT_APP_ID.to_string()),
        ),
    };

    Ok(DotEnvyConfig {
        server,
        database,
        app,
    })
}

pub fn get_auth_secrets() -> Result<AuthSecrets> {
    dotenvy::dotenv().ok();

    Ok(AuthSecrets {
        custom_token_secret: std::env::var("AUTH_CUSTOM_TOKEN_SECRET")
            .expect("AUTH_CUSTOM_TOKEN_SECRET is invalid"),
        session_secret: std::env::var("AUTH_SESSION_SECRET")
            .expect("AUTH_SESSION_SECRET is invalid"),
        session_ttl_seconds: std::env::var("AUTH_SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()?,
    })
}

/// Characters that are not allowed in collection path segments.
fn sanitize_app_id(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '.' | '/' | '#' | '$' | '[' | ']' => '_',
            other => other,
        })
        .collect()
}

use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const CUSTOM_SECRET: &str = "customtokensecretforunittesting123";
const SESSION_SECRET: &str = "sessionsecretforunittesting456";

fn set_env_vars() {
    unsafe {
        env::set_var("AUTH_CUSTOM_TOKEN_SECRET", CUSTOM_SECRET);
        env::set_var("AUTH_SESSION_SECRET", SESSION_SECRET);
        env::set_var("AUTH_SESSION_TTL_SECONDS", "3600");
    }
}

fn secrets() -> AuthSecrets {
    AuthSecrets {
        custom_token_secret: CUSTOM_SECRET.to_string(),
        session_secret: SESSION_SECRET.to_string(),
        session_ttl_seconds: 3600,
    }
}

fn sign_custom_token(secret: &str, sub: &str, exp: usize) -> String {
    let claims = CustomTokenClaims {
        sub: sub.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn resolves_principal_from_valid_custom_token() {
    let user_id = "123e4567-e89b-12d3-a456-426614174000";
    let token = sign_custom_token(CUSTOM_SECRET, user_id, 9999999999);

    let identity = resolve_identity(&secrets(), Some(&token));

    assert_eq!(identity.user_id.to_string(), user_id);
    assert!(!identity.anonymous);
}

#[test]
fn falls_back_to_anonymous_without_token() {
    let identity = resolve_identity(&secrets(), None);
    assert!(identity.anonymous);
}

#[test]
fn falls_back_to_anonymous_on_invalid_signature() {
    let token = sign_custom_token(
        "wrongsecret",
        "123e4567-e89b-12d3-a456-426614174000",
        9999999999,
    );

    let identity = resolve_identity(&secrets(), Some(&token));
    assert!(identity.anonymous);
}

#[test]
fn falls_back_to_anonymous_on_expired_token() {
    let token = sign_custom_token(
        CUSTOM_SECRET,
        "123e4567-e89b-12d3-a456-426614174000",
        1, // past
    );

    let identity = resolve_identity(&secrets(), Some(&token));
    assert!(identity.anonymous);
}

#[test]
fn anonymous_fallbacks_are_unique_per_resolution() {
    let first = resolve_identity(&secrets(), None);
    let second = resolve_identity(&secrets(), None);
    assert_ne!(first.user_id, second.user_id);
}

#[test]
fn session_token_round_trip() {
    set_env_vars();
    let identity = SessionIdentity {
        user_id: Uuid::new_v4(),
        anonymous: true,
    };

    let token = issue_session_token(&secrets(), &identity).unwrap();
    let claims = validate_session_jwt(&token).expect("Valid session token should pass");

    assert_eq!(claims.sub, identity.user_id.to_string());
    assert!(claims.anon);
    assert_eq!(claims.iss, SESSION_ISSUER);
}

#[test]
fn session_token_with_wrong_secret_is_rejected() {
    set_env_vars();
    let claims = SessionClaims {
        sub: Uuid::new_v4().to_string(),
        anon: false,
        exp: 9999999999,
        iat: 0,
        iss: SESSION_ISSUER.to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"wrongsecret"),
    )
    .unwrap();

    let result = validate_session_jwt(&token);
    assert!(result.is_err());
}

//! Admin sessions.
//!
//! A successful sign-in (credentials or GitHub) yields a signed HS256 token.
//! The browser keeps it in the `session` cookie; scripts can send it as a
//! Bearer token instead.

pub mod github;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{AuthConfig, MAX_SESSION_TTL_SECS};
use crate::types::{AppError, AppResult};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Credentials,
    Github,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub provider: AuthProvider,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, provider: AuthProvider, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: sub.into(),
            email,
            provider,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs.clamp(-MAX_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS)))
                .timestamp(),
        }
    }
}

pub fn issue_token(secret: &str, claims: &Claims) -> AppResult<String> {
    Ok(jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("invalid session: {}", e)))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Checks an email/password pair against the configured admin account.
///
/// bcrypt is slow on purpose, so the comparison runs on the blocking pool.
pub async fn verify_credentials(config: &AuthConfig, email: &str, password: &str) -> AppResult<bool> {
    let (Some(admin_email), Some(hash)) = (&config.admin_email, &config.admin_password_hash) else {
        return Err(AppError::Unauthorized(
            "credential sign-in is not configured".to_string(),
        ));
    };

    // The hash is checked even for an unknown email so both rejections cost the same.
    let email_matches = admin_email.trim().eq_ignore_ascii_case(email.trim());
    let hash = hash.clone();
    let password = password.to_string();
    let password_matches =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(email_matches && password_matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::PathBuf;

    fn auth_config() -> AuthConfig {
        let mut config = Config::for_local(PathBuf::from("uploads"), "test-secret").auth;
        config.admin_email = Some("Designer@Example.com".to_string());
        config.admin_password_hash = Some(bcrypt::hash("correct horse", 4).unwrap());
        config
    }

    #[test]
    fn test_token_roundtrip() {
        let claims = Claims::new("admin", Some("a@b.c".into()), AuthProvider::Credentials, 60);
        let token = issue_token("secret", &claims).unwrap();
        assert_eq!(verify_token("secret", &token).unwrap(), claims);
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::new("admin", None, AuthProvider::Github, -3600);
        let token = issue_token("secret", &claims).unwrap();
        assert!(verify_token("secret", &token).is_err());
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let config = auth_config();
        assert!(verify_credentials(&config, "designer@example.com", "correct horse").await.unwrap());
        assert!(!verify_credentials(&config, "designer@example.com", "wrong").await.unwrap());
        assert!(!verify_credentials(&config, "someone@example.com", "correct horse").await.unwrap());
    }

    #[test]
    fn test_oversized_ttl_is_capped() {
        let claims = Claims::new("admin", None, AuthProvider::Credentials, i64::MAX);
        assert_eq!(claims.exp - claims.iat, MAX_SESSION_TTL_SECS);
        let token = issue_token("secret", &claims).unwrap();
        assert_eq!(verify_token("secret", &token).unwrap(), claims);
    }

    #[tokio::test]
    async fn test_unknown_email_still_checks_the_hash() {
        let mut config = auth_config();
        config.admin_password_hash = Some("not-a-bcrypt-hash".to_string());
        // A malformed hash fails the bcrypt step, so reaching it shows the
        // check ran for the unknown email too.
        assert!(verify_credentials(&config, "someone@example.com", "correct horse").await.is_err());
        assert!(!verify_credentials(&auth_config(), "someone@example.com", "correct horse")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_credentials_not_configured() {
        let config = Config::for_local(PathBuf::from("uploads"), "s").auth;
        assert!(verify_credentials(&config, "a@b.c", "x").await.is_err());
    }
}

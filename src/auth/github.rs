// GitHub OAuth: authorize redirect, code exchange and user lookup

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::GithubOAuthConfig;
use crate::types::{AppError, AppResult};

pub const STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccessTokenResponse {
    Token {
        access_token: String,
        #[allow(dead_code)]
        token_type: String,
    },
    Error {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    pub login: String,
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Random value tying the callback to the browser that started the flow.
pub fn new_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn client_credentials(config: &GithubOAuthConfig) -> AppResult<(&str, &str)> {
    match (&config.client_id, &config.client_secret) {
        (Some(id), Some(secret)) => Ok((id.as_str(), secret.as_str())),
        _ => Err(AppError::NotFound("GitHub sign-in is not configured".to_string())),
    }
}

pub fn authorize_url(config: &GithubOAuthConfig, redirect_uri: &str, state: &str) -> AppResult<String> {
    let (client_id, _) = client_credentials(config)?;
    let url = reqwest::Url::parse_with_params(
        &format!("{}/authorize", config.oauth_url.trim_end_matches('/')),
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", "read:user user:email"),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::Internal(format!("invalid GitHub OAuth URL: {}", e)))?;
    Ok(url.to_string())
}

pub async fn exchange_code(http: &reqwest::Client, config: &GithubOAuthConfig, code: &str) -> AppResult<String> {
    let (client_id, client_secret) = client_credentials(config)?;
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("code", code),
    ];

    let response: AccessTokenResponse = http
        .post(format!("{}/access_token", config.oauth_url.trim_end_matches('/')))
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    match response {
        AccessTokenResponse::Token { access_token, .. } => Ok(access_token),
        AccessTokenResponse::Error { error, error_description } => {
            warn!(%error, "GitHub rejected the OAuth code");
            Err(AppError::Unauthorized(
                error_description.unwrap_or(error),
            ))
        }
    }
}

pub async fn fetch_user(http: &reqwest::Client, config: &GithubOAuthConfig, access_token: &str) -> AppResult<GithubUser> {
    let user = http
        .get(format!("{}/user", config.api_url.trim_end_matches('/')))
        .header("User-Agent", "atelier")
        .header("Accept", "application/vnd.github+json")
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?
        .json::<GithubUser>()
        .await?;
    info!(login = %user.login, "Fetched GitHub user");
    Ok(user)
}

/// Only logins on the allow-list may administer the site. An empty list
/// admits nobody.
pub fn is_allowed(config: &GithubOAuthConfig, login: &str) -> bool {
    config
        .allowed_logins
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(login))
}

//! Sign-in endpoints
//!
//! - `POST /api/auth/login` - email + password
//! - `POST /api/auth/logout`
//! - `GET /api/auth/session` - current session (requires one)
//! - `GET /api/auth/github` - start GitHub OAuth
//! - `GET /api/auth/github/callback` - finish GitHub OAuth

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    middleware,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{self, github, AuthProvider, Claims, SESSION_COOKIE};
use crate::config::AuthConfig;
use crate::middleware::require_admin;
use crate::models::AppState;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    let session = Router::new()
        .route("/api/auth/session", get(current_session))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/github", get(github_start))
        .route("/api/auth/github/callback", get(github_callback))
        .merge(session)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    success: bool,
    token: String,
    expires_at: String,
    user: SessionUser,
}

#[derive(Debug, Serialize)]
struct SessionUser {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    provider: AuthProvider,
}

impl From<&Claims> for SessionUser {
    fn from(claims: &Claims) -> Self {
        Self {
            name: claims.sub.clone(),
            email: claims.email.clone(),
            provider: claims.provider,
        }
    }
}

fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build()
}

fn expiry(claims: &Claims) -> String {
    Utc.timestamp_opt(claims.exp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload?;
    let auth_config = &state.config.auth;

    if !auth::verify_credentials(auth_config, &request.email, &request.password).await? {
        warn!(email = %request.email, "Rejected admin sign-in");
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    let claims = Claims::new(
        "admin",
        Some(request.email.trim().to_string()),
        AuthProvider::Credentials,
        auth_config.session_ttl_secs,
    );
    let token = auth::issue_token(&auth_config.secret, &claims)?;
    info!(email = %request.email, "Admin signed in");

    let response = SessionResponse {
        success: true,
        token: token.clone(),
        expires_at: expiry(&claims),
        user: SessionUser::from(&claims),
    };
    Ok((jar.add(session_cookie(auth_config, token)), Json(response)))
}

/// POST /api/auth/logout
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "success": true })))
}

/// GET /api/auth/session
async fn current_session(Extension(claims): Extension<Claims>) -> Json<serde_json::Value> {
    Json(json!({
        "authenticated": true,
        "expiresAt": expiry(&claims),
        "user": SessionUser::from(&claims),
    }))
}

fn github_redirect_uri(state: &AppState) -> String {
    format!(
        "{}/api/auth/github/callback",
        state.config.server.site_url.trim_end_matches('/')
    )
}

/// GET /api/auth/github
async fn github_start(State(state): State<AppState>, jar: CookieJar) -> AppResult<impl IntoResponse> {
    let csrf_state = github::new_state();
    let url = github::authorize_url(&state.config.auth.github, &github_redirect_uri(&state), &csrf_state)?;

    let cookie = Cookie::build((github::STATE_COOKIE, csrf_state))
        .path("/api/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.cookie_secure)
        .build();
    Ok((jar.add(cookie), Redirect::to(&url)))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: String,
    state: String,
}

/// GET /api/auth/github/callback
async fn github_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    params: Result<Query<CallbackParams>, axum::extract::rejection::QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let expected = jar.get(github::STATE_COOKIE).map(|c| c.value().to_string());
    if expected.as_deref() != Some(params.state.as_str()) {
        return Err(AppError::Unauthorized("OAuth state mismatch".to_string()));
    }

    let github_config = &state.config.auth.github;
    let access_token = github::exchange_code(&state.http, github_config, &params.code).await?;
    let user = github::fetch_user(&state.http, github_config, &access_token).await?;

    if !github::is_allowed(github_config, &user.login) {
        warn!(login = %user.login, "GitHub account is not on the admin allow-list");
        return Err(AppError::Unauthorized(
            "This GitHub account may not administer the site".to_string(),
        ));
    }

    let claims = Claims::new(
        user.login.clone(),
        user.email.clone(),
        AuthProvider::Github,
        state.config.auth.session_ttl_secs,
    );
    let token = auth::issue_token(&state.config.auth.secret, &claims)?;
    info!(login = %user.login, "Admin signed in with GitHub");

    let jar = jar
        .remove(Cookie::build(github::STATE_COOKIE).path("/api/auth"))
        .add(session_cookie(&state.config.auth, token));
    Ok((jar, Redirect::to("/admin")))
}

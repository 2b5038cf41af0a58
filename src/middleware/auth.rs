// Session check for admin pages and mutating API routes

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::auth::{verify_token, Claims, SESSION_COOKIE};
use crate::models::AppState;
use crate::types::AppError;

/// Bearer token first, then the `session` cookie.
fn session_token(req: &Request, jar: &CookieJar) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

/// Lets the request through with its `Claims` in the extensions, or answers
/// 401 (API) / redirects to the login page (everything else).
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let claims: Result<Claims, AppError> = session_token(&req, &jar)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
        .and_then(|token| verify_token(&state.config.auth.secret, &token));

    match claims {
        Ok(claims) => {
            debug!(user = %claims.sub, path = %req.uri().path(), "Admin request");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => {
            if req.uri().path().starts_with("/api/") {
                err.into_response()
            } else {
                Redirect::to("/login").into_response()
            }
        }
    }
}

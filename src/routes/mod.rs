//! API Routes
//!
//! This module organizes all HTTP endpoints for the site:
//! - `/api/contacts` - contact block
//! - `/api/education` - education and certificate timeline
//! - `/api/portfolio` - PDF portfolio projects
//! - `/api/upload` - PDF uploads (admin)
//! - `/api/auth` - admin sign-in
//! - `/api/health` - Health checks
//! - `/` - Static file serving (site and admin pages)

pub mod auth;
pub mod contacts;
pub mod education;
pub mod files;
pub mod health;
pub mod portfolio;
pub mod static_files;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
///
/// API routes are prefixed with `/api/` and take precedence over static
/// files, which also provide the fallback.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let api_router = Router::new()
        .merge(health::router(state.clone()))
        .merge(contacts::router(state.clone()))
        .merge(education::router(state.clone()))
        .merge(portfolio::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(auth::router(state.clone()));

    let router = Router::new()
        .merge(api_router)
        .merge(static_files::router(state.clone()))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &state.config.server.cors_allowed_origins)
}

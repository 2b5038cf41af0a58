//! Static File Serving
//!
//! Serves the built site from `PUBLIC_DIR`:
//! - `/` - `index.html`, or a small page listing the API when the site is not built
//! - `/login` - admin sign-in page
//! - `/admin/*` - admin pages, session required
//! - `/uploads/*` - uploaded PDFs (local storage only), cached for a year
//! - everything else falls through to the public directory

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::StorageProvider;
use crate::middleware::require_admin;
use crate::models::AppState;

/// Upload keys carry a timestamp, so a URL never changes content.
const UPLOAD_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

pub fn router(state: AppState) -> Router {
    let public_dir = state.config.server.public_dir.clone();
    if public_dir.is_dir() {
        info!(path = %public_dir.display(), "Serving static files");
    } else {
        warn!(path = %public_dir.display(), "Public directory not found, only the API is served");
    }

    let admin = Router::new()
        .nest_service(
            "/admin",
            ServeDir::new(public_dir.join("admin")).append_index_html_on_directories(true),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let mut router = Router::new()
        .route("/", get(serve_index))
        .route_service("/login", ServeFile::new(public_dir.join("login.html")))
        .merge(admin);

    if state.config.storage.provider == StorageProvider::Local {
        let uploads = ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static(UPLOAD_CACHE_CONTROL),
            ))
            .service(ServeDir::new(&state.config.storage.upload_dir));
        let mount = upload_mount(&state.config.storage.upload_public_base);
        router = router.nest_service(&mount, uploads);
    }

    router
        .fallback_service(ServeDir::new(&public_dir).append_index_html_on_directories(true))
        .with_state(state)
}

/// Mount point for the upload directory: the path of `UPLOAD_PUBLIC_BASE`,
/// which may be a full URL when a CDN fronts the files.
fn upload_mount(public_base: &str) -> String {
    let path = match public_base.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or("/uploads"),
        None => public_base,
    };
    let path = path.trim_end_matches('/');
    if path.is_empty() || path == "/" {
        "/uploads".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Serve the index page
async fn serve_index(State(state): State<AppState>) -> Response {
    let index = state.config.server.public_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(content) => Html(content).into_response(),
        Err(_) => (StatusCode::OK, Html(FALLBACK_HTML)).into_response(),
    }
}

const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Atelier - API Server</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 760px;
            margin: 0 auto;
            padding: 40px 20px;
            color: #2b2b2b;
        }
        code { background: #f1efe9; padding: 2px 6px; border-radius: 4px; }
        .note { border-left: 4px solid #c8a96a; padding: 10px 16px; background: #faf7f0; }
    </style>
</head>
<body>
    <h1>Atelier</h1>
    <p class="note">The site is not built yet. Put the frontend in <code>PUBLIC_DIR</code> to serve it here.</p>

    <h3>Public API</h3>
    <ul>
        <li><code>GET /api/health</code></li>
        <li><code>GET /api/contacts</code></li>
        <li><code>GET /api/education</code>, <code>GET /api/education/published</code></li>
        <li><code>GET /api/portfolio</code>, <code>GET /api/portfolio/published</code></li>
    </ul>

    <h3>Admin API</h3>
    <ul>
        <li><code>POST /api/auth/login</code>, <code>GET /api/auth/github</code></li>
        <li><code>PUT /api/contacts</code>, <code>PUT /api/education</code>, <code>PUT /api/portfolio</code></li>
        <li><code>POST /api/upload</code>, <code>GET /api/upload</code>, <code>DELETE /api/upload?key=...</code></li>
    </ul>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_mount() {
        assert_eq!(upload_mount("/uploads"), "/uploads");
        assert_eq!(upload_mount("/files/pdf/"), "/files/pdf");
        assert_eq!(upload_mount("uploads"), "/uploads");
        assert_eq!(upload_mount("https://cdn.example.com/media"), "/media");
        assert_eq!(upload_mount("https://cdn.example.com"), "/uploads");
    }
}

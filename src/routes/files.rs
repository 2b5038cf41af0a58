use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::middleware::require_admin;
use crate::models::{AppState, UploadResponse};
use crate::storage::{file_too_large, object_key, validate_upload, StoredFile, UploadedFile};
use crate::types::{AppError, AppResult};

/// Headroom over the file ceiling for the multipart framing. Bodies past it
/// are cut off while reading and answered with the same 400 as an oversize
/// file that fits.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Older admin builds post to backend-specific paths; they all reach the one
/// configured backend.
const UPLOAD_PATHS: [&str; 3] = ["/api/upload", "/api/upload-s3", "/api/upload-blob"];

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.storage.max_upload_bytes + MULTIPART_OVERHEAD;

    let mut router = Router::new();
    for path in UPLOAD_PATHS {
        router = router.route(path, get(list_files).post(upload_file).delete(delete_file));
    }

    router
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// POST /api/upload - multipart form with a `file` field
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart?;
    let max_bytes = state.config.storage.max_upload_bytes;
    let read_error = |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            file_too_large(max_bytes)
        } else {
            AppError::from(err)
        }
    };

    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(read_error)?;
        file = Some(UploadedFile {
            file_name,
            content_type,
            data,
        });
        break;
    }

    let file = validate_upload(file, max_bytes)?;
    let key = object_key(&file.file_name, Utc::now());
    let stored = state
        .files
        .upload(&key, file.data, mime::APPLICATION_PDF.as_ref())
        .await?;
    info!(key = %stored.key, size = stored.size, original = %file.file_name, "PDF uploaded");

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        key: stored.key,
        filename: file.file_name,
        size: stored.size,
    }))
}

/// GET /api/upload
async fn list_files(State(state): State<AppState>) -> AppResult<Json<Vec<StoredFile>>> {
    Ok(Json(state.files.list().await?))
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    key: Option<String>,
    url: Option<String>,
}

impl DeleteParams {
    /// The storage key, given directly or as the last segment of a file URL.
    fn key(&self) -> Option<String> {
        self.key
            .clone()
            .or_else(|| {
                self.url
                    .as_deref()
                    .and_then(|url| url.split(['?', '#']).next())
                    .and_then(|url| url.rsplit('/').next())
                    .map(str::to_string)
            })
            .filter(|key| !key.is_empty())
    }
}

/// DELETE /api/upload?key=... (or ?url=...)
///
/// Portfolio entries pointing at the file are left alone.
async fn delete_file(
    State(state): State<AppState>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Query(params) = params?;
    let key = params
        .key()
        .ok_or_else(|| AppError::InvalidRequest("key or url is required".to_string()))?;

    state.files.delete(&key).await?;
    info!(%key, "Upload deleted");

    Ok(Json(json!({ "success": true, "key": key })))
}

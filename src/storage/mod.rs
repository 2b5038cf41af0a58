//! File storage for uploaded PDFs.
//!
//! One upload contract, two backends: the local filesystem (files served
//! back under `/uploads`) and S3-compatible object storage. The backend is
//! picked once at start-up from `STORAGE_PROVIDER`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageConfig, StorageProvider};
use crate::types::{AppError, AppResult};

pub mod local;
pub mod s3_client;
pub mod validation;

pub use local::LocalStorage;
pub use s3_client::S3Storage;
pub use validation::{file_too_large, validate_upload, UploadedFile};

/// A stored object as reported back to the admin UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub key: String,
    pub url: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<StoredFile>;

    /// Stored files, newest first.
    async fn list(&self) -> AppResult<Vec<StoredFile>>;

    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    fn provider_name(&self) -> &'static str;
}

/// Replaces everything outside `[A-Za-z0-9._-]` with `-` and keeps only the
/// last path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let stem = cleaned.trim_start_matches(['.', '-']);

    if stem.is_empty() || stem.eq_ignore_ascii_case("pdf") {
        return "document.pdf".to_string();
    }
    if stem.to_ascii_lowercase().ends_with(".pdf") {
        stem.to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

/// `<unix millis>-<sanitized name>`
pub fn object_key(file_name: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp_millis(), sanitize_file_name(file_name))
}

/// Keys addressed by the admin API are single path segments.
pub fn validate_key(key: &str) -> AppResult<()> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\'])
        || key.contains("..");
    if invalid {
        return Err(AppError::InvalidRequest(format!("invalid file key '{}'", key)));
    }
    Ok(())
}

pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

/// Builds the backend selected by `STORAGE_PROVIDER`.
pub async fn connect(config: &StorageConfig) -> anyhow::Result<Arc<dyn FileStorage>> {
    match config.provider {
        StorageProvider::Local => {
            let storage = LocalStorage::new(&config.upload_dir, &config.upload_public_base);
            storage.ensure_dir().await?;
            info!(dir = %config.upload_dir.display(), "Using local file storage");
            Ok(Arc::new(storage))
        }
        StorageProvider::S3 => {
            let storage = S3Storage::new(config)?;
            info!(bucket = %config.s3_bucket, "Using S3-compatible file storage");
            Ok(Arc::new(storage))
        }
    }
}

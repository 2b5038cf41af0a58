use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::storage::FileStorage;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub files: Arc<dyn FileStorage>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, files: Arc<dyn FileStorage>) -> Self {
        Self {
            config,
            store,
            files,
            http: reqwest::Client::new(),
        }
    }
}

// API Request/Response types

/// Envelope for successful admin writes.
#[derive(Debug, Serialize)]
pub struct SaveResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SaveResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub key: String,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub store: String,
    pub store_backend: String,
    pub storage_backend: String,
}

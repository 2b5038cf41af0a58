// Atelier - content backend for a designer's portfolio site

pub mod auth;
pub mod config;
pub mod content;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
pub use types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

/// Connects the configured document store and file storage.
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let store = store::connect(&config.kv).await?;
    let files = storage::connect(&config.storage).await?;
    Ok(AppState::new(config, store, files))
}

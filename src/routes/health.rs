use axum::{extract::State, routing::get, Json, Router};
use tracing::warn;

use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

/// Always 200; a store that does not answer shows up as `"store": "unavailable"`.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.store.ping().await {
        Ok(()) => "connected",
        Err(err) => {
            warn!(error = %err, "Health check could not reach the store");
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store: store.to_string(),
        store_backend: state.store.backend_name().to_string(),
        storage_backend: state.files.provider_name().to_string(),
    })
}

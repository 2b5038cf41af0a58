use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::content::{ContactInfo, CONTACTS_KEY};
use crate::middleware::require_admin;
use crate::models::{AppState, SaveResponse};
use crate::store;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/contacts", axum::routing::put(update_contacts))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/contacts", get(get_contacts))
        .merge(admin)
        .with_state(state)
}

/// GET /api/contacts
async fn get_contacts(State(state): State<AppState>) -> Json<ContactInfo> {
    Json(store::load_or_default(state.store.as_ref(), CONTACTS_KEY).await)
}

/// PUT /api/contacts - replaces the whole document
async fn update_contacts(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<Json<SaveResponse<ContactInfo>>> {
    let Json(payload) = payload?;
    let contacts = ContactInfo::from_payload(payload)?;

    store::save(state.store.as_ref(), CONTACTS_KEY, &contacts).await?;
    info!("Contacts updated");

    Ok(Json(SaveResponse::new(contacts)))
}

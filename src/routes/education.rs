use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::content::{Direction, EducationCollection, EducationEntry, NewEducationEntry, EDUCATION_KEY};
use crate::middleware::require_admin;
use crate::models::{AppState, SaveResponse};
use crate::store;
use crate::types::AppResult;

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: Direction,
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/education", put(update_education))
        .route("/api/education/items", post(add_entry))
        .route("/api/education/items/{id}/move", post(move_entry))
        .route("/api/education/items/{id}", delete(delete_entry))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/education", get(get_education))
        .route("/api/education/published", get(get_published))
        .merge(admin)
        .with_state(state)
}

/// Current document for an admin edit. A broken store is an error here,
/// never a silent reset to the default timeline.
async fn load_for_edit(state: &AppState) -> AppResult<EducationCollection> {
    Ok(store::load(state.store.as_ref(), EDUCATION_KEY)
        .await?
        .unwrap_or_default())
}

/// GET /api/education
async fn get_education(State(state): State<AppState>) -> Json<EducationCollection> {
    Json(store::load_or_default(state.store.as_ref(), EDUCATION_KEY).await)
}

/// GET /api/education/published - active entries in display order
async fn get_published(State(state): State<AppState>) -> Json<EducationCollection> {
    let education: EducationCollection = store::load_or_default(state.store.as_ref(), EDUCATION_KEY).await;
    Json(education.published())
}

/// PUT /api/education
async fn update_education(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<Json<SaveResponse<EducationCollection>>> {
    let Json(payload) = payload?;
    let education = EducationCollection::from_payload(payload)?;

    store::save(state.store.as_ref(), EDUCATION_KEY, &education).await?;
    info!(entries = education.items.len(), "Education updated");

    Ok(Json(SaveResponse::new(education)))
}

/// POST /api/education/items
async fn add_entry(
    State(state): State<AppState>,
    payload: Result<Json<NewEducationEntry>, JsonRejection>,
) -> AppResult<Json<SaveResponse<EducationEntry>>> {
    let Json(draft) = payload?;
    let mut education = load_for_edit(&state).await?;
    let entry = education.add(draft)?;

    store::save(state.store.as_ref(), EDUCATION_KEY, &education).await?;
    info!(id = entry.id, "Education entry added");

    Ok(Json(SaveResponse::new(entry)))
}

/// POST /api/education/items/{id}/move
async fn move_entry(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> AppResult<Json<SaveResponse<EducationCollection>>> {
    let Json(request) = payload?;
    let mut education = load_for_edit(&state).await?;

    if education.move_entry(id, request.direction)? {
        store::save(state.store.as_ref(), EDUCATION_KEY, &education).await?;
        info!(id, direction = ?request.direction, "Education entry moved");
    }

    Ok(Json(SaveResponse::new(education)))
}

/// DELETE /api/education/items/{id}
async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> AppResult<Json<SaveResponse<EducationCollection>>> {
    let mut education = load_for_edit(&state).await?;
    education.remove(id)?;

    store::save(state.store.as_ref(), EDUCATION_KEY, &education).await?;
    info!(id, "Education entry deleted");

    Ok(Json(SaveResponse::new(education)))
}

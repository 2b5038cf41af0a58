use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::info;

use super::education::MoveRequest;
use crate::content::{NewProject, PortfolioCollection, Project, PORTFOLIO_KEY};
use crate::middleware::require_admin;
use crate::models::{AppState, SaveResponse};
use crate::store;
use crate::types::AppResult;

/// `/api/portfolio-s3` is kept as an alias for clients written against the
/// S3-only portfolio endpoint; both read and write the same document.
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/portfolio", put(update_portfolio))
        .route("/api/portfolio-s3", put(update_portfolio))
        .route("/api/portfolio/projects", post(add_project))
        .route("/api/portfolio/projects/{id}/move", post(move_project))
        .route("/api/portfolio/projects/{id}", delete(delete_project))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/portfolio", get(get_portfolio))
        .route("/api/portfolio-s3", get(get_portfolio))
        .route("/api/portfolio/published", get(get_published))
        .merge(admin)
        .with_state(state)
}

async fn load_for_edit(state: &AppState) -> AppResult<PortfolioCollection> {
    Ok(store::load(state.store.as_ref(), PORTFOLIO_KEY)
        .await?
        .unwrap_or_default())
}

/// GET /api/portfolio
async fn get_portfolio(State(state): State<AppState>) -> Json<PortfolioCollection> {
    Json(store::load_or_default(state.store.as_ref(), PORTFOLIO_KEY).await)
}

/// GET /api/portfolio/published
async fn get_published(State(state): State<AppState>) -> Json<PortfolioCollection> {
    let portfolio: PortfolioCollection = store::load_or_default(state.store.as_ref(), PORTFOLIO_KEY).await;
    Json(portfolio.published())
}

/// PUT /api/portfolio
async fn update_portfolio(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<Json<SaveResponse<PortfolioCollection>>> {
    let Json(payload) = payload?;
    let portfolio = PortfolioCollection::from_payload(payload)?;

    store::save(state.store.as_ref(), PORTFOLIO_KEY, &portfolio).await?;
    info!(projects = portfolio.projects.len(), "Portfolio updated");

    Ok(Json(SaveResponse::new(portfolio)))
}

/// POST /api/portfolio/projects
async fn add_project(
    State(state): State<AppState>,
    payload: Result<Json<NewProject>, JsonRejection>,
) -> AppResult<Json<SaveResponse<Project>>> {
    let Json(draft) = payload?;
    let mut portfolio = load_for_edit(&state).await?;
    let project = portfolio.add(draft)?;

    store::save(state.store.as_ref(), PORTFOLIO_KEY, &portfolio).await?;
    info!(id = project.id, pdf = %project.pdf_url, "Project added");

    Ok(Json(SaveResponse::new(project)))
}

/// POST /api/portfolio/projects/{id}/move
async fn move_project(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> AppResult<Json<SaveResponse<PortfolioCollection>>> {
    let Json(request) = payload?;
    let mut portfolio = load_for_edit(&state).await?;

    if portfolio.move_project(id, request.direction)? {
        store::save(state.store.as_ref(), PORTFOLIO_KEY, &portfolio).await?;
        info!(id, direction = ?request.direction, "Project moved");
    }

    Ok(Json(SaveResponse::new(portfolio)))
}

/// DELETE /api/portfolio/projects/{id}
///
/// Only the metadata goes; the PDF stays in storage.
async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> AppResult<Json<SaveResponse<PortfolioCollection>>> {
    let mut portfolio = load_for_edit(&state).await?;
    portfolio.remove(id)?;

    store::save(state.store.as_ref(), PORTFOLIO_KEY, &portfolio).await?;
    info!(id, "Project deleted");

    Ok(Json(SaveResponse::new(portfolio)))
}

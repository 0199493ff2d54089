//! Dashboard board endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use pushdeck_core::Environment;
use pushdeck_jobs::{BoardFilter, BoardSnapshot, DeployingSummary, JobView};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::session::SessionToken;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board))
        .route("/deploying", get(deploying))
        .route("/{env}/queued", get(queued))
        .route("/{env}/inprogress", get(inprogress))
        .route("/{env}/deployed", get(deployed))
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub repo: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<i64>,
}

impl BoardQuery {
    fn filter(self) -> Result<BoardFilter, ApiError> {
        if let Some(size) = self.page_size.filter(|s| *s <= 0) {
            return Err(ApiError::BadRequest(format!(
                "pageSize must be positive, got {}",
                size
            )));
        }
        Ok(BoardFilter {
            module: self.repo.filter(|r| !r.is_empty()),
            page_size: self.page_size,
        })
    }
}

async fn board(
    State(state): State<AppState>,
    token: SessionToken,
    Query(query): Query<BoardQuery>,
) -> Result<Json<BoardSnapshot>, ApiError> {
    let filter = query.filter()?;
    let actor = state.actor(&token).await?;
    Ok(Json(state.board.all(&filter, &actor).await?))
}

async fn deploying(State(state): State<AppState>) -> Result<Json<DeployingSummary>, ApiError> {
    Ok(Json(state.board.deploying().await?))
}

async fn queued(
    State(state): State<AppState>,
    token: SessionToken,
    Path(env): Path<String>,
) -> Result<Json<Vec<JobView>>, ApiError> {
    let env: Environment = env.parse()?;
    let actor = state.actor(&token).await?;
    Ok(Json(state.board.queued(env, &actor).await?))
}

async fn inprogress(
    State(state): State<AppState>,
    token: SessionToken,
    Path(env): Path<String>,
) -> Result<Json<Vec<JobView>>, ApiError> {
    let env: Environment = env.parse()?;
    let actor = state.actor(&token).await?;
    Ok(Json(state.board.inprogress(env, &actor).await?))
}

async fn deployed(
    State(state): State<AppState>,
    token: SessionToken,
    Path(env): Path<String>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<Vec<JobView>>, ApiError> {
    let env: Environment = env.parse()?;
    let filter = query.filter()?;
    let actor = state.actor(&token).await?;
    Ok(Json(state.board.deployed(env, &filter, &actor).await?))
}

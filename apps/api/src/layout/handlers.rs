//! Axum route handlers for layout and export.
//!
//! Layout is CPU-bound, so it runs inside `spawn_blocking` to keep the async
//! executor free.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::bracket::{layout, BracketLayout};
use crate::layout::published::{publish, PublishedBracket};
use crate::models::tournament::Tournament;
use crate::state::AppState;

/// GET /api/v1/drafts/:id/layout
pub async fn handle_get_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BracketLayout>, AppError> {
    let record = state.draft(id).await?;
    let positioned = compute_layout(&state, record.tournament).await?;
    Ok(Json(positioned))
}

/// GET /api/v1/drafts/:id/published
///
/// Flattened record for exporters and the public viewer.
pub async fn handle_get_published(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublishedBracket>, AppError> {
    let record = state.draft(id).await?;
    let tournament = record.tournament.clone();
    let positioned = compute_layout(&state, record.tournament).await?;
    Ok(Json(publish(&tournament, &positioned, Utc::now())))
}

async fn compute_layout(
    state: &AppState,
    tournament: Tournament,
) -> Result<BracketLayout, AppError> {
    let metrics = state.metrics.clone();
    let config = state.layout_config.clone();

    let positioned = tokio::task::spawn_blocking(move || {
        layout(&tournament, metrics.as_ref(), &config)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("Layout task panicked: {e}")))??;

    tracing::debug!(
        width = positioned.bounds.width,
        height = positioned.bounds.height,
        box_width = positioned.box_width,
        "Layout computed"
    );
    Ok(positioned)
}

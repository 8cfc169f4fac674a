//! Axum route handlers for the Bracket Editor.
//!
//! Each handler reads the stored draft, applies one copy-on-write edit and
//! stores the result. Nothing is written when the edit fails.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::editor::operations::{regenerate_category, swap_category, swap_saint};
use crate::errors::AppError;
use crate::models::tournament::Tournament;
use crate::state::{AppState, DraftRecord};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapCategoryRequest {
    pub new_category_key: String,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSaintRequest {
    pub new_candidate_id: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/drafts/:id/categories/:category/swap
pub async fn handle_swap_category(
    State(state): State<AppState>,
    Path((id, category)): Path<(Uuid, String)>,
    Json(request): Json<SwapCategoryRequest>,
) -> Result<Json<DraftRecord>, AppError> {
    let new_key = request.new_category_key.trim();
    if new_key.is_empty() {
        return Err(AppError::Validation("newCategoryKey cannot be empty".to_string()));
    }

    let record = state.draft(id).await?;
    let mut rng = state.rng(request.seed);
    let tournament = swap_category(
        &record.tournament,
        &category,
        new_key,
        &state.pool,
        &record.config,
        &mut rng,
    )?;
    store(&state, record, tournament).await
}

/// POST /api/v1/drafts/:id/categories/:category/regenerate
///
/// Body is optional; `{ "seed": n }` makes the re-draw reproducible.
pub async fn handle_regenerate_category(
    State(state): State<AppState>,
    Path((id, category)): Path<(Uuid, String)>,
    request: Option<Json<RegenerateRequest>>,
) -> Result<Json<DraftRecord>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let record = state.draft(id).await?;
    let mut rng = state.rng(request.seed);
    let tournament = regenerate_category(
        &record.tournament,
        &category,
        &state.pool,
        &record.config,
        &mut rng,
    )?;
    store(&state, record, tournament).await
}

/// POST /api/v1/drafts/:id/categories/:category/saints/:candidate/swap
pub async fn handle_swap_saint(
    State(state): State<AppState>,
    Path((id, category, candidate)): Path<(Uuid, String, String)>,
    Json(request): Json<SwapSaintRequest>,
) -> Result<Json<DraftRecord>, AppError> {
    let new_candidate = request.new_candidate_id.trim();
    if new_candidate.is_empty() {
        return Err(AppError::Validation("newCandidateId cannot be empty".to_string()));
    }

    let record = state.draft(id).await?;
    let tournament = swap_saint(
        &record.tournament,
        &category,
        &candidate,
        new_candidate,
        &state.pool,
    )?;
    store(&state, record, tournament).await
}

async fn store(
    state: &AppState,
    record: DraftRecord,
    tournament: Tournament,
) -> Result<Json<DraftRecord>, AppError> {
    let updated = DraftRecord {
        tournament,
        ..record
    };
    state.update_draft(updated.clone()).await?;
    Ok(Json(updated))
}

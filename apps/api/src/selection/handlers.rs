//! Axum route handlers for drafting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tournament::TournamentConfig;
use crate::selection::engine::{category_supply, select, CategorySupply};
use crate::state::{AppState, DraftRecord};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    pub year: Option<i32>,
    #[serde(default)]
    pub exclude_recent: bool,
    #[serde(default)]
    pub years_to_exclude: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    pub year: i32,
    pub categories: Vec<CategorySupply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    #[serde(flatten)]
    pub config: TournamentConfig,
    /// Seeds the sampler for a reproducible draw.
    #[serde(default)]
    pub seed: Option<u64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/categories
///
/// Catalog with the eligible-candidate count per category for the given
/// exclusion settings. Defaults to the current year.
pub async fn handle_list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoriesQuery>,
) -> Json<CategoriesResponse> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let config = TournamentConfig {
        exclude_recently_used: query.exclude_recent,
        years_to_exclude: query.years_to_exclude,
        ..TournamentConfig::for_year(year)
    };
    Json(CategoriesResponse {
        year,
        categories: category_supply(&state.pool, &config),
    })
}

/// POST /api/v1/drafts
///
/// Draws a new bracket and stores it as a draft. Any earlier draft for the
/// same year is superseded and no longer retrievable.
pub async fn handle_create_draft(
    State(state): State<AppState>,
    Json(request): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<DraftRecord>), AppError> {
    let config = request.config;
    if state.pool.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Candidate pool is empty".to_string(),
        ));
    }
    if let Some(forced) = &config.forced_categories {
        if forced.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::Validation(
                "forcedCategories cannot contain blank keys".to_string(),
            ));
        }
    }

    let mut rng = state.rng(request.seed);
    let tournament = select(&state.pool, &config, &mut rng)?;

    let record = DraftRecord {
        id: Uuid::new_v4(),
        config,
        tournament,
    };
    let superseded = state.insert_draft(record.clone()).await;
    tracing::info!(
        draft_id = %record.id,
        year = record.config.year,
        superseded = superseded.len(),
        "Draft created"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/drafts/:id
pub async fn handle_get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DraftRecord>, AppError> {
    let record = state.draft(id).await?;
    Ok(Json(record))
}

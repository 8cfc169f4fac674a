use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::layout::bracket::{default_layout_config, LayoutConfig};
use crate::layout::font_metrics::{AfmMetrics, TextMetrics};
use crate::models::candidate::Candidate;
use crate::models::tournament::{Tournament, TournamentConfig};

/// A draft plus the rules it was drawn under, so edits re-sample consistently.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub id: Uuid,
    pub config: TournamentConfig,
    pub tournament: Tournament,
}

/// In-memory drafts, at most one per year. Concurrent edits to one draft are
/// last-write-wins.
pub type DraftStore = Arc<RwLock<HashMap<Uuid, DraftRecord>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup; read-only afterwards.
    pub pool: Arc<Vec<Candidate>>,
    pub drafts: DraftStore,
    /// Headless text metrics. Default: AFM tables for the configured font.
    pub metrics: Arc<dyn TextMetrics>,
    pub layout_config: LayoutConfig,
}

impl AppState {
    pub fn new(config: Config, pool: Vec<Candidate>) -> Self {
        let layout_config = default_layout_config(config.font_family, config.font_size_px);
        AppState {
            config,
            pool: Arc::new(pool),
            drafts: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(AfmMetrics),
            layout_config,
        }
    }

    /// Request seed, then the configured seed, then OS entropy.
    pub fn rng(&self, seed: Option<u64>) -> StdRng {
        match seed.or(self.config.rng_seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub async fn draft(&self, id: Uuid) -> Result<DraftRecord, AppError> {
        self.drafts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Draft {id} not found")))
    }

    /// Stores a freshly drawn draft, superseding every earlier draft for the
    /// same year. Returns the ids that were dropped.
    pub async fn insert_draft(&self, record: DraftRecord) -> Vec<Uuid> {
        let mut drafts = self.drafts.write().await;
        let year = record.config.year;
        let superseded: Vec<Uuid> = drafts
            .values()
            .filter(|d| d.config.year == year)
            .map(|d| d.id)
            .collect();
        for id in &superseded {
            drafts.remove(id);
        }
        drafts.insert(record.id, record);
        superseded
    }

    /// Writes back an edited draft. Fails if the draft was superseded while
    /// the edit was in flight, so a stale edit cannot bring it back.
    pub async fn update_draft(&self, record: DraftRecord) -> Result<(), AppError> {
        let mut drafts = self.drafts.write().await;
        match drafts.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Draft {} was superseded",
                record.id
            ))),
        }
    }
}

//! Candidate pool loading.
//!
//! The engine only ever sees `&[Candidate]`. Where the records come from sits
//! behind `CandidateStore`; the service ships a JSON file backend.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::models::candidate::Candidate;

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Candidate>>;
}

// ────────────────────────────────────────────────────────────────────────────
// JsonFileStore
// ────────────────────────────────────────────────────────────────────────────

/// Reads a JSON array of pool records from disk.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CandidateStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Candidate>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read candidate pool {}", self.path.display()))?;
        let pool: Vec<Candidate> = serde_json::from_str(&raw)
            .with_context(|| format!("Malformed candidate pool {}", self.path.display()))?;

        check_unique_ids(&pool)?;
        info!(path = %self.path.display(), candidates = pool.len(), "Candidate pool loaded");
        Ok(pool)
    }
}

fn check_unique_ids(pool: &[Candidate]) -> Result<()> {
    let mut seen = HashSet::with_capacity(pool.len());
    for c in pool {
        if !seen.insert(c.id.as_str()) {
            bail!("Duplicate candidate id '{}' in pool", c.id);
        }
    }
    Ok(())
}

//! Selection Engine: drafts a 4 × 8 bracket from the candidate pool.
//!
//! Category resolution and per-category sampling both run through
//! `sample_category`, which the bracket editor reuses when it re-samples a
//! single quadrant. The RNG is always passed in so tests can seed it.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::BracketError;
use crate::models::candidate::Candidate;
use crate::models::tournament::{
    Category, Entrant, Quadrant, Tournament, TournamentConfig, CATEGORY_COUNT,
    ENTRANTS_PER_CATEGORY,
};
use crate::selection::catalog::{self, CategoryDef, CATALOG};
use crate::selection::sampler;

/// Random category draws attempted before giving up with `ExhaustedCategories`.
const MAX_CATEGORY_ATTEMPTS: usize = 32;

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Drafts a tournament: resolves four categories, samples eight entrants for
/// each, assigns quadrants in resolution order and builds the round skeleton.
pub fn select<R: Rng + ?Sized>(
    pool: &[Candidate],
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Tournament, BracketError> {
    let resolved = match &config.forced_categories {
        Some(keys) => resolve_forced(pool, config, keys, rng)?,
        None => resolve_random(pool, config, rng)?,
    };

    let categories: Vec<Category> = resolved
        .into_iter()
        .zip(Quadrant::ALL)
        .map(|((def, entrants), quadrant)| build_category(def, quadrant, entrants))
        .collect();

    let title = config
        .title
        .clone()
        .unwrap_or_else(|| format!("Saint Tournament {}", config.year));

    info!(
        year = config.year,
        weighting = ?config.selection_weighting,
        categories = ?categories.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
        "Drafted tournament"
    );

    Ok(Tournament::assemble(config.year, title, categories))
}

type Resolved = Vec<(&'static CategoryDef, Vec<Entrant>)>;

fn resolve_forced<R: Rng + ?Sized>(
    pool: &[Candidate],
    config: &TournamentConfig,
    keys: &[String],
    rng: &mut R,
) -> Result<Resolved, BracketError> {
    if keys.len() != CATEGORY_COUNT {
        return Err(BracketError::InvalidConfig(format!(
            "forcedCategories must name exactly {CATEGORY_COUNT} categories, got {}",
            keys.len()
        )));
    }
    let distinct: HashSet<&str> = keys.iter().map(String::as_str).collect();
    if distinct.len() != keys.len() {
        return Err(BracketError::InvalidConfig(
            "forcedCategories contains duplicates".to_string(),
        ));
    }

    let mut consumed: HashSet<&str> = HashSet::new();
    let mut resolved = Vec::with_capacity(CATEGORY_COUNT);
    for key in keys {
        let def = catalog::lookup(key)
            .ok_or_else(|| BracketError::InvalidConfig(format!("unknown category key '{key}'")))?;
        let picked = sample_candidates(pool, key, &consumed, config, rng)?;
        consumed.extend(picked.iter().map(|c| c.id.as_str()));
        resolved.push((def, seed_entrants(&picked)));
    }
    Ok(resolved)
}

/// Walks the catalog in a fresh random order per attempt, keeping every
/// category that can still supply eight candidates after earlier picks.
fn resolve_random<R: Rng + ?Sized>(
    pool: &[Candidate],
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Resolved, BracketError> {
    let none: HashSet<&str> = HashSet::new();
    let viable: Vec<&'static CategoryDef> = CATALOG
        .iter()
        .filter(|def| eligible_for(pool, def.key, &none, config).len() >= ENTRANTS_PER_CATEGORY)
        .collect();

    if viable.len() < CATEGORY_COUNT {
        return Err(BracketError::ExhaustedCategories {
            viable: viable.len(),
            filled: 0,
        });
    }

    let mut best = 0usize;
    for attempt in 1..=MAX_CATEGORY_ATTEMPTS {
        let mut order = viable.clone();
        order.shuffle(rng);

        let mut consumed: HashSet<&str> = HashSet::new();
        let mut resolved: Resolved = Vec::with_capacity(CATEGORY_COUNT);
        for def in order {
            if resolved.len() == CATEGORY_COUNT {
                break;
            }
            match sample_candidates(pool, def.key, &consumed, config, rng) {
                Ok(picked) => {
                    consumed.extend(picked.iter().map(|c| c.id.as_str()));
                    resolved.push((def, seed_entrants(&picked)));
                }
                Err(BracketError::InsufficientPool { shortfall, .. }) => {
                    debug!(category = def.key, shortfall, attempt, "Category skipped");
                }
                Err(other) => return Err(other),
            }
        }

        if resolved.len() == CATEGORY_COUNT {
            return Ok(resolved);
        }
        best = best.max(resolved.len());
        debug!(attempt, resolved = resolved.len(), "Retrying category draw");
    }

    Err(BracketError::ExhaustedCategories {
        viable: viable.len(),
        filled: best,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Per-category routine (shared with the editor)
// ────────────────────────────────────────────────────────────────────────────

/// Candidates eligible for `key`, in pool order.
///
/// A candidate qualifies when it carries the category flag, is not in
/// `consumed`, and (with the exclusion window on) was not used too recently.
pub fn eligible_for<'a>(
    pool: &'a [Candidate],
    key: &str,
    consumed: &HashSet<&str>,
    config: &TournamentConfig,
) -> Vec<&'a Candidate> {
    pool.iter()
        .filter(|c| c.is_in(key))
        .filter(|c| !consumed.contains(c.id.as_str()))
        .filter(|c| {
            !config.exclude_recently_used || !c.recently_used(config.year, config.years_to_exclude)
        })
        .collect()
}

fn sample_candidates<'a, R: Rng + ?Sized>(
    pool: &'a [Candidate],
    key: &str,
    consumed: &HashSet<&str>,
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Vec<&'a Candidate>, BracketError> {
    let eligible = eligible_for(pool, key, consumed, config);
    debug!(category = key, eligible = eligible.len(), "Sampling category");

    if eligible.len() < ENTRANTS_PER_CATEGORY {
        return Err(BracketError::InsufficientPool {
            category: key.to_string(),
            shortfall: ENTRANTS_PER_CATEGORY - eligible.len(),
        });
    }
    Ok(sampler::draw(
        &eligible,
        ENTRANTS_PER_CATEGORY,
        config.selection_weighting,
        rng,
    ))
}

/// Samples eight seeded entrants for `key`, skipping ids in `consumed`.
pub fn sample_category<R: Rng + ?Sized>(
    pool: &[Candidate],
    key: &str,
    consumed: &HashSet<&str>,
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Vec<Entrant>, BracketError> {
    let picked = sample_candidates(pool, key, consumed, config, rng)?;
    Ok(seed_entrants(&picked))
}

/// Seeds follow draw order.
fn seed_entrants(picked: &[&Candidate]) -> Vec<Entrant> {
    picked
        .iter()
        .enumerate()
        .map(|(i, c)| Entrant {
            candidate_id: c.id.clone(),
            name: c.name.clone(),
            seed: i as u8 + 1,
            image_url: c.image_url.clone(),
        })
        .collect()
}

pub fn build_category(def: &CategoryDef, quadrant: Quadrant, entrants: Vec<Entrant>) -> Category {
    Category {
        id: quadrant.slug().to_string(),
        key: def.key.to_string(),
        name: def.name.to_string(),
        color: def.color.to_string(),
        quadrant,
        entrants,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Supply report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySupply {
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub eligible: usize,
    pub viable: bool,
}

/// Eligible-candidate count per catalog category, ignoring cross-category use.
pub fn category_supply(pool: &[Candidate], config: &TournamentConfig) -> Vec<CategorySupply> {
    let none: HashSet<&str> = HashSet::new();
    CATALOG
        .iter()
        .map(|def| {
            let eligible = eligible_for(pool, def.key, &none, config).len();
            CategorySupply {
                key: def.key,
                name: def.name,
                color: def.color,
                eligible,
                viable: eligible >= ENTRANTS_PER_CATEGORY,
            }
        })
        .collect()
}

//! Bracket Editor: bounded, copy-on-write edits to a drafted tournament.
//!
//! Every operation takes the current draft by reference and returns a new
//! one. On any error the caller still holds the untouched original; on
//! success only the matches whose entrants actually change are rewritten
//! (and their tallies zeroed). The result is re-validated before it is
//! handed back.

use std::collections::HashSet;

use rand::Rng;
use tracing::info;

use crate::errors::BracketError;
use crate::invariants::validate_tournament;
use crate::models::candidate::Candidate;
use crate::models::tournament::{Entrant, Tournament, TournamentConfig};
use crate::selection::catalog;
use crate::selection::engine::sample_category;

// ────────────────────────────────────────────────────────────────────────────
// Operations
// ────────────────────────────────────────────────────────────────────────────

/// Replaces a category with a freshly sampled one for `new_key`.
///
/// The category keeps its id and quadrant. Candidates used by the other three
/// categories are excluded from the draw.
pub fn swap_category<R: Rng + ?Sized>(
    tournament: &Tournament,
    category_ref: &str,
    new_key: &str,
    pool: &[Candidate],
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Tournament, BracketError> {
    let idx = resolve_category(tournament, category_ref)?;
    let def = catalog::lookup(new_key).ok_or_else(|| {
        BracketError::InvalidConfig(format!("unknown category key '{new_key}'"))
    })?;
    let clash = tournament
        .categories
        .iter()
        .enumerate()
        .any(|(i, c)| i != idx && c.key == new_key);
    if clash {
        return Err(BracketError::InvalidConfig(format!(
            "category '{new_key}' is already in this bracket"
        )));
    }

    let entrants = resample(tournament, idx, new_key, pool, config, rng)?;
    let next = replace_category(
        tournament,
        idx,
        CategoryIdentity {
            key: def.key.to_string(),
            name: def.name.to_string(),
            color: def.color.to_string(),
        },
        entrants,
    )?;

    info!(
        category = %next.categories[idx].id,
        from = %tournament.categories[idx].key,
        to = new_key,
        "Swapped category"
    );
    Ok(next)
}

/// Re-samples all eight entrants of a category under its current key.
pub fn regenerate_category<R: Rng + ?Sized>(
    tournament: &Tournament,
    category_ref: &str,
    pool: &[Candidate],
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Tournament, BracketError> {
    let idx = resolve_category(tournament, category_ref)?;
    let current = &tournament.categories[idx];

    let entrants = resample(tournament, idx, &current.key, pool, config, rng)?;
    let identity = CategoryIdentity {
        key: current.key.clone(),
        name: current.name.clone(),
        color: current.color.clone(),
    };
    let next = replace_category(tournament, idx, identity, entrants)?;

    info!(category = %current.id, key = %current.key, "Regenerated category");
    Ok(next)
}

/// Replaces one entrant with a specific pool candidate, keeping its seed.
///
/// The exclusion window is not applied: this is an explicit admin choice.
/// Every match in any round that referenced the old candidate is pointed at
/// the new one with its votes reset.
pub fn swap_saint(
    tournament: &Tournament,
    category_ref: &str,
    candidate_id: &str,
    new_candidate_id: &str,
    pool: &[Candidate],
) -> Result<Tournament, BracketError> {
    let idx = resolve_category(tournament, category_ref)?;
    let category = &tournament.categories[idx];
    let slot = category
        .entrants
        .iter()
        .position(|e| e.candidate_id == candidate_id)
        .ok_or_else(|| {
            BracketError::UnknownReference(format!(
                "candidate '{candidate_id}' in category '{}'",
                category.key
            ))
        })?;

    let replacement = pool
        .iter()
        .find(|c| c.id == new_candidate_id)
        .ok_or_else(|| {
            BracketError::UnknownReference(format!("candidate '{new_candidate_id}'"))
        })?;

    let invalid = |reason: &str| BracketError::InvalidCandidateForCategory {
        candidate: new_candidate_id.to_string(),
        category: category.key.clone(),
        reason: reason.to_string(),
    };
    if !replacement.is_in(&category.key) {
        return Err(invalid("missing category membership"));
    }
    if tournament.entrant(new_candidate_id).is_some() {
        return Err(invalid("already used in this bracket"));
    }

    let mut next = tournament.clone();
    let entrant = &mut next.categories[idx].entrants[slot];
    entrant.candidate_id = replacement.id.clone();
    entrant.name = replacement.name.clone();
    entrant.image_url = replacement.image_url.clone();

    let mut rewritten = 0usize;
    for m in next.rounds.iter_mut().flat_map(|r| r.matches.iter_mut()) {
        if !m.references(candidate_id) {
            continue;
        }
        let swap = |slot: &Option<String>| match slot.as_deref() {
            Some(id) if id == candidate_id => Some(new_candidate_id.to_string()),
            _ => slot.clone(),
        };
        let (e1, e2) = (swap(&m.entrant1), swap(&m.entrant2));
        m.set_entrants(e1, e2);
        rewritten += 1;
    }

    validate_tournament(&next)?;
    info!(
        category = %category.id,
        from = candidate_id,
        to = new_candidate_id,
        rewritten,
        "Swapped saint"
    );
    Ok(next)
}

// ────────────────────────────────────────────────────────────────────────────
// Shared steps
// ────────────────────────────────────────────────────────────────────────────

struct CategoryIdentity {
    key: String,
    name: String,
    color: String,
}

fn resolve_category(tournament: &Tournament, reference: &str) -> Result<usize, BracketError> {
    tournament
        .find_category(reference)
        .ok_or_else(|| BracketError::UnknownReference(format!("category '{reference}'")))
}

/// Samples eight entrants for `key`, treating the other categories' entrants
/// as consumed. The category being replaced does not block its own members.
fn resample<R: Rng + ?Sized>(
    tournament: &Tournament,
    idx: usize,
    key: &str,
    pool: &[Candidate],
    config: &TournamentConfig,
    rng: &mut R,
) -> Result<Vec<Entrant>, BracketError> {
    let consumed: HashSet<&str> = tournament
        .categories
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != idx)
        .flat_map(|(_, c)| c.entrants.iter().map(|e| e.candidate_id.as_str()))
        .collect();
    sample_category(pool, key, &consumed, config, rng)
}

/// Copies the draft with category `idx` replaced and its round-1 matches
/// rewritten to the new pairings.
///
/// Anyone who played in a round-1 match whose pair changed, whether they left
/// the category or were drawn into another slot, loses every later-round
/// slot: their advancement no longer follows from the bracket.
fn replace_category(
    tournament: &Tournament,
    idx: usize,
    identity: CategoryIdentity,
    entrants: Vec<Entrant>,
) -> Result<Tournament, BracketError> {
    let mut next = tournament.clone();

    let category = &mut next.categories[idx];
    category.key = identity.key;
    category.name = identity.name;
    category.color = identity.color;
    category.entrants = entrants;

    let category_id = category.id.clone();
    let start = category.quadrant.first_match_index();
    let pairings = category.pairings();

    let mut unsettled: HashSet<String> = HashSet::new();
    let round_one = &mut next.rounds[0].matches;
    for (offset, (a, b)) in pairings.into_iter().enumerate() {
        let m = &mut round_one[start + offset];
        debug_assert_eq!(m.category_id.as_deref(), Some(category_id.as_str()));
        let (a, b) = (Some(a), Some(b));
        if m.entrant1 != a || m.entrant2 != b {
            unsettled.extend(m.entrant1.iter().chain(m.entrant2.iter()).cloned());
            unsettled.extend(a.iter().chain(b.iter()).cloned());
        }
        m.set_entrants(a, b);
    }

    for m in next.rounds.iter_mut().skip(1).flat_map(|r| r.matches.iter_mut()) {
        let clear = |slot: &Option<String>| match slot {
            Some(id) if unsettled.contains(id) => None,
            other => other.clone(),
        };
        let (e1, e2) = (clear(&m.entrant1), clear(&m.entrant2));
        m.set_entrants(e1, e2);
    }

    validate_tournament(&next)?;
    Ok(next)
}

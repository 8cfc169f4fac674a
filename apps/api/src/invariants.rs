//! Structural checks every draft must pass.
//!
//! Run after each editor operation and before layout. A failure here means a
//! bug in the engine, not bad user input, so it maps to a 500 at the edge.

use std::collections::HashSet;

use crate::errors::BracketError;
use crate::models::tournament::{Tournament, CATEGORY_COUNT, ENTRANTS_PER_CATEGORY, ROUND_COUNT};

pub fn validate_tournament(t: &Tournament) -> Result<(), BracketError> {
    check_categories(t)?;
    check_rounds(t)?;
    check_round_one_alignment(t)?;
    check_advancement(t)?;
    Ok(())
}

fn violation(msg: String) -> BracketError {
    BracketError::InvariantViolation(msg)
}

fn check_categories(t: &Tournament) -> Result<(), BracketError> {
    if t.categories.len() != CATEGORY_COUNT {
        return Err(violation(format!(
            "expected {CATEGORY_COUNT} categories, found {}",
            t.categories.len()
        )));
    }

    let quadrants: HashSet<_> = t.categories.iter().map(|c| c.quadrant).collect();
    if quadrants.len() != CATEGORY_COUNT {
        return Err(violation("categories do not cover all four quadrants".into()));
    }
    let keys: HashSet<&str> = t.categories.iter().map(|c| c.key.as_str()).collect();
    if keys.len() != CATEGORY_COUNT {
        return Err(violation("category keys repeat".into()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for c in &t.categories {
        if c.entrants.len() != ENTRANTS_PER_CATEGORY {
            return Err(violation(format!(
                "category '{}' has {} entrants",
                c.key,
                c.entrants.len()
            )));
        }
        let seeds: HashSet<u8> = c.entrants.iter().map(|e| e.seed).collect();
        let seeds_valid = seeds.len() == ENTRANTS_PER_CATEGORY
            && seeds.iter().all(|s| (1..=ENTRANTS_PER_CATEGORY as u8).contains(s));
        if !seeds_valid {
            return Err(violation(format!("category '{}' has invalid seeds", c.key)));
        }
        for e in &c.entrants {
            if !seen.insert(e.candidate_id.as_str()) {
                return Err(violation(format!(
                    "candidate '{}' appears more than once",
                    e.candidate_id
                )));
            }
        }
    }
    Ok(())
}

fn check_rounds(t: &Tournament) -> Result<(), BracketError> {
    if t.rounds.len() != ROUND_COUNT as usize {
        return Err(violation(format!(
            "expected {ROUND_COUNT} rounds, found {}",
            t.rounds.len()
        )));
    }
    for (i, round) in t.rounds.iter().enumerate() {
        let number = i as u8 + 1;
        let expected = 1usize << (ROUND_COUNT - number);
        if round.number != number || round.matches.len() != expected {
            return Err(violation(format!(
                "round {} should be round {number} with {expected} matches, has {}",
                round.number,
                round.matches.len()
            )));
        }
        if round.matches.iter().any(|m| m.round != number) {
            return Err(violation(format!("round {number} holds a foreign match")));
        }
        if number < ROUND_COUNT {
            let left = round.matches.iter().filter(|m| m.is_left_side).count();
            if left != expected / 2 {
                return Err(violation(format!(
                    "round {number} has {left} left-side matches"
                )));
            }
        }
    }
    Ok(())
}

/// Each quadrant's four round-1 matches pair its entrants 1v2, 3v4, 5v6, 7v8.
fn check_round_one_alignment(t: &Tournament) -> Result<(), BracketError> {
    let round_one = &t.rounds[0].matches;
    for c in &t.categories {
        let start = c.quadrant.first_match_index();
        for (offset, (a, b)) in c.pairings().into_iter().enumerate() {
            let m = &round_one[start + offset];
            let aligned = m.entrant1.as_deref() == Some(a.as_str())
                && m.entrant2.as_deref() == Some(b.as_str())
                && m.category_id.as_deref() == Some(c.id.as_str())
                && m.is_left_side == c.quadrant.is_left();
            if !aligned {
                return Err(violation(format!(
                    "match {} is out of step with category '{}'",
                    m.id, c.key
                )));
            }
        }
    }
    Ok(())
}

/// A later-round entrant must come out of the feeder match for its slot:
/// match `i` takes `entrant1` from match `2i` and `entrant2` from `2i + 1`
/// of the previous round.
fn check_advancement(t: &Tournament) -> Result<(), BracketError> {
    for pair in t.rounds.windows(2) {
        let (feeders, round) = (&pair[0].matches, &pair[1].matches);
        for (i, m) in round.iter().enumerate() {
            for (slot, entrant) in [&m.entrant1, &m.entrant2].into_iter().enumerate() {
                let Some(id) = entrant else { continue };
                let fed = feeders
                    .get(2 * i + slot)
                    .is_some_and(|f| f.references(id));
                if !fed {
                    return Err(violation(format!(
                        "'{id}' in match {} did not come through its feeder match",
                        m.id
                    )));
                }
            }
        }
    }
    Ok(())
}

//! Sampling strategies for filling one category's eight slots.
//!
//! All strategies draw without replacement and return candidates in draw
//! order; the caller assigns seeds from that order.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use tracing::warn;

use crate::models::candidate::Candidate;
use crate::models::tournament::SelectionWeighting;

/// Highest-to-lowest weight ratio used by popularity sampling.
const POPULARITY_SPREAD: f64 = 4.0;

/// Draws `count` candidates from `eligible` using the configured weighting.
///
/// Callers guarantee `eligible.len() >= count`; shorter inputs return every
/// candidate in a random order.
pub fn draw<'a, R: Rng + ?Sized>(
    eligible: &[&'a Candidate],
    count: usize,
    weighting: SelectionWeighting,
    rng: &mut R,
) -> Vec<&'a Candidate> {
    let count = count.min(eligible.len());
    match weighting {
        SelectionWeighting::Random => draw_uniform(eligible, count, rng),
        SelectionWeighting::Popularity => draw_by_popularity(eligible, count, rng),
        SelectionWeighting::Balanced => draw_balanced(eligible, count, rng),
    }
}

fn draw_uniform<'a, R: Rng + ?Sized>(
    pool: &[&'a Candidate],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Candidate> {
    index::sample(rng, pool.len(), count)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Linear weight in `[1, POPULARITY_SPREAD]` over the pool's popularity range.
///
/// Strictly increasing in the signal; collapses to all-ones (uniform) when every
/// signal is equal.
pub(crate) fn popularity_weights(pool: &[&Candidate]) -> Vec<f64> {
    let signals: Vec<f64> = pool.iter().map(|c| c.popularity()).collect();
    let min = signals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = signals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range <= 0.0 || !range.is_finite() {
        return vec![1.0; signals.len()];
    }
    signals
        .iter()
        .map(|s| 1.0 + (s - min) / range * (POPULARITY_SPREAD - 1.0))
        .collect()
}

fn draw_by_popularity<'a, R: Rng + ?Sized>(
    pool: &[&'a Candidate],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Candidate> {
    let weights = popularity_weights(pool);
    let indexed: Vec<usize> = (0..pool.len()).collect();

    match indexed.choose_multiple_weighted(rng, count, |&i| weights[i]) {
        Ok(picked) => picked.map(|&i| pool[i]).collect(),
        Err(e) => {
            warn!(error = %e, "Popularity weights rejected; falling back to uniform draw");
            draw_uniform(pool, count, rng)
        }
    }
}

/// Splits the pool at the popularity median and draws as evenly as supply
/// allows from each tier, then interleaves so seed pairs mix the tiers.
fn draw_balanced<'a, R: Rng + ?Sized>(
    pool: &[&'a Candidate],
    count: usize,
    rng: &mut R,
) -> Vec<&'a Candidate> {
    let (upper, lower) = split_tiers(pool, rng);

    let half = count / 2;
    let mut from_upper = half.min(upper.len());
    let from_lower = (count - from_upper).min(lower.len());
    from_upper = (count - from_lower).min(upper.len());

    let high = draw_uniform(&upper, from_upper, rng);
    let low = draw_uniform(&lower, from_lower, rng);

    let mut drawn = Vec::with_capacity(count);
    let mut high_iter = high.into_iter();
    let mut low_iter = low.into_iter();
    loop {
        match (high_iter.next(), low_iter.next()) {
            (None, None) => break,
            (h, l) => {
                drawn.extend(h);
                drawn.extend(l);
            }
        }
    }
    drawn
}

/// Upper tier holds the more popular half (rounded up). Candidates tied on
/// popularity are ordered randomly, so equal or missing signals never turn
/// into a bias on id or pool order.
pub(crate) fn split_tiers<'a, R: Rng + ?Sized>(
    pool: &[&'a Candidate],
    rng: &mut R,
) -> (Vec<&'a Candidate>, Vec<&'a Candidate>) {
    let mut ranked: Vec<&Candidate> = pool.to_vec();
    ranked.shuffle(rng);
    // Stable sort: ties keep their shuffled order.
    ranked.sort_by(|a, b| {
        b.popularity()
            .partial_cmp(&a.popularity())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let cut = ranked.len().div_ceil(2);
    let lower = ranked.split_off(cut);
    (ranked, lower)
}

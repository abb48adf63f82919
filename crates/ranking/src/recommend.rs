//! Content-based taste ranking.
//!
//! Every candidate is embedded over a vocabulary fitted on the candidate set
//! itself, then scored by its mean cosine similarity to the liked candidates.

use std::cmp::Ordering;

use zerowaste_core_types::{RecipeId, RecipeRecord};

use crate::codec::Embedder;
use crate::vector::cosine;

/// Drop every candidate whose id is disliked. Order is preserved.
pub fn exclude_disliked<'a>(
    candidates: Vec<&'a RecipeRecord>,
    disliked: &[RecipeId],
) -> Vec<&'a RecipeRecord> {
    if disliked.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|recipe| !disliked.contains(&recipe.id))
        .collect()
}

/// Positions of the liked recipes inside `candidates`, one per liked id.
///
/// Ids outside the set are ignored. A repeated like yields its position
/// again and so weighs more in the mean.
pub fn liked_positions(candidates: &[&RecipeRecord], liked: &[RecipeId]) -> Vec<usize> {
    liked
        .iter()
        .filter_map(|id| candidates.iter().position(|recipe| recipe.id == *id))
        .collect()
}

/// Mean similarity of every candidate to the candidates at `liked`.
///
/// Returns all zeros when `liked` is empty.
pub fn score_candidates(
    candidates: &[&RecipeRecord],
    liked: &[usize],
    embedder: &dyn Embedder,
) -> Vec<f64> {
    if liked.is_empty() || candidates.is_empty() {
        return vec![0.0; candidates.len()];
    }
    let vectors = embedder.embed(candidates);
    let count = liked.len() as f64;
    vectors
        .iter()
        .map(|vector| {
            let total: f64 = liked
                .iter()
                .map(|&pos| cosine(&vectors[pos], vector))
                .sum();
            total / count
        })
        .collect()
}

/// Remove disliked candidates, then order the rest by taste similarity.
///
/// With no liked recipe among the survivors the survivors come back in
/// their current order.
pub fn recommend<'a>(
    candidates: Vec<&'a RecipeRecord>,
    liked: &[RecipeId],
    disliked: &[RecipeId],
    embedder: &dyn Embedder,
) -> Vec<&'a RecipeRecord> {
    let candidates = exclude_disliked(candidates, disliked);
    let liked = liked_positions(&candidates, liked);
    if liked.is_empty() {
        return candidates;
    }

    let scores = score_candidates(&candidates, &liked, embedder);
    let mut scored: Vec<(f64, &RecipeRecord)> = scores.into_iter().zip(candidates).collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, recipe)| recipe).collect()
}

use zerowaste_core_types::RecipeRecord;

use crate::codec::features::{FeatureSpace, NormalizedIngredients};

/// Turns one candidate set into one vector per candidate, same order.
///
/// Implementations fit on the set they are given; vectors from different
/// calls are not comparable.
pub trait Embedder: Send + Sync {
    fn embed(&self, candidates: &[&RecipeRecord]) -> Vec<Vec<f64>>;
}

/// Segment membership concatenated with word counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct IngredientEmbedder;

impl Embedder for IngredientEmbedder {
    fn embed(&self, candidates: &[&RecipeRecord]) -> Vec<Vec<f64>> {
        let docs: Vec<NormalizedIngredients> = candidates
            .iter()
            .map(|recipe| NormalizedIngredients::from_recipe(recipe))
            .collect();
        let space = FeatureSpace::fit(docs.iter());
        docs.iter().map(|doc| space.encode(doc)).collect()
    }
}

//! Recipe ranking: constraint filter, expiry prioritizer, taste recommender.

use std::sync::Arc;

use tracing::debug;

use zerowaste_catalog::Catalog;
use zerowaste_core_types::RecipeId;

pub mod codec;
pub mod expiry;
pub mod filter;
pub mod query;
pub mod recommend;
pub mod vector;

pub use codec::{Embedder, IngredientEmbedder};
pub use filter::FilterCriteria;
pub use query::RankQuery;

/// Chains the three stages over a shared catalog snapshot.
#[derive(Clone)]
pub struct Ranker {
    catalog: Arc<Catalog>,
    embedder: Arc<dyn Embedder>,
}

impl Ranker {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_embedder(catalog, Arc::new(IngredientEmbedder))
    }

    pub fn with_embedder(catalog: Arc<Catalog>, embedder: Arc<dyn Embedder>) -> Self {
        Self { catalog, embedder }
    }

    /// Filter, then prioritise when expiring products were given, then
    /// recommend when liked recipes were given.
    pub fn rank(&self, query: &RankQuery) -> Vec<RecipeId> {
        let criteria = FilterCriteria::resolve(self.catalog.vocabulary(), query);
        let mut candidates = filter::filter_recipes(self.catalog.records(), &criteria);
        debug!(survivors = candidates.len(), ?criteria, "constraint filter");

        candidates = recommend::exclude_disliked(candidates, query.disliked());

        if let Some(expiring) = query.expiring() {
            candidates = expiry::prioritize_expiring(candidates, expiring);
            debug!(
                survivors = candidates.len(),
                expiring = expiring.len(),
                "expiry prioritizer"
            );
        }

        if let Some(liked) = query.liked() {
            candidates =
                recommend::recommend(candidates, liked, query.disliked(), self.embedder.as_ref());
            debug!(
                survivors = candidates.len(),
                liked = liked.len(),
                "taste recommender"
            );
        }

        candidates.into_iter().map(|recipe| recipe.id).collect()
    }
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker")
            .field("recipes", &self.catalog.len())
            .finish()
    }
}

use zerowaste_core_types::RecipeId;
use zerowaste_ranking::{RankQuery, Ranker};

use crate::error::SchedulerError;

/// Computes the ranked answer for one request. Runs on the blocking pool.
pub trait RequestExecutor: Send + Sync {
    fn execute(&self, query: &RankQuery) -> Result<Vec<RecipeId>, SchedulerError>;
}

impl RequestExecutor for Ranker {
    fn execute(&self, query: &RankQuery) -> Result<Vec<RecipeId>, SchedulerError> {
        Ok(self.rank(query))
    }
}

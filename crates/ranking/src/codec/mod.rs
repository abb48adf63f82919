pub mod embed;
pub mod features;

pub use embed::{Embedder, IngredientEmbedder};
pub use features::{FeatureSpace, NormalizedIngredients};

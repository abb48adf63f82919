use thiserror::Error;

use zerowaste_core_types::{CoreError, RecipeId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog feed: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid value `{value}` in column `{column}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("recipe id {0} appears more than once")]
    DuplicateId(RecipeId),
}

impl From<CatalogError> for CoreError {
    fn from(value: CatalogError) -> Self {
        CoreError::new(value.to_string())
    }
}

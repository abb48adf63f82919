use zerowaste_core_types::RecipeId;

/// Everything a single ranking run needs from the caller.
///
/// Optional facets follow request semantics: `None` and an empty list both
/// mean "no constraint" / "stage skipped".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankQuery {
    pub allergens: Vec<String>,
    pub preferences: Vec<String>,
    pub difficulty: Option<Vec<i64>>,
    /// Time bucket, 1..=4.
    pub time: Option<i64>,
    pub types: Option<Vec<String>>,
    pub liked: Option<Vec<RecipeId>>,
    pub disliked: Option<Vec<RecipeId>>,
    /// Most urgent first.
    pub expiring: Option<Vec<String>>,
}

impl RankQuery {
    pub fn expiring(&self) -> Option<&[String]> {
        non_empty(&self.expiring)
    }

    pub fn liked(&self) -> Option<&[RecipeId]> {
        non_empty(&self.liked)
    }

    pub fn disliked(&self) -> &[RecipeId] {
        self.disliked.as_deref().unwrap_or(&[])
    }
}

fn non_empty<T>(values: &Option<Vec<T>>) -> Option<&[T]> {
    values.as_deref().filter(|values| !values.is_empty())
}

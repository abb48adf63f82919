use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use zerowaste_core_types::RecipeRecord;

static NUMBER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());
static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Ingredient text reduced to the two token streams the recommender compares.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedIngredients {
    /// Comma segments, trimmed and lower-cased. Empty segments are kept.
    pub segments: Vec<String>,
    /// Words of two or more word characters, lower-cased, in text order.
    pub words: Vec<String>,
}

impl NormalizedIngredients {
    pub fn from_text(text: &str) -> Self {
        let stripped = NUMBER_TOKEN.replace_all(text, "");
        let segments = stripped
            .split(',')
            .map(|segment| segment.trim().to_lowercase())
            .collect();
        let lowered = stripped.to_lowercase();
        let words = WORD_TOKEN
            .find_iter(&lowered)
            .map(|word| word.as_str().to_string())
            .collect();
        Self { segments, words }
    }

    pub fn from_recipe(recipe: &RecipeRecord) -> Self {
        Self::from_text(&recipe.ingredients)
    }
}

/// Vocabulary fitted on one candidate set.
///
/// Columns are the sorted distinct segments followed by the sorted distinct
/// words, so two fits over the same candidates always agree.
#[derive(Clone, Debug, Default)]
pub struct FeatureSpace {
    segments: BTreeMap<String, usize>,
    words: BTreeMap<String, usize>,
}

impl FeatureSpace {
    pub fn fit<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedIngredients>,
    {
        let mut segments = BTreeSet::new();
        let mut words = BTreeSet::new();
        for doc in documents {
            segments.extend(doc.segments.iter().cloned());
            words.extend(doc.words.iter().cloned());
        }
        Self {
            segments: index(segments),
            words: index(words),
        }
    }

    pub fn segment_dim(&self) -> usize {
        self.segments.len()
    }

    pub fn dim(&self) -> usize {
        self.segments.len() + self.words.len()
    }

    /// Binary segment membership, then word counts. Unknown tokens are ignored.
    pub fn encode(&self, doc: &NormalizedIngredients) -> Vec<f64> {
        let offset = self.segment_dim();
        let mut vec = vec![0.0; self.dim()];
        for segment in &doc.segments {
            if let Some(idx) = self.segments.get(segment) {
                vec[*idx] = 1.0;
            }
        }
        for word in &doc.words {
            if let Some(idx) = self.words.get(word) {
                vec[offset + idx] += 1.0;
            }
        }
        vec
    }
}

fn index(tokens: BTreeSet<String>) -> BTreeMap<String, usize> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(idx, token)| (token, idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_stripped_before_tokenising() {
        let doc = NormalizedIngredients::from_text("2 Eggs, 200g Flour , milk 3");
        assert_eq!(doc.segments, vec!["eggs", "200g flour", "milk"]);
        assert_eq!(doc.words, vec!["eggs", "200g", "flour", "milk"]);
    }

    #[test]
    fn single_character_words_are_skipped() {
        let doc = NormalizedIngredients::from_text("a pinch of salt");
        assert_eq!(doc.words, vec!["pinch", "of", "salt"]);
    }

    #[test]
    fn encoding_puts_membership_before_counts() {
        let docs = [
            NormalizedIngredients::from_text("milk, oat milk"),
            NormalizedIngredients::from_text("oats"),
        ];
        let space = FeatureSpace::fit(docs.iter());
        // segments: milk, oat milk, oats | words: milk, oat, oats
        assert_eq!(space.segment_dim(), 3);
        assert_eq!(space.dim(), 6);
        assert_eq!(space.encode(&docs[0]), vec![1.0, 1.0, 0.0, 2.0, 1.0, 0.0]);
        assert_eq!(space.encode(&docs[1]), vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }
}

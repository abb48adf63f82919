use std::collections::BTreeSet;

use zerowaste_core_types::{Allergen, Flag, FlagSet, Preference, RecipeRecord};

/// Facet values the loaded catalog can actually answer for.
///
/// Request names outside this vocabulary are dropped silently, so an
/// unknown allergen never narrows or rejects a request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogVocabulary {
    pub allergens: FlagSet<Allergen>,
    pub preferences: FlagSet<Preference>,
    pub types: BTreeSet<String>,
    pub difficulties: BTreeSet<u8>,
}

impl CatalogVocabulary {
    /// Vocabulary where every allergen/preference column is considered present.
    pub fn from_records(records: &[RecipeRecord]) -> Self {
        let mut vocabulary = Self {
            allergens: FlagSet::all(),
            preferences: FlagSet::all(),
            ..Self::default()
        };
        vocabulary.observe_all(records);
        vocabulary
    }

    pub(crate) fn observe_all(&mut self, records: &[RecipeRecord]) {
        for record in records {
            self.types.insert(record.recipe_type.clone());
            self.difficulties.insert(record.difficulty);
        }
    }

    pub fn resolve_allergens<S: AsRef<str>>(&self, names: &[S]) -> FlagSet<Allergen> {
        resolve_flags::<Allergen, _>(names).intersection(&self.allergens)
    }

    pub fn resolve_preferences<S: AsRef<str>>(&self, names: &[S]) -> FlagSet<Preference> {
        resolve_flags::<Preference, _>(names).intersection(&self.preferences)
    }

    pub fn resolve_types<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if self.types.contains(name) && !resolved.iter().any(|known| known == name) {
                resolved.push(name.to_string());
            }
        }
        resolved
    }

    pub fn resolve_difficulties(&self, levels: &[i64]) -> Vec<u8> {
        let mut resolved: Vec<u8> = Vec::new();
        for level in levels {
            let Ok(level) = u8::try_from(*level) else {
                continue;
            };
            if self.difficulties.contains(&level) && !resolved.contains(&level) {
                resolved.push(level);
            }
        }
        resolved
    }
}

fn resolve_flags<F: Flag, S: AsRef<str>>(names: &[S]) -> FlagSet<F> {
    names
        .iter()
        .filter_map(|name| F::from_name(name.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> CatalogVocabulary {
        let records = vec![
            RecipeRecord::new(1, "a").with_type("Mains").with_difficulty(1),
            RecipeRecord::new(2, "b").with_type("Dessert").with_difficulty(3),
        ];
        let mut vocabulary = CatalogVocabulary::from_records(&records);
        vocabulary.allergens = [Allergen::Eggs, Allergen::Milk].into_iter().collect();
        vocabulary
    }

    #[test]
    fn unknown_allergens_are_dropped() {
        let resolved = vocabulary().resolve_allergens(&["Eggs", "Peanuts", "Dragonfruit"]);
        assert!(resolved.contains(Allergen::Eggs));
        assert!(!resolved.contains(Allergen::Peanuts));
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn unknown_types_and_difficulties_are_dropped() {
        let vocabulary = vocabulary();
        assert_eq!(
            vocabulary.resolve_types(&["Dessert", "Snack", "Dessert"]),
            vec!["Dessert".to_string()]
        );
        assert_eq!(vocabulary.resolve_difficulties(&[3, 2, -1, 300, 1]), vec![3, 1]);
    }
}

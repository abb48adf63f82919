//! Rule-based narrowing of the catalog.
//!
//! - allergens: AND, a recipe must carry none of the requested flags
//! - preferences: OR, at least one requested flag must be set
//! - type / difficulty: set membership
//! - time: `total_time` within the bucket's inclusive upper bound

use zerowaste_catalog::CatalogVocabulary;
use zerowaste_core_types::{Allergen, FlagSet, Preference, RecipeRecord};

use crate::query::RankQuery;

/// Inclusive upper bound in minutes for a time bucket.
pub fn time_limit(bucket: i64) -> Option<u32> {
    match bucket {
        1 => Some(30),
        2 => Some(60),
        3 => Some(120),
        4 => Some(180),
        _ => None,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    pub allergens: FlagSet<Allergen>,
    pub preferences: FlagSet<Preference>,
    pub types: Vec<String>,
    pub difficulties: Vec<u8>,
    pub max_minutes: Option<u32>,
}

impl FilterCriteria {
    /// Resolve request names against the catalog vocabulary, dropping unknowns.
    pub fn resolve(vocabulary: &CatalogVocabulary, query: &RankQuery) -> Self {
        Self {
            allergens: vocabulary.resolve_allergens(&query.allergens),
            preferences: vocabulary.resolve_preferences(&query.preferences),
            types: query
                .types
                .as_deref()
                .map(|types| vocabulary.resolve_types(types))
                .unwrap_or_default(),
            difficulties: query
                .difficulty
                .as_deref()
                .map(|levels| vocabulary.resolve_difficulties(levels))
                .unwrap_or_default(),
            max_minutes: query.time.and_then(time_limit),
        }
    }

    pub fn accepts(&self, recipe: &RecipeRecord) -> bool {
        if recipe.allergens.intersects(&self.allergens) {
            return false;
        }
        if !self.preferences.is_empty() && !recipe.preferences.intersects(&self.preferences) {
            return false;
        }
        if !self.types.is_empty() && !self.types.iter().any(|t| *t == recipe.recipe_type) {
            return false;
        }
        if !self.difficulties.is_empty() && !self.difficulties.contains(&recipe.difficulty) {
            return false;
        }
        match self.max_minutes {
            Some(limit) => recipe.total_time <= limit,
            None => true,
        }
    }
}

/// Keep the candidates `criteria` accepts, in their original order.
pub fn filter_recipes<'a, I>(candidates: I, criteria: &FilterCriteria) -> Vec<&'a RecipeRecord>
where
    I: IntoIterator<Item = &'a RecipeRecord>,
{
    candidates
        .into_iter()
        .filter(|recipe| criteria.accepts(recipe))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zerowaste_catalog::Catalog;
    use zerowaste_core_types::RecipeId;

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            RecipeRecord::new(1, "eggs, flour")
                .with_allergen(Allergen::Eggs)
                .with_allergen(Allergen::Cereals)
                .with_preference(Preference::Vegetarian)
                .with_type("Dessert")
                .with_difficulty(2)
                .with_total_time(45),
            RecipeRecord::new(2, "tofu, rice")
                .with_allergen(Allergen::Soybeans)
                .with_preference(Preference::Vegan)
                .with_preference(Preference::DairyFree)
                .with_type("Mains")
                .with_difficulty(1)
                .with_total_time(25),
            RecipeRecord::new(3, "salmon, butter")
                .with_allergen(Allergen::Fish)
                .with_allergen(Allergen::Milk)
                .with_type("Mains")
                .with_difficulty(3)
                .with_total_time(150),
            RecipeRecord::new(4, "lettuce, tomato")
                .with_preference(Preference::Vegan)
                .with_preference(Preference::GlutenFree)
                .with_type("Starter")
                .with_difficulty(1)
                .with_total_time(10),
        ])
        .unwrap()
    }

    fn run(query: &RankQuery) -> Vec<u32> {
        let catalog = catalog();
        let criteria = FilterCriteria::resolve(catalog.vocabulary(), query);
        filter_recipes(catalog.records(), &criteria)
            .into_iter()
            .map(|recipe| recipe.id.0)
            .collect()
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        assert_eq!(run(&RankQuery::default()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn allergens_are_anded() {
        let query = RankQuery {
            allergens: vec!["Eggs".into(), "Fish".into()],
            ..RankQuery::default()
        };
        assert_eq!(run(&query), vec![2, 4]);
    }

    #[test]
    fn no_survivor_carries_a_requested_allergen() {
        let catalog = catalog();
        for allergen in [Allergen::Eggs, Allergen::Milk, Allergen::Soybeans, Allergen::Cereals] {
            let query = RankQuery {
                allergens: vec![zerowaste_core_types::Flag::name(allergen).to_string()],
                ..RankQuery::default()
            };
            let criteria = FilterCriteria::resolve(catalog.vocabulary(), &query);
            for recipe in filter_recipes(catalog.records(), &criteria) {
                assert!(!recipe.allergens.contains(allergen));
            }
        }
    }

    #[test]
    fn preferences_are_ored() {
        let query = RankQuery {
            preferences: vec!["Vegetarian".into(), "Gluten-Free".into()],
            ..RankQuery::default()
        };
        assert_eq!(run(&query), vec![1, 4]);
    }

    #[test]
    fn unknown_names_apply_no_constraint() {
        let query = RankQuery {
            allergens: vec!["Unicorn".into()],
            preferences: vec!["Carnivore".into()],
            types: Some(vec!["Brunch".into()]),
            difficulty: Some(vec![9]),
            ..RankQuery::default()
        };
        assert_eq!(run(&query), vec![1, 2, 3, 4]);
    }

    #[test]
    fn type_and_difficulty_are_set_membership() {
        let query = RankQuery {
            types: Some(vec!["Mains".into(), "Starter".into()]),
            difficulty: Some(vec![1]),
            ..RankQuery::default()
        };
        assert_eq!(run(&query), vec![2, 4]);
    }

    #[test]
    fn time_buckets_are_inclusive_upper_bounds() {
        let with_time = |bucket| RankQuery {
            time: Some(bucket),
            ..RankQuery::default()
        };
        assert_eq!(run(&with_time(1)), vec![2, 4]);
        assert_eq!(run(&with_time(2)), vec![1, 2, 4]);
        assert_eq!(run(&with_time(3)), vec![1, 2, 4]);
        assert_eq!(run(&with_time(4)), vec![1, 2, 3, 4]);
        assert_eq!(run(&with_time(7)), vec![1, 2, 3, 4]);

        let catalog = catalog();
        for bucket in 1..=4 {
            let limit = time_limit(bucket).unwrap();
            let criteria = FilterCriteria::resolve(catalog.vocabulary(), &with_time(bucket));
            for recipe in filter_recipes(catalog.records(), &criteria) {
                assert!(recipe.total_time <= limit);
            }
        }
    }

    #[test]
    fn exact_bound_survives() {
        let catalog = Catalog::from_records(vec![
            RecipeRecord::new(1, "x").with_total_time(30),
            RecipeRecord::new(2, "y").with_total_time(31),
        ])
        .unwrap();
        let query = RankQuery {
            time: Some(1),
            ..RankQuery::default()
        };
        let criteria = FilterCriteria::resolve(catalog.vocabulary(), &query);
        let ids: Vec<RecipeId> = filter_recipes(catalog.records(), &criteria)
            .into_iter()
            .map(|recipe| recipe.id)
            .collect();
        assert_eq!(ids, vec![RecipeId(1)]);
    }
}

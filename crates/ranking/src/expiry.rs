//! Urgency reordering against the user's expiring products.

use std::cmp::Reverse;

use zerowaste_core_types::RecipeRecord;

/// Packaging-size qualifier that must not count as the product itself.
const SIZE_QUALIFIER: &str = "mini ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryScore {
    /// Distinct expiring products found in the ingredient text.
    pub match_count: usize,
    /// Urgency index of the first matching product, or the list length.
    pub priority: usize,
}

/// Trim and lower-case names, keeping their urgency positions.
pub fn normalize_expiring<S: AsRef<str>>(expiring: &[S]) -> Vec<String> {
    expiring
        .iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .collect()
}

/// True when `needle` occurs in `haystack` at least once without the
/// size qualifier directly in front of it.
pub fn contains_unqualified(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(found) = haystack[from..].find(needle) {
        let start = from + found;
        if !haystack[..start].ends_with(SIZE_QUALIFIER) {
            return true;
        }
        // Step one char past the match start to catch overlapping occurrences.
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    false
}

/// Score one recipe against already normalised expiring names.
pub fn score_recipe(recipe: &RecipeRecord, expiring: &[String]) -> ExpiryScore {
    let text = recipe.ingredients.to_lowercase();
    let mut seen: Vec<&str> = Vec::new();
    let mut priority = expiring.len();
    for (idx, name) in expiring.iter().enumerate() {
        if !contains_unqualified(&text, name) {
            continue;
        }
        if priority == expiring.len() {
            priority = idx;
        }
        if !seen.contains(&name.as_str()) {
            seen.push(name);
        }
    }
    ExpiryScore {
        match_count: seen.len(),
        priority,
    }
}

/// Stable reorder by `(match_count desc, priority asc)`. Never drops a recipe.
pub fn prioritize_expiring<'a, S: AsRef<str>>(
    candidates: Vec<&'a RecipeRecord>,
    expiring: &[S],
) -> Vec<&'a RecipeRecord> {
    let expiring = normalize_expiring(expiring);
    let mut scored: Vec<(ExpiryScore, &RecipeRecord)> = candidates
        .into_iter()
        .map(|recipe| (score_recipe(recipe, &expiring), recipe))
        .collect();
    scored.sort_by_key(|(score, _)| (Reverse(score.match_count), score.priority));
    scored.into_iter().map(|(_, recipe)| recipe).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        normalize_expiring(list)
    }

    #[test]
    fn size_qualifier_does_not_count() {
        let expiring = names(&["mozzarella", "milk"]);
        let mini = RecipeRecord::new(1, "mini mozzarella, basil");
        assert_eq!(
            score_recipe(&mini, &expiring),
            ExpiryScore {
                match_count: 0,
                priority: 2
            }
        );

        let fresh = RecipeRecord::new(2, "fresh mozzarella, milk");
        assert_eq!(
            score_recipe(&fresh, &expiring),
            ExpiryScore {
                match_count: 2,
                priority: 0
            }
        );
    }

    #[test]
    fn unqualified_occurrence_elsewhere_still_matches() {
        assert!(contains_unqualified("mini cheese, cheese sauce", "cheese"));
        assert!(!contains_unqualified("mini cheese", "cheese"));
        assert!(contains_unqualified("cheesecake", "cheese"));
    }

    #[test]
    fn matching_is_case_insensitive_and_blank_names_never_match() {
        let expiring = names(&["  ", " Cheddar "]);
        let recipe = RecipeRecord::new(1, "Mature CHEDDAR, bread");
        assert_eq!(
            score_recipe(&recipe, &expiring),
            ExpiryScore {
                match_count: 1,
                priority: 1
            }
        );
    }

    #[test]
    fn repeated_names_count_once() {
        let expiring = names(&["egg", "egg", "flour"]);
        let recipe = RecipeRecord::new(1, "egg, flour");
        assert_eq!(score_recipe(&recipe, &expiring).match_count, 2);
    }

    #[test]
    fn sort_prefers_more_matches_then_urgency_then_input_order() {
        let records = [
            RecipeRecord::new(1, "bread"),
            RecipeRecord::new(2, "milk, bread"),
            RecipeRecord::new(3, "spinach, milk"),
            RecipeRecord::new(4, "spinach"),
            RecipeRecord::new(5, "oats, milk"),
        ];
        let ranked = prioritize_expiring(records.iter().collect(), &["spinach", "milk"]);
        let ids: Vec<u32> = ranked.iter().map(|recipe| recipe.id.0).collect();
        assert_eq!(ids, vec![3, 4, 2, 5, 1]);
    }

    #[test]
    fn nothing_is_dropped() {
        let records = [RecipeRecord::new(1, "a"), RecipeRecord::new(2, "b")];
        let ranked = prioritize_expiring(records.iter().collect(), &["zzz"]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id.0, 1);
    }
}

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

pub mod facets;

pub use facets::{Allergen, Flag, FlagSet, Preference};

/// Shared error type that every crate error converts into.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("{message}")]
    Message { message: String },
}

impl CoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

#[cfg_attr(
    feature = "serde-full",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RecipeId(pub u32);

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RecipeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Identifies one upstream connection; responses go back to the session a
/// request arrived on.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One immutable row of the recipe catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub name: String,
    /// Free-form, comma separated ingredient text.
    pub ingredients: String,
    pub allergens: FlagSet<Allergen>,
    pub preferences: FlagSet<Preference>,
    pub recipe_type: String,
    pub difficulty: u8,
    /// Total preparation time in minutes.
    pub total_time: u32,
}

impl RecipeRecord {
    pub fn new(id: u32, ingredients: impl Into<String>) -> Self {
        Self {
            id: RecipeId(id),
            name: String::new(),
            ingredients: ingredients.into(),
            allergens: FlagSet::new(),
            preferences: FlagSet::new(),
            recipe_type: String::new(),
            difficulty: 1,
            total_time: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_allergen(mut self, allergen: Allergen) -> Self {
        self.allergens.insert(allergen);
        self
    }

    pub fn with_preference(mut self, preference: Preference) -> Self {
        self.preferences.insert(preference);
        self
    }

    pub fn with_type(mut self, recipe_type: impl Into<String>) -> Self {
        self.recipe_type = recipe_type.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_total_time(mut self, minutes: u32) -> Self {
        self.total_time = minutes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags() {
        let record = RecipeRecord::new(7, "eggs, flour")
            .with_allergen(Allergen::Eggs)
            .with_preference(Preference::Vegetarian)
            .with_type("Dessert")
            .with_total_time(45);

        assert_eq!(record.id, RecipeId(7));
        assert!(record.allergens.contains(Allergen::Eggs));
        assert!(!record.allergens.contains(Allergen::Milk));
        assert!(record.preferences.contains(Preference::Vegetarian));
        assert_eq!(record.total_time, 45);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[cfg(feature = "serde-full")]
    #[test]
    fn recipe_id_serializes_as_integer() {
        let encoded = serde_json::to_string(&vec![RecipeId(3), RecipeId(11)]).unwrap();
        assert_eq!(encoded, "[3,11]");
        let decoded: Vec<RecipeId> = serde_json::from_str("[5]").unwrap();
        assert_eq!(decoded, vec![RecipeId(5)]);
    }
}

//! Fixed facet vocabularies carried as boolean columns by the catalog.

use std::fmt;
use std::marker::PhantomData;

/// A closed enum whose variants map onto distinct bits of a [`FlagSet`].
pub trait Flag: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn index(self) -> usize;

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|flag| flag.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Allergen {
    Celery,
    Cereals,
    Crustaceans,
    Eggs,
    Fish,
    Lupin,
    Milk,
    Molluscs,
    Mustard,
    Peanuts,
    Sesame,
    Soybeans,
    Sulphur,
}

impl Flag for Allergen {
    const ALL: &'static [Self] = &[
        Allergen::Celery,
        Allergen::Cereals,
        Allergen::Crustaceans,
        Allergen::Eggs,
        Allergen::Fish,
        Allergen::Lupin,
        Allergen::Milk,
        Allergen::Molluscs,
        Allergen::Mustard,
        Allergen::Peanuts,
        Allergen::Sesame,
        Allergen::Soybeans,
        Allergen::Sulphur,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Allergen::Celery => "Celery",
            Allergen::Cereals => "Cereals",
            Allergen::Crustaceans => "Crustaceans",
            Allergen::Eggs => "Eggs",
            Allergen::Fish => "Fish",
            Allergen::Lupin => "Lupin",
            Allergen::Milk => "Milk",
            Allergen::Molluscs => "Molluscs",
            Allergen::Mustard => "Mustard",
            Allergen::Peanuts => "Peanuts",
            Allergen::Sesame => "Sesame",
            Allergen::Soybeans => "Soybeans",
            Allergen::Sulphur => "Sulphur",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Preference {
    DairyFree,
    GlutenFree,
    Vegan,
    Vegetarian,
}

impl Flag for Preference {
    const ALL: &'static [Self] = &[
        Preference::DairyFree,
        Preference::GlutenFree,
        Preference::Vegan,
        Preference::Vegetarian,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Preference::DairyFree => "Dairy-Free",
            Preference::GlutenFree => "Gluten-Free",
            Preference::Vegan => "Vegan",
            Preference::Vegetarian => "Vegetarian",
        }
    }
}

/// Bit set over a [`Flag`] enum. Supports up to 32 variants.
pub struct FlagSet<F: Flag> {
    bits: u32,
    _flag: PhantomData<F>,
}

impl<F: Flag> FlagSet<F> {
    pub const fn new() -> Self {
        Self {
            bits: 0,
            _flag: PhantomData,
        }
    }

    pub fn all() -> Self {
        F::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, flag: F) {
        self.bits |= 1 << flag.index();
    }

    pub fn remove(&mut self, flag: F) {
        self.bits &= !(1 << flag.index());
    }

    pub fn contains(&self, flag: F) -> bool {
        self.bits & (1 << flag.index()) != 0
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.bits & other.bits != 0
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
            _flag: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        F::ALL.iter().copied().filter(|flag| self.contains(*flag))
    }
}

impl<F: Flag> Clone for FlagSet<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: Flag> Copy for FlagSet<F> {}

impl<F: Flag> PartialEq for FlagSet<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F: Flag> Eq for FlagSet<F> {}

impl<F: Flag> Default for FlagSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Flag> fmt::Debug for FlagSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Flag::name)).finish()
    }
}

impl<F: Flag> FromIterator<F> for FlagSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        let mut set = Self::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

//! Read-only recipe catalog.
//!
//! The catalog is loaded once at startup from the external tabular feed and
//! shared by every worker behind an `Arc`. Nothing mutates it after load, so
//! readers never lock.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use zerowaste_core_types::{Flag, RecipeId, RecipeRecord};

pub mod errors;
pub mod loader;
pub mod vocabulary;

pub use errors::CatalogError;
pub use vocabulary::CatalogVocabulary;

#[derive(Debug)]
pub struct Catalog {
    records: Vec<RecipeRecord>,
    by_id: HashMap<RecipeId, usize>,
    vocabulary: CatalogVocabulary,
}

impl Catalog {
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            recipes = catalog.len(),
            allergens = ?catalog.vocabulary.allergens.iter().map(Flag::name).collect::<Vec<_>>(),
            preferences = ?catalog.vocabulary.preferences.iter().map(Flag::name).collect::<Vec<_>>(),
            types = catalog.vocabulary.types.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let (records, vocabulary) = loader::read_records(reader)?;
        Self::with_vocabulary(records, vocabulary)
    }

    /// Build a snapshot from in-memory records; every facet flag counts as known.
    pub fn from_records(records: Vec<RecipeRecord>) -> Result<Self, CatalogError> {
        let vocabulary = CatalogVocabulary::from_records(&records);
        Self::with_vocabulary(records, vocabulary)
    }

    pub fn with_vocabulary(
        records: Vec<RecipeRecord>,
        vocabulary: CatalogVocabulary,
    ) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_id.insert(record.id, idx).is_some() {
                return Err(CatalogError::DuplicateId(record.id));
            }
        }
        Ok(Self {
            records,
            by_id,
            vocabulary,
        })
    }

    /// Records in feed order.
    pub fn records(&self) -> &[RecipeRecord] {
        &self.records
    }

    pub fn get(&self, id: RecipeId) -> Option<&RecipeRecord> {
        self.by_id.get(&id).map(|idx| &self.records[*idx])
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn vocabulary(&self) -> &CatalogVocabulary {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use zerowaste_core_types::Allergen;

    #[test]
    fn duplicate_ids_are_rejected() {
        let records = vec![
            RecipeRecord::new(1, "eggs"),
            RecipeRecord::new(2, "milk"),
            RecipeRecord::new(1, "flour"),
        ];
        let err = Catalog::from_records(records).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(RecipeId(1))));
    }

    #[test]
    fn lookup_by_id_preserves_feed_order() {
        let catalog = Catalog::from_records(vec![
            RecipeRecord::new(10, "eggs"),
            RecipeRecord::new(4, "milk"),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].id, RecipeId(10));
        assert_eq!(catalog.get(RecipeId(4)).unwrap().ingredients, "milk");
        assert!(catalog.get(RecipeId(99)).is_none());
        assert!(catalog.contains(RecipeId(10)));
    }

    #[test]
    fn loads_snapshot_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Id,Ingredients,Type,Difficulty,Total time,Eggs").unwrap();
        writeln!(file, "1,\"eggs, cheese\",Mains,1,20,1").unwrap();
        writeln!(file, "2,\"cheese, bread\",Mains,1,20,0").unwrap();
        file.flush().unwrap();

        let catalog = Catalog::load_csv(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog
            .get(RecipeId(1))
            .unwrap()
            .allergens
            .contains(Allergen::Eggs));
        assert!(catalog.vocabulary().allergens.contains(Allergen::Eggs));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Catalog::load_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}

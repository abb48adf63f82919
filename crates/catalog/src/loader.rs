//! Tabular feed decoding.
//!
//! The feed is a CSV export of the recipe sheet: fixed descriptive columns
//! plus one boolean column per allergen and per dietary preference. Only
//! the flag columns that actually appear in the header become part of the
//! catalog vocabulary.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};

use zerowaste_core_types::{Allergen, Flag, FlagSet, Preference, RecipeId, RecipeRecord};

use crate::errors::CatalogError;
use crate::vocabulary::CatalogVocabulary;

const COL_ID: &str = "id";
const COL_NAME: &str = "name";
const COL_INGREDIENTS: &str = "ingredients";
const COL_TYPE: &str = "type";
const COL_DIFFICULTY: &str = "difficulty";
const COL_TOTAL_TIME: &str = "total time";

struct ColumnMap {
    id: usize,
    name: Option<usize>,
    ingredients: usize,
    recipe_type: usize,
    difficulty: usize,
    total_time: usize,
    allergens: Vec<(usize, Allergen)>,
    preferences: Vec<(usize, Preference)>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, CatalogError> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(wanted))
        };
        let require = |wanted: &'static str| find(wanted).ok_or(CatalogError::MissingColumn(wanted));

        let mut allergens = Vec::new();
        let mut preferences = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(allergen) = Allergen::from_name(header) {
                allergens.push((idx, allergen));
            } else if let Some(preference) = Preference::from_name(header) {
                preferences.push((idx, preference));
            }
        }

        Ok(Self {
            id: require(COL_ID)?,
            name: find(COL_NAME),
            ingredients: require(COL_INGREDIENTS)?,
            recipe_type: require(COL_TYPE)?,
            difficulty: require(COL_DIFFICULTY)?,
            total_time: require(COL_TOTAL_TIME)?,
            allergens,
            preferences,
        })
    }

    fn vocabulary(&self) -> CatalogVocabulary {
        CatalogVocabulary {
            allergens: self.allergens.iter().map(|(_, flag)| *flag).collect(),
            preferences: self.preferences.iter().map(|(_, flag)| *flag).collect(),
            ..CatalogVocabulary::default()
        }
    }
}

struct Row<'a> {
    number: usize,
    record: &'a StringRecord,
    headers: &'a StringRecord,
}

impl Row<'_> {
    fn text(&self, idx: usize) -> &str {
        self.record.get(idx).map(str::trim).unwrap_or("")
    }

    fn invalid(&self, idx: usize) -> CatalogError {
        CatalogError::InvalidValue {
            row: self.number,
            column: self.headers.get(idx).unwrap_or("?").trim().to_string(),
            value: self.text(idx).to_string(),
        }
    }

    fn integer(&self, idx: usize) -> Result<u64, CatalogError> {
        let raw = self.text(idx);
        if let Ok(value) = raw.parse::<u64>() {
            return Ok(value);
        }
        // Spreadsheet exports sometimes render integers as `30.0`.
        match raw.parse::<f64>() {
            Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
                Ok(value as u64)
            }
            _ => Err(self.invalid(idx)),
        }
    }

    fn flag(&self, idx: usize) -> Result<bool, CatalogError> {
        let raw = self.text(idx);
        if raw.is_empty() {
            return Ok(false);
        }
        match raw.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" | "yes" => Ok(true),
            "0" | "0.0" | "false" | "no" => Ok(false),
            _ => Err(self.invalid(idx)),
        }
    }

    fn flags<F: Flag>(&self, columns: &[(usize, F)]) -> Result<FlagSet<F>, CatalogError> {
        let mut set = FlagSet::new();
        for (idx, flag) in columns {
            if self.flag(*idx)? {
                set.insert(*flag);
            }
        }
        Ok(set)
    }
}

/// Decode every row of a CSV feed into typed records.
pub fn read_records<R: Read>(
    reader: R,
) -> Result<(Vec<RecipeRecord>, CatalogVocabulary), CatalogError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut records = Vec::new();
    for (offset, result) in reader.records().enumerate() {
        let raw = result?;
        let row = Row {
            // Header is line 1.
            number: offset + 2,
            record: &raw,
            headers: &headers,
        };

        let id = u32::try_from(row.integer(columns.id)?).map_err(|_| row.invalid(columns.id))?;
        let difficulty = u8::try_from(row.integer(columns.difficulty)?)
            .map_err(|_| row.invalid(columns.difficulty))?;
        let total_time = u32::try_from(row.integer(columns.total_time)?)
            .map_err(|_| row.invalid(columns.total_time))?;

        records.push(RecipeRecord {
            id: RecipeId(id),
            name: columns
                .name
                .map(|idx| row.text(idx).to_string())
                .unwrap_or_default(),
            ingredients: row.text(columns.ingredients).to_string(),
            allergens: row.flags(&columns.allergens)?,
            preferences: row.flags(&columns.preferences)?,
            recipe_type: row.text(columns.recipe_type).to_string(),
            difficulty,
            total_time,
        });
    }

    let mut vocabulary = columns.vocabulary();
    vocabulary.observe_all(&records);
    Ok((records, vocabulary))
}

//! Static storage contract for pet records.
//!
//! # Responsibility
//! - Single source of truth for table/column names and resource shapes.
//! - Carry the table configuration explicitly into the record store.
//!
//! # Invariants
//! - Column names are fixed; only the table name is configurable.
//! - A configured table name is always a plain SQL identifier, so it can be
//!   interpolated into statements without quoting.

use crate::model::pet::PetValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

pub use crate::model::pet::is_valid_gender;

/// Authority that identifies the pet resource space.
pub const CONTENT_AUTHORITY: &str = "com.example.android.pets";
/// Path segment for the pet collection.
pub const PATH_PETS: &str = "pets";
/// Default table name.
pub const DEFAULT_TABLE_NAME: &str = "pets";

const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";
const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

static SQL_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Column addressable from filters and sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetColumn {
    Id,
    Name,
    Breed,
    Gender,
    Weight,
}

impl PetColumn {
    /// All columns in table order.
    pub const ALL: [PetColumn; 5] = [
        PetColumn::Id,
        PetColumn::Name,
        PetColumn::Breed,
        PetColumn::Gender,
        PetColumn::Weight,
    ];

    /// Persisted column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Name => "name",
            Self::Breed => "breed",
            Self::Gender => "gender",
            Self::Weight => "weight",
        }
    }
}

/// The two addressable resource shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceShape {
    /// Zero or more records.
    Collection,
    /// Exactly one record by id.
    Item,
}

impl ResourceShape {
    /// Content type string for this shape, e.g. for UI intent routing.
    pub fn content_type(self) -> String {
        let base = match self {
            Self::Collection => CURSOR_DIR_BASE_TYPE,
            Self::Item => CURSOR_ITEM_BASE_TYPE,
        };
        format!("{base}/{CONTENT_AUTHORITY}/{PATH_PETS}")
    }
}

/// Immutable table configuration handed to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetSchema {
    table_name: String,
}

impl PetSchema {
    /// Builds a schema for a custom table name.
    ///
    /// # Errors
    /// - `InvalidTableName` when `table_name` is not `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn new(table_name: impl Into<String>) -> Result<Self, PetValidationError> {
        let table_name = table_name.into();
        if !SQL_IDENTIFIER_RE.is_match(&table_name) {
            return Err(PetValidationError::InvalidTableName(table_name));
        }
        Ok(Self { table_name })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this schema.
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                {id} INTEGER PRIMARY KEY AUTOINCREMENT,
                {name} TEXT NOT NULL,
                {breed} TEXT,
                {gender} INTEGER NOT NULL,
                {weight} INTEGER NOT NULL DEFAULT 0
            );",
            table = self.table_name,
            id = PetColumn::Id.name(),
            name = PetColumn::Name.name(),
            breed = PetColumn::Breed.name(),
            gender = PetColumn::Gender.name(),
            weight = PetColumn::Weight.name(),
        )
    }

    /// Comma-separated column list in table order.
    pub fn select_columns(&self) -> String {
        PetColumn::ALL
            .iter()
            .map(|column| column.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for PetSchema {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PetColumn, PetSchema, ResourceShape};
    use crate::model::pet::PetValidationError;

    #[test]
    fn default_schema_uses_pets_table() {
        let schema = PetSchema::default();
        assert_eq!(schema.table_name(), "pets");
        assert_eq!(schema.select_columns(), "_id, name, breed, gender, weight");
    }

    #[test]
    fn schema_rejects_non_identifier_table_names() {
        assert!(PetSchema::new("shelter_pets").is_ok());
        let err = PetSchema::new("pets; DROP TABLE pets").unwrap_err();
        assert!(matches!(err, PetValidationError::InvalidTableName(_)));
        assert!(PetSchema::new("1pets").is_err());
        assert!(PetSchema::new("").is_err());
    }

    #[test]
    fn content_types_follow_cursor_conventions() {
        assert_eq!(
            ResourceShape::Collection.content_type(),
            "vnd.android.cursor.dir/com.example.android.pets/pets"
        );
        assert_eq!(
            ResourceShape::Item.content_type(),
            "vnd.android.cursor.item/com.example.android.pets/pets"
        );
    }

    #[test]
    fn create_sql_mentions_every_column() {
        let sql = PetSchema::default().create_table_sql();
        for column in PetColumn::ALL {
            assert!(sql.contains(column.name()), "missing {}", column.name());
        }
    }
}

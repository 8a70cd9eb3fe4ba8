//! Addressing and ordering types for record store operations.
//!
//! # Invariants
//! - `Target::ById(id)` lowers to exactly `PetFilter::by_id(id)`, so item and
//!   filtered addressing resolve the same rows.
//! - Filters are conjunctions; an empty filter matches every row.
//! - Only `PetColumn` values reach generated SQL, never caller strings.

use crate::contract::{PetColumn, ResourceShape};
use crate::model::pet::{Gender, PetId};
use rusqlite::types::Value;

/// Which rows an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every row in the table.
    AllRows,
    /// The single row with this id.
    ById(PetId),
    /// Rows matching the predicate.
    Filtered(PetFilter),
}

impl Target {
    /// Resolves this target to the equivalent filter.
    pub fn to_filter(&self) -> PetFilter {
        match self {
            Self::AllRows => PetFilter::default(),
            Self::ById(id) => PetFilter::by_id(*id),
            Self::Filtered(filter) => filter.clone(),
        }
    }

    /// Resource shape this target addresses.
    pub fn shape(&self) -> ResourceShape {
        match self {
            Self::ById(_) => ResourceShape::Item,
            Self::AllRows | Self::Filtered(_) => ResourceShape::Collection,
        }
    }
}

impl From<PetFilter> for Target {
    fn from(value: PetFilter) -> Self {
        Self::Filtered(value)
    }
}

/// Conjunctive row predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    pub id: Option<PetId>,
    /// Exact name match.
    pub name: Option<String>,
    /// `Some(None)` matches rows without a breed.
    pub breed: Option<Option<String>>,
    pub gender: Option<Gender>,
    /// Inclusive lower bound.
    pub min_weight: Option<i64>,
    /// Inclusive upper bound.
    pub max_weight: Option<i64>,
}

impl PetFilter {
    pub fn by_id(id: PetId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn by_gender(gender: Gender) -> Self {
        Self {
            gender: Some(gender),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn breed(mut self, breed: Option<String>) -> Self {
        self.breed = Some(breed);
        self
    }

    pub fn weight_between(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_weight = min;
        self.max_weight = max;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Renders the `WHERE` clause (empty when unfiltered) and its bind values.
    pub(crate) fn to_where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(id) = self.id {
            conditions.push(format!("{} = ?", PetColumn::Id.name()));
            bind_values.push(Value::Integer(id));
        }

        if let Some(name) = &self.name {
            conditions.push(format!("{} = ?", PetColumn::Name.name()));
            bind_values.push(Value::Text(name.clone()));
        }

        match &self.breed {
            Some(Some(breed)) => {
                conditions.push(format!("{} = ?", PetColumn::Breed.name()));
                bind_values.push(Value::Text(breed.clone()));
            }
            Some(None) => conditions.push(format!("{} IS NULL", PetColumn::Breed.name())),
            None => {}
        }

        if let Some(gender) = self.gender {
            conditions.push(format!("{} = ?", PetColumn::Gender.name()));
            bind_values.push(Value::Integer(gender.code()));
        }

        if let Some(min) = self.min_weight {
            conditions.push(format!("{} >= ?", PetColumn::Weight.name()));
            bind_values.push(Value::Integer(min));
        }

        if let Some(max) = self.max_weight {
            conditions.push(format!("{} <= ?", PetColumn::Weight.name()));
            bind_values.push(Value::Integer(max));
        }

        if conditions.is_empty() {
            return (String::new(), bind_values);
        }

        (format!(" WHERE {}", conditions.join(" AND ")), bind_values)
    }
}

/// Sort direction for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Ordered list of sort keys. Empty means storage order (unspecified).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetSort {
    keys: Vec<(PetColumn, SortDirection)>,
}

impl PetSort {
    pub fn ascending(column: PetColumn) -> Self {
        Self::default().then(column, SortDirection::Ascending)
    }

    pub fn descending(column: PetColumn) -> Self {
        Self::default().then(column, SortDirection::Descending)
    }

    /// Appends a tie-breaker key.
    pub fn then(mut self, column: PetColumn, direction: SortDirection) -> Self {
        self.keys.push((column, direction));
        self
    }

    pub fn keys(&self) -> &[(PetColumn, SortDirection)] {
        &self.keys
    }

    pub(crate) fn to_order_clause(&self) -> String {
        if self.keys.is_empty() {
            return String::new();
        }
        let keys = self
            .keys
            .iter()
            .map(|(column, direction)| format!("{} {}", column.name(), direction.keyword()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(" ORDER BY {keys}")
    }
}

#[cfg(test)]
mod tests {
    use super::{PetFilter, PetSort, SortDirection, Target};
    use crate::contract::{PetColumn, ResourceShape};
    use crate::model::pet::Gender;
    use rusqlite::types::Value;

    #[test]
    fn by_id_target_lowers_to_id_filter() {
        assert_eq!(Target::ById(7).to_filter(), PetFilter::by_id(7));
        assert!(Target::AllRows.to_filter().is_empty());
        assert_eq!(Target::ById(7).shape(), ResourceShape::Item);
        assert_eq!(Target::AllRows.shape(), ResourceShape::Collection);
    }

    #[test]
    fn empty_filter_renders_no_where_clause() {
        let (clause, values) = PetFilter::default().to_where_clause();
        assert!(clause.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn filter_binds_values_in_condition_order() {
        let filter = PetFilter::by_gender(Gender::Male)
            .breed(None)
            .weight_between(Some(2), None);
        let (clause, values) = filter.to_where_clause();
        assert_eq!(clause, " WHERE breed IS NULL AND gender = ? AND weight >= ?");
        assert_eq!(values, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn sort_renders_keys_in_order() {
        let sort =
            PetSort::ascending(PetColumn::Name).then(PetColumn::Id, SortDirection::Descending);
        assert_eq!(sort.to_order_clause(), " ORDER BY name ASC, _id DESC");
        assert!(PetSort::default().to_order_clause().is_empty());
    }
}

//! Pet use-case service.
//!
//! # Responsibility
//! - Provide stable catalog/editor entry points for core callers.
//! - Delegate persistence to record store implementations.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::contract::PetColumn;
use crate::model::pet::{Gender, NewPet, PetChanges, PetId, PetRecord};
use crate::repo::pet_repo::{PetStore, RepoResult};
use crate::repo::query::{PetFilter, PetSort, Target};

/// Use-case service wrapper for pet CRUD operations.
pub struct PetService<S: PetStore> {
    store: S,
}

impl<S: PetStore> PetService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ensures the backing table exists.
    pub fn initialize(&self) -> RepoResult<()> {
        self.store.initialize()
    }

    /// Creates a pet from editor input.
    pub fn create_pet(&self, candidate: &NewPet) -> RepoResult<PetId> {
        self.store.insert(candidate)
    }

    /// Inserts the fixed sample pet used by catalog smoke flows.
    ///
    /// # Contract
    /// - Name `Toto`, breed `Terrier`, `Gender::Male`, weight 7.
    pub fn insert_sample_pet(&self) -> RepoResult<PetId> {
        let candidate = NewPet::new("Toto", Gender::Male)
            .with_breed("Terrier")
            .with_weight(7);
        self.store.insert(&candidate)
    }

    /// Gets one pet by id. Missing ids surface as `RepoError::NotFound`.
    pub fn get_pet(&self, id: PetId) -> RepoResult<PetRecord> {
        self.store.query_by_id(id)
    }

    /// Lists all pets; without a sort, ordered by id so displays are stable.
    pub fn list_pets(&self, sort: Option<&PetSort>) -> RepoResult<Vec<PetRecord>> {
        match sort {
            Some(sort) => self.store.query_all(Some(sort)),
            None => self
                .store
                .query_all(Some(&PetSort::ascending(PetColumn::Id))),
        }
    }

    /// Lists pets matching `filter`.
    pub fn find_pets(
        &self,
        filter: &PetFilter,
        sort: Option<&PetSort>,
    ) -> RepoResult<Vec<PetRecord>> {
        self.store.query(&Target::Filtered(filter.clone()), sort)
    }

    /// Applies a partial edit to one pet. Returns affected rows (0 or 1).
    pub fn update_pet(&self, id: PetId, changes: &PetChanges) -> RepoResult<usize> {
        self.store.update(&Target::ById(id), changes)
    }

    /// Applies a partial edit to every pet matching `filter`.
    pub fn update_matching(&self, filter: &PetFilter, changes: &PetChanges) -> RepoResult<usize> {
        self.store.update(&Target::Filtered(filter.clone()), changes)
    }

    /// Deletes one pet. A missing id returns 0.
    pub fn delete_pet(&self, id: PetId) -> RepoResult<usize> {
        self.store.delete(&Target::ById(id))
    }

    pub fn delete_matching(&self, filter: &PetFilter) -> RepoResult<usize> {
        self.store.delete(&Target::Filtered(filter.clone()))
    }

    /// Deletes every pet.
    pub fn delete_all(&self) -> RepoResult<usize> {
        self.store.delete(&Target::AllRows)
    }

    pub fn count_pets(&self) -> RepoResult<u64> {
        self.store.count(&Target::AllRows)
    }

    /// One-line catalog summary for list headers.
    pub fn catalog_summary(&self) -> RepoResult<String> {
        let count = self.count_pets()?;
        Ok(format!("Number of rows in pets database table: {count}"))
    }
}

use chrono::{DateTime, Utc};

use super::domain::{CatalogFilter, NewPet, Pet, PetId, PetStatus, PetUpdate};
use crate::workflows::identity::UserId;
use crate::workflows::RepositoryError;

/// Fields persisted when an admin creates a listing. The repository allocates
/// the id.
#[derive(Debug, Clone)]
pub struct NewPetRecord {
    pub details: NewPet,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction for pet records.
///
/// `page` and `count` evaluate the same filter so pagination metadata always
/// agrees with the returned rows; pages are ordered by creation time
/// descending. `set_status` is a single-record update and returns whether the
/// pet existed.
pub trait PetRepository: Send + Sync {
    fn insert(&self, record: NewPetRecord) -> Result<Pet, RepositoryError>;
    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError>;
    fn update(&self, id: &PetId, update: PetUpdate) -> Result<Option<Pet>, RepositoryError>;
    fn set_status(&self, id: &PetId, status: PetStatus) -> Result<bool, RepositoryError>;
    fn delete(&self, id: &PetId) -> Result<bool, RepositoryError>;
    fn page(
        &self,
        filter: &CatalogFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Pet>, RepositoryError>;
    fn count(&self, filter: &CatalogFilter) -> Result<u64, RepositoryError>;
}

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{CatalogFilter, CatalogQuery, NewPet, Pet, PetId, PetUpdate, PetView};
use super::repository::{NewPetRecord, PetRepository};
use crate::workflows::adoption::repository::AdoptionRepository;
use crate::workflows::identity::{CallerIdentity, UserDirectory};
use crate::workflows::paging::{PageInfo, Paged};
use crate::workflows::RepositoryError;

/// Catalog operations: public browsing plus administrative CRUD.
///
/// Deleting a pet also deletes every adoption application referencing it, so
/// the service holds the adoption repository alongside the pet store.
pub struct PetCatalogService<P, A, U> {
    pets: Arc<P>,
    adoptions: Arc<A>,
    users: Arc<U>,
}

/// Error raised by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Pet not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Joins a pet record with its owning admin's directory entry. A missing
/// directory entry is tolerated: the view simply omits `added_by`.
pub(crate) fn resolve_pet<U: UserDirectory>(
    pet: Pet,
    users: &U,
) -> Result<PetView, RepositoryError> {
    let added_by = users.find(&pet.added_by)?;
    Ok(PetView::from_record(pet, added_by))
}

impl<P, A, U> PetCatalogService<P, A, U>
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    pub fn new(pets: Arc<P>, adoptions: Arc<A>, users: Arc<U>) -> Self {
        Self {
            pets,
            adoptions,
            users,
        }
    }

    /// Lists pets matching the query. Anonymous and non-admin callers only
    /// see pets that are currently available; admins see every status.
    pub fn list(
        &self,
        query: CatalogQuery,
        caller: Option<&CallerIdentity>,
    ) -> Result<Paged<PetView>, CatalogError> {
        let only_available = !caller.is_some_and(CallerIdentity::is_admin);
        let filter = CatalogFilter {
            species: query.species,
            breed: query.breed,
            age: query.age,
            search: query.search,
            only_available,
        };

        let total = self.pets.count(&filter)?;
        let rows = self
            .pets
            .page(&filter, query.page.offset(), query.page.limit() as usize)?;

        let mut data = Vec::with_capacity(rows.len());
        for pet in rows {
            data.push(resolve_pet(pet, self.users.as_ref())?);
        }

        Ok(Paged {
            data,
            pagination: PageInfo::for_request(query.page, total),
        })
    }

    pub fn get(&self, id: &PetId) -> Result<PetView, CatalogError> {
        let pet = self.pets.fetch(id)?.ok_or(CatalogError::NotFound)?;
        Ok(resolve_pet(pet, self.users.as_ref())?)
    }

    pub fn create(&self, details: NewPet, admin: &CallerIdentity) -> Result<PetView, CatalogError> {
        let record = NewPetRecord {
            details,
            added_by: admin.user_id.clone(),
            created_at: Utc::now(),
        };
        let pet = self.pets.insert(record)?;
        info!(pet = %pet.id.0, added_by = %admin.user_id.0, "pet listed");
        Ok(resolve_pet(pet, self.users.as_ref())?)
    }

    pub fn update(&self, id: &PetId, update: PetUpdate) -> Result<PetView, CatalogError> {
        let pet = self.pets.update(id, update)?.ok_or(CatalogError::NotFound)?;
        Ok(resolve_pet(pet, self.users.as_ref())?)
    }

    /// Removes a pet and every adoption application referencing it.
    pub fn delete(&self, id: &PetId) -> Result<(), CatalogError> {
        if self.pets.fetch(id)?.is_none() {
            return Err(CatalogError::NotFound);
        }

        let removed_applications = self.adoptions.delete_for_pet(id)?;
        if !self.pets.delete(id)? {
            return Err(CatalogError::NotFound);
        }

        info!(pet = %id.0, removed_applications, "pet deleted");
        Ok(())
    }
}

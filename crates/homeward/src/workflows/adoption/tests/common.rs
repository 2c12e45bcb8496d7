use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::adoption::domain::{
    AdoptionApplication, AdoptionId, ApplicationStatus, NewApplication, ReviewStamp,
};
use crate::workflows::adoption::repository::{AdoptionRepository, TransitionOutcome};
use crate::workflows::adoption::router::adoption_router;
use crate::workflows::adoption::service::AdoptionWorkflowService;
use crate::workflows::catalog::domain::{
    CatalogFilter, Gender, Pet, PetId, PetStatus, PetUpdate, Species,
};
use crate::workflows::catalog::repository::{NewPetRecord, PetRepository};
use crate::workflows::identity::{CallerIdentity, Role, UserDirectory, UserId, UserSummary};
use crate::workflows::RepositoryError;

#[derive(Default)]
pub(super) struct MemoryAdoptions {
    records: Mutex<HashMap<AdoptionId, AdoptionApplication>>,
    sequence: AtomicU64,
}

impl AdoptionRepository for MemoryAdoptions {
    fn insert(&self, application: NewApplication) -> Result<AdoptionApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("adoption mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.pet_id == application.pet_id
                && existing.applicant_id == application.applicant_id
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }

        let id = AdoptionId(format!(
            "adoption-{:06}",
            self.sequence.fetch_add(1, Ordering::Relaxed) + 1
        ));
        let record = AdoptionApplication {
            id: id.clone(),
            pet_id: application.pet_id,
            applicant_id: application.applicant_id,
            status: ApplicationStatus::Pending,
            application_date: application.application_date,
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
        };
        guard.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AdoptionId) -> Result<Option<AdoptionApplication>, RepositoryError> {
        let guard = self.records.lock().expect("adoption mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_pair(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        let guard = self.records.lock().expect("adoption mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.pet_id == *pet && record.applicant_id == *applicant)
            .cloned())
    }

    fn for_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        let guard = self.records.lock().expect("adoption mutex poisoned");
        let mut rows: Vec<AdoptionApplication> = guard
            .values()
            .filter(|record| record.applicant_id == *applicant)
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows)
    }

    fn page(
        &self,
        status: Option<ApplicationStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        let guard = self.records.lock().expect("adoption mutex poisoned");
        let mut rows: Vec<AdoptionApplication> = guard
            .values()
            .filter(|record| status.is_none_or(|wanted| record.status == wanted))
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    fn count(&self, status: Option<ApplicationStatus>) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("adoption mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| status.is_none_or(|wanted| record.status == wanted))
            .count() as u64)
    }

    fn transition_if_pending(
        &self,
        id: &AdoptionId,
        stamp: ReviewStamp,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut guard = self.records.lock().expect("adoption mutex poisoned");
        match guard.get_mut(id) {
            None => Ok(TransitionOutcome::Missing),
            Some(record) if record.status != ApplicationStatus::Pending => {
                Ok(TransitionOutcome::NotPending)
            }
            Some(record) => {
                record.status = stamp.status;
                record.reviewed_by = Some(stamp.reviewed_by);
                record.reviewed_at = Some(stamp.reviewed_at);
                if stamp.notes.is_some() {
                    record.notes = stamp.notes;
                }
                Ok(TransitionOutcome::Applied(record.clone()))
            }
        }
    }

    fn pending_for_pet(
        &self,
        pet: &PetId,
        exclude: &AdoptionId,
    ) -> Result<Vec<AdoptionId>, RepositoryError> {
        let guard = self.records.lock().expect("adoption mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| {
                record.pet_id == *pet
                    && record.id != *exclude
                    && record.status == ApplicationStatus::Pending
            })
            .map(|record| record.id.clone())
            .collect())
    }

    fn delete_for_pet(&self, pet: &PetId) -> Result<u64, RepositoryError> {
        let mut guard = self.records.lock().expect("adoption mutex poisoned");
        let before = guard.len();
        guard.retain(|_, record| record.pet_id != *pet);
        Ok((before - guard.len()) as u64)
    }
}

fn sort_newest_first(rows: &mut [AdoptionApplication]) {
    rows.sort_by(|a, b| {
        b.application_date
            .cmp(&a.application_date)
            .then_with(|| b.id.0.cmp(&a.id.0))
    });
}

#[derive(Default)]
pub(super) struct MemoryPets {
    records: Mutex<HashMap<PetId, Pet>>,
    sequence: AtomicU64,
}

impl PetRepository for MemoryPets {
    fn insert(&self, record: NewPetRecord) -> Result<Pet, RepositoryError> {
        let id = PetId(format!(
            "pet-{:06}",
            self.sequence.fetch_add(1, Ordering::Relaxed) + 1
        ));
        let pet = Pet {
            id: id.clone(),
            name: record.details.name,
            species: record.details.species,
            breed: record.details.breed,
            age: record.details.age,
            gender: record.details.gender,
            description: record.details.description,
            photo: record.details.photo,
            status: PetStatus::Available,
            added_by: record.added_by,
            created_at: record.created_at,
        };
        self.records
            .lock()
            .expect("pet mutex poisoned")
            .insert(id, pet.clone());
        Ok(pet)
    }

    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("pet mutex poisoned")
            .get(id)
            .cloned())
    }

    fn update(&self, id: &PetId, update: PetUpdate) -> Result<Option<Pet>, RepositoryError> {
        let mut guard = self.records.lock().expect("pet mutex poisoned");
        Ok(guard.get_mut(id).map(|pet| {
            update.apply_to(pet);
            pet.clone()
        }))
    }

    fn set_status(&self, id: &PetId, status: PetStatus) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("pet mutex poisoned");
        Ok(guard.get_mut(id).map(|pet| pet.status = status).is_some())
    }

    fn delete(&self, id: &PetId) -> Result<bool, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("pet mutex poisoned")
            .remove(id)
            .is_some())
    }

    fn page(
        &self,
        filter: &CatalogFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Pet>, RepositoryError> {
        let guard = self.records.lock().expect("pet mutex poisoned");
        let mut rows: Vec<Pet> = guard.values().filter(|pet| filter.matches(pet)).cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    fn count(&self, filter: &CatalogFilter) -> Result<u64, RepositoryError> {
        let guard = self.records.lock().expect("pet mutex poisoned");
        Ok(guard.values().filter(|pet| filter.matches(pet)).count() as u64)
    }
}

#[derive(Default)]
pub(super) struct MemoryUsers {
    records: Mutex<HashMap<UserId, UserSummary>>,
}

impl MemoryUsers {
    pub(super) fn remember(&self, caller: &CallerIdentity) {
        self.records
            .lock()
            .expect("user mutex poisoned")
            .insert(caller.user_id.clone(), caller.summary());
    }
}

impl UserDirectory for MemoryUsers {
    fn find(&self, id: &UserId) -> Result<Option<UserSummary>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("user mutex poisoned")
            .get(id)
            .cloned())
    }
}

/// Adoption repository double that reports the storage uniqueness constraint
/// firing even though no pair was visible to the engine's pre-check.
pub(super) struct ConstraintTrippedAdoptions;

impl AdoptionRepository for ConstraintTrippedAdoptions {
    fn insert(&self, _application: NewApplication) -> Result<AdoptionApplication, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &AdoptionId) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(None)
    }

    fn find_pair(
        &self,
        _pet: &PetId,
        _applicant: &UserId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(None)
    }

    fn for_applicant(
        &self,
        _applicant: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        Ok(Vec::new())
    }

    fn page(
        &self,
        _status: Option<ApplicationStatus>,
        _offset: usize,
        _limit: usize,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        Ok(Vec::new())
    }

    fn count(&self, _status: Option<ApplicationStatus>) -> Result<u64, RepositoryError> {
        Ok(0)
    }

    fn transition_if_pending(
        &self,
        _id: &AdoptionId,
        _stamp: ReviewStamp,
    ) -> Result<TransitionOutcome, RepositoryError> {
        Ok(TransitionOutcome::Missing)
    }

    fn pending_for_pet(
        &self,
        _pet: &PetId,
        _exclude: &AdoptionId,
    ) -> Result<Vec<AdoptionId>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete_for_pet(&self, _pet: &PetId) -> Result<u64, RepositoryError> {
        Ok(0)
    }
}

/// Adoption repository double for a review that loses the race: the record
/// still reads as pending, but the conditional transition finds it reviewed.
pub(super) struct RacedOutAdoptions {
    pub(super) pet_id: PetId,
}

impl AdoptionRepository for RacedOutAdoptions {
    fn insert(&self, _application: NewApplication) -> Result<AdoptionApplication, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, id: &AdoptionId) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(Some(AdoptionApplication {
            id: id.clone(),
            pet_id: self.pet_id.clone(),
            applicant_id: dana().user_id,
            status: ApplicationStatus::Pending,
            application_date: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
        }))
    }

    fn find_pair(
        &self,
        _pet: &PetId,
        _applicant: &UserId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Ok(None)
    }

    fn for_applicant(
        &self,
        _applicant: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        Ok(Vec::new())
    }

    fn page(
        &self,
        _status: Option<ApplicationStatus>,
        _offset: usize,
        _limit: usize,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        Ok(Vec::new())
    }

    fn count(&self, _status: Option<ApplicationStatus>) -> Result<u64, RepositoryError> {
        Ok(0)
    }

    fn transition_if_pending(
        &self,
        _id: &AdoptionId,
        _stamp: ReviewStamp,
    ) -> Result<TransitionOutcome, RepositoryError> {
        Ok(TransitionOutcome::NotPending)
    }

    fn pending_for_pet(
        &self,
        _pet: &PetId,
        _exclude: &AdoptionId,
    ) -> Result<Vec<AdoptionId>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete_for_pet(&self, _pet: &PetId) -> Result<u64, RepositoryError> {
        Ok(0)
    }
}

/// Adoption repository double for a store that is down.
pub(super) struct UnavailableAdoptions;

impl AdoptionRepository for UnavailableAdoptions {
    fn insert(&self, _application: NewApplication) -> Result<AdoptionApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AdoptionId) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_pair(
        &self,
        _pet: &PetId,
        _applicant: &UserId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_applicant(
        &self,
        _applicant: &UserId,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn page(
        &self,
        _status: Option<ApplicationStatus>,
        _offset: usize,
        _limit: usize,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn count(&self, _status: Option<ApplicationStatus>) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transition_if_pending(
        &self,
        _id: &AdoptionId,
        _stamp: ReviewStamp,
    ) -> Result<TransitionOutcome, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending_for_pet(
        &self,
        _pet: &PetId,
        _exclude: &AdoptionId,
    ) -> Result<Vec<AdoptionId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_for_pet(&self, _pet: &PetId) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn admin() -> CallerIdentity {
    CallerIdentity {
        user_id: UserId("user-000001".to_string()),
        name: "Shelter Admin".to_string(),
        email: "admin@homeward.local".to_string(),
        role: Role::Admin,
    }
}

pub(super) fn dana() -> CallerIdentity {
    CallerIdentity {
        user_id: UserId("user-000002".to_string()),
        name: "Dana Whitfield".to_string(),
        email: "dana@example.com".to_string(),
        role: Role::User,
    }
}

pub(super) fn riley() -> CallerIdentity {
    CallerIdentity {
        user_id: UserId("user-000003".to_string()),
        name: "Riley Otis".to_string(),
        email: "riley@example.com".to_string(),
        role: Role::User,
    }
}

pub(super) type TestService = AdoptionWorkflowService<MemoryAdoptions, MemoryPets, MemoryUsers>;

pub(super) fn build_service() -> (TestService, Arc<MemoryAdoptions>, Arc<MemoryPets>) {
    let repository = Arc::new(MemoryAdoptions::default());
    let pets = Arc::new(MemoryPets::default());
    let users = Arc::new(MemoryUsers::default());
    users.remember(&admin());
    users.remember(&dana());
    users.remember(&riley());

    let service = AdoptionWorkflowService::new(repository.clone(), pets.clone(), users);
    (service, repository, pets)
}

pub(super) fn seed_pet(pets: &MemoryPets, name: &str) -> Pet {
    pets.insert(NewPetRecord {
        details: crate::workflows::catalog::domain::NewPet {
            name: name.to_string(),
            species: Species::Dog,
            breed: "Greyhound".to_string(),
            age: 4,
            gender: Gender::Female,
            description: None,
            photo: None,
        },
        added_by: admin().user_id,
        created_at: Utc::now(),
    })
    .expect("pet insert succeeds")
}

pub(super) fn router_as(service: Arc<TestService>, caller: &CallerIdentity) -> axum::Router {
    adoption_router(service).layer(axum::Extension(caller.clone()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;

use homeward::workflows::adoption::{
    AdoptionApplication, AdoptionId, AdoptionRepository, AdoptionWorkflowService,
    ApplicationStatus, NewApplication, ReviewStamp, TransitionOutcome,
};
use homeward::workflows::catalog::{
    CatalogFilter, NewPetRecord, Pet, PetCatalogService, PetId, PetRepository, PetStatus, PetUpdate,
};
use homeward::workflows::identity::{CallerIdentity, Role, UserDirectory, UserId, UserSummary};
use homeward::workflows::RepositoryError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type AdoptionService =
    AdoptionWorkflowService<InMemoryAdoptionRepository, InMemoryPetRepository, InMemoryAccounts>;
pub(crate) type CatalogService =
    PetCatalogService<InMemoryPetRepository, InMemoryAdoptionRepository, InMemoryAccounts>;

/// Adoption store backed by a mutex-guarded map. Holds the uniqueness
/// constraint on (pet, applicant) and implements the pending-only
/// conditional transition the engine relies on.
#[derive(Default)]
pub(crate) struct InMemoryAdoptionRepository {
    records: Mutex<HashMap<AdoptionId, AdoptionApplication>>,
    sequence: AtomicU64,
}

impl AdoptionRepository for InMemoryAdoptionRepository {
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

/// Pet store backed by a mutex-guarded map; listings come back newest first.
#[derive(Default)]
pub(crate) struct InMemoryPetRepository {
    records: Mutex<HashMap<PetId, Pet>>,
    sequence: AtomicU64,
}

impl PetRepository for InMemoryPetRepository {
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
        let mut rows: Vec<Pet> = guard
            .values()
            .filter(|pet| filter.matches(pet))
            .cloned()
            .collect();
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

/// Account directory plus token registry for the access gate. Tokens are
/// opaque strings looked up verbatim; nothing about their shape is assumed.
#[derive(Default)]
pub(crate) struct InMemoryAccounts {
    accounts: Mutex<HashMap<UserId, CallerIdentity>>,
    tokens: Mutex<HashMap<String, UserId>>,
    sequence: AtomicU64,
}

impl InMemoryAccounts {
    /// Registers an account and mints a token for it.
    pub(crate) fn register(&self, name: &str, email: &str, role: Role) -> (CallerIdentity, String) {
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let token = format!("token-{serial:06}");
        let caller = self.store(serial, name, email, role, token.clone());
        (caller, token)
    }

    /// Registers an account under a caller-chosen token, used to seed the
    /// administrator from configuration.
    pub(crate) fn register_with_token(
        &self,
        name: &str,
        email: &str,
        role: Role,
        token: &str,
    ) -> CallerIdentity {
        let serial = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.store(serial, name, email, role, token.to_string())
    }

    fn store(
        &self,
        serial: u64,
        name: &str,
        email: &str,
        role: Role,
        token: String,
    ) -> CallerIdentity {
        let caller = CallerIdentity {
            user_id: UserId(format!("user-{serial:06}")),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        self.accounts
            .lock()
            .expect("account mutex poisoned")
            .insert(caller.user_id.clone(), caller.clone());
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .insert(token, caller.user_id.clone());
        caller
    }

    pub(crate) fn resolve(&self, token: &str) -> Option<CallerIdentity> {
        let id = self
            .tokens
            .lock()
            .expect("token mutex poisoned")
            .get(token)
            .cloned()?;
        self.accounts
            .lock()
            .expect("account mutex poisoned")
            .get(&id)
            .cloned()
    }
}

impl UserDirectory for InMemoryAccounts {
    fn find(&self, id: &UserId) -> Result<Option<UserSummary>, RepositoryError> {
        Ok(self
            .accounts
            .lock()
            .expect("account mutex poisoned")
            .get(id)
            .map(CallerIdentity::summary))
    }
}

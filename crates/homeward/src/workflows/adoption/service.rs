use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    AdoptionApplication, AdoptionId, AdoptionListQuery, ApplicationStatus, NewApplication,
    ResolvedApplication, ReviewStamp,
};
use super::repository::{AdoptionRepository, TransitionOutcome};
use crate::workflows::catalog::domain::{PetId, PetStatus};
use crate::workflows::catalog::repository::PetRepository;
use crate::workflows::catalog::service::resolve_pet;
use crate::workflows::identity::{CallerIdentity, UserDirectory, UserId, UserSummary};
use crate::workflows::paging::{PageInfo, Paged};
use crate::workflows::RepositoryError;

/// The adoption workflow engine: application intake, listing, and review.
///
/// Callers arrive pre-authenticated; the engine takes the caller identity as
/// an explicit argument and never consults ambient state.
pub struct AdoptionWorkflowService<R, P, U> {
    repository: Arc<R>,
    pets: Arc<P>,
    users: Arc<U>,
}

/// Typed failures raised by the workflow engine. The boundary maps not-found
/// variants to 404, invalid-state and conflict variants to 400, and storage
/// failures to 500.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Pet not found")]
    PetNotFound,
    #[error("Pet is not available for adoption")]
    PetUnavailable,
    #[error("You have already applied for this pet")]
    AlreadyApplied,
    #[error("Adoption application not found")]
    ApplicationNotFound,
    #[error("Application has already been processed")]
    AlreadyProcessed,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl<R, P, U> AdoptionWorkflowService<R, P, U>
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    pub fn new(repository: Arc<R>, pets: Arc<P>, users: Arc<U>) -> Self {
        Self {
            repository,
            pets,
            users,
        }
    }

    /// Submits a new application for a pet on behalf of the caller.
    pub fn submit(
        &self,
        pet_id: &PetId,
        applicant: &CallerIdentity,
    ) -> Result<ResolvedApplication, WorkflowError> {
        let pet = self
            .pets
            .fetch(pet_id)?
            .ok_or(WorkflowError::PetNotFound)?;

        if pet.status != PetStatus::Available {
            return Err(WorkflowError::PetUnavailable);
        }

        if self
            .repository
            .find_pair(pet_id, &applicant.user_id)?
            .is_some()
        {
            return Err(WorkflowError::AlreadyApplied);
        }

        let stored = self
            .repository
            .insert(NewApplication {
                pet_id: pet_id.clone(),
                applicant_id: applicant.user_id.clone(),
                application_date: Utc::now(),
            })
            .map_err(|error| match error {
                // The storage constraint is the safety net behind the
                // engine-level pair check.
                RepositoryError::Conflict => WorkflowError::AlreadyApplied,
                other => WorkflowError::Repository(other),
            })?;

        info!(
            adoption = %stored.id.0,
            pet = %pet_id.0,
            applicant = %applicant.user_id.0,
            "adoption application submitted"
        );
        self.resolve(stored)
    }

    /// All applications submitted by one applicant, most recent first.
    pub fn applications_for_user(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<ResolvedApplication>, WorkflowError> {
        let records = self.repository.for_applicant(applicant)?;
        records
            .into_iter()
            .map(|record| self.resolve(record))
            .collect()
    }

    /// Paged admin listing with an optional status filter, most recent first.
    pub fn list_all(
        &self,
        query: AdoptionListQuery,
    ) -> Result<Paged<ResolvedApplication>, WorkflowError> {
        let total = self.repository.count(query.status)?;
        let rows =
            self.repository
                .page(query.status, query.page.offset(), query.page.limit() as usize)?;

        let mut data = Vec::with_capacity(rows.len());
        for record in rows {
            data.push(self.resolve(record)?);
        }

        Ok(Paged {
            data,
            pagination: PageInfo::for_request(query.page, total),
        })
    }

    /// Approves a pending application: the application moves to approved, the
    /// pet to adopted, and every other pending application for the same pet
    /// is rejected with the cascade note.
    pub fn approve(
        &self,
        id: &AdoptionId,
        reviewer: &CallerIdentity,
        notes: Option<String>,
    ) -> Result<ResolvedApplication, WorkflowError> {
        let current = self.precheck(id)?;
        let now = Utc::now();

        let stamp = ReviewStamp::approval(reviewer.user_id.clone(), now, notes);
        let approved = match self.repository.transition_if_pending(id, stamp)? {
            TransitionOutcome::Applied(record) => record,
            // A concurrent review won the race between precheck and here.
            TransitionOutcome::NotPending => return Err(WorkflowError::AlreadyProcessed),
            TransitionOutcome::Missing => return Err(WorkflowError::ApplicationNotFound),
        };

        if !self.pets.set_status(&current.pet_id, PetStatus::Adopted)? {
            warn!(pet = %current.pet_id.0, "approved application references a missing pet");
        }

        let siblings = self
            .repository
            .pending_for_pet(&current.pet_id, id)?;
        let mut rejected = 0_usize;
        for sibling in &siblings {
            let cascade = ReviewStamp::cascade(reviewer.user_id.clone(), now);
            // Re-applying to an already-rejected sibling is a no-op; a racer
            // that lost its own precondition simply falls through here.
            if let TransitionOutcome::Applied(_) =
                self.repository.transition_if_pending(sibling, cascade)?
            {
                rejected += 1;
            }
        }

        info!(
            adoption = %id.0,
            pet = %current.pet_id.0,
            reviewer = %reviewer.user_id.0,
            rejected_siblings = rejected,
            "adoption application approved"
        );
        self.resolve(approved)
    }

    /// Rejects a pending application. No effect on the pet or siblings.
    pub fn reject(
        &self,
        id: &AdoptionId,
        reviewer: &CallerIdentity,
        notes: Option<String>,
    ) -> Result<ResolvedApplication, WorkflowError> {
        self.precheck(id)?;

        let stamp = ReviewStamp::rejection(reviewer.user_id.clone(), Utc::now(), notes);
        let rejected = match self.repository.transition_if_pending(id, stamp)? {
            TransitionOutcome::Applied(record) => record,
            TransitionOutcome::NotPending => return Err(WorkflowError::AlreadyProcessed),
            TransitionOutcome::Missing => return Err(WorkflowError::ApplicationNotFound),
        };

        info!(
            adoption = %id.0,
            reviewer = %reviewer.user_id.0,
            "adoption application rejected"
        );
        self.resolve(rejected)
    }

    /// Shared review preconditions: the application exists and is pending.
    fn precheck(&self, id: &AdoptionId) -> Result<AdoptionApplication, WorkflowError> {
        let application = self
            .repository
            .fetch(id)?
            .ok_or(WorkflowError::ApplicationNotFound)?;

        if application.status != ApplicationStatus::Pending {
            return Err(WorkflowError::AlreadyProcessed);
        }

        Ok(application)
    }

    /// Read-time join against the pet store and user directory.
    fn resolve(
        &self,
        application: AdoptionApplication,
    ) -> Result<ResolvedApplication, WorkflowError> {
        let pet = self.pets.fetch(&application.pet_id)?.ok_or_else(|| {
            RepositoryError::Unavailable(format!(
                "pet {} referenced by {} is missing",
                application.pet_id.0, application.id.0
            ))
        })?;
        let pet = resolve_pet(pet, self.users.as_ref())?;

        let applicant = self
            .users
            .find(&application.applicant_id)?
            .unwrap_or_else(|| placeholder_user(&application.applicant_id));

        let reviewed_by = match &application.reviewed_by {
            Some(reviewer) => self.users.find(reviewer)?,
            None => None,
        };

        Ok(ResolvedApplication {
            id: application.id,
            pet,
            applicant,
            status: application.status,
            application_date: application.application_date,
            reviewed_by,
            reviewed_at: application.reviewed_at,
            notes: application.notes,
        })
    }
}

/// Stand-in summary for an applicant whose directory entry has vanished.
fn placeholder_user(id: &UserId) -> UserSummary {
    UserSummary {
        id: id.clone(),
        name: "Unknown user".to_string(),
        email: String::new(),
    }
}

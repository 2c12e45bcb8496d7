use super::domain::{
    AdoptionApplication, AdoptionId, ApplicationStatus, NewApplication, ReviewStamp,
};
use crate::workflows::catalog::domain::PetId;
use crate::workflows::identity::UserId;
use crate::workflows::RepositoryError;

/// Outcome of a conditional pending-only transition.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The precondition held; the stamped record is returned.
    Applied(AdoptionApplication),
    /// The record exists but is no longer pending.
    NotPending,
    /// No record with the given id.
    Missing,
}

/// Storage abstraction for adoption applications.
///
/// Contract notes for implementations:
/// - `insert` enforces the (pet, applicant) uniqueness constraint and reports
///   a violation as [`RepositoryError::Conflict`]. The constraint lives at
///   the storage layer so a retried submit cannot double-insert.
/// - `transition_if_pending` is the storage-native equivalent of
///   `update ... where id = ? and status = 'pending'`: atomic per record, so
///   two concurrent reviews can never both observe [`TransitionOutcome::Applied`].
/// - `for_applicant` and `page` return records ordered by creation time
///   descending.
pub trait AdoptionRepository: Send + Sync {
    fn insert(&self, application: NewApplication) -> Result<AdoptionApplication, RepositoryError>;

    fn fetch(&self, id: &AdoptionId) -> Result<Option<AdoptionApplication>, RepositoryError>;

    fn find_pair(
        &self,
        pet: &PetId,
        applicant: &UserId,
    ) -> Result<Option<AdoptionApplication>, RepositoryError>;

    fn for_applicant(&self, applicant: &UserId)
        -> Result<Vec<AdoptionApplication>, RepositoryError>;

    fn page(
        &self,
        status: Option<ApplicationStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AdoptionApplication>, RepositoryError>;

    fn count(&self, status: Option<ApplicationStatus>) -> Result<u64, RepositoryError>;

    fn transition_if_pending(
        &self,
        id: &AdoptionId,
        stamp: ReviewStamp,
    ) -> Result<TransitionOutcome, RepositoryError>;

    /// Ids of every pending application for the pet other than `exclude`.
    fn pending_for_pet(
        &self,
        pet: &PetId,
        exclude: &AdoptionId,
    ) -> Result<Vec<AdoptionId>, RepositoryError>;

    /// Removes every application referencing the pet; returns how many.
    fn delete_for_pet(&self, pet: &PetId) -> Result<u64, RepositoryError>;
}
